//! The boot monitor's command-line shell (spec §6): `echo`, `exit`,
//! `load`. Supplemented with a `help` listing, matching the small-shell
//! idiom `examples/original_source/06/os/main.c` / `07/os/main.c` use --
//! both keep a command table with one more entry than the bare minimum
//! a distillation names.

use crate::image::RamImageSink;
use crate::xmodem_target::XmodemTarget;

pub const PROMPT: &str = "> ";

pub enum ShellOutcome {
    Continue,
    Exit,
}

/// Parses and runs one complete line. Unknown commands produce
/// `unknown command.`, per spec §6.
pub fn dispatch(line: &str) -> ShellOutcome {
    let line = line.trim();
    let (command, rest) = match line.split_once(' ') {
        Some((c, r)) => (c, r.trim()),
        None => (line, ""),
    };

    match command {
        "" => {}
        "echo" => bsp::serial_println!("{}", rest),
        "exit" => return ShellOutcome::Exit,
        "help" => bsp::serial_println!("commands: echo <text>, load, exit, help"),
        "load" => run_load(),
        _ => bsp::serial_println!("unknown command."),
    }
    ShellOutcome::Continue
}

/// Enters image-reception state (spec §4.6) and, on completion, hands
/// off to the received image. Never returns.
fn run_load() -> ! {
    bsp::serial_println!("load: awaiting transfer...");
    let mut sink = RamImageSink::new();
    let received = XmodemTarget::new(&mut sink).receive();
    bsp::serial_println!("load: {} bytes received", received);
    sink.jump();
}
