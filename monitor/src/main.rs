#![no_std]
#![no_main]

//! Boot monitor binary entry point. Brings up the GDT/TSS, PIC and IDT,
//! installs the serial interrupt into the monitor's own vector table,
//! then drives the command prompt until `exit` (spec §2, §6).

use core::arch::asm;

use bootloader_api::config::{BootloaderConfig, Mapping};
use bootloader_api::{BootInfo, entry_point};
use contract::VectorKind;
use spin::Mutex;
use x86_64::VirtAddr;
use x86_64::instructions::interrupts::without_interrupts;

use monitor::line_receiver::{Line, LineReceiver};
use monitor::shell::{self, ShellOutcome};
use monitor::{idt, vector};

pub static BOOTLOADER_CONFIG: BootloaderConfig = {
    let mut config = BootloaderConfig::new_default();
    config.mappings.physical_memory = Some(Mapping::Dynamic);
    config
};

entry_point!(monitor_main, config = &BOOTLOADER_CONFIG);

static LINE_RECEIVER: Mutex<LineReceiver> = Mutex::new(LineReceiver::new());
static PENDING_LINE: Mutex<Option<Line>> = Mutex::new(None);

/// The monitor's `SerialInterrupt` handler: feeds the byte into the
/// line assembler and, once a line completes, parks it in the mailbox
/// the main loop polls.
fn on_serial_interrupt(kind: VectorKind, saved_sp: usize) {
    debug_assert_eq!(kind, VectorKind::SerialInterrupt);
    let byte = saved_sp as u8;
    if let Some(line) = LINE_RECEIVER.lock().on_byte(byte) {
        *PENDING_LINE.lock() = Some(line);
    }
}

#[inline(always)]
fn current_stack_pointer() -> u64 {
    let sp: u64;
    unsafe { asm!("mov {}, rsp", out(reg) sp, options(nomem, nostack, preserves_flags)) };
    sp
}

fn monitor_main(_boot_info: &'static mut BootInfo) -> ! {
    let initial_stack = VirtAddr::new(current_stack_pointer());
    bsp::gdt::init(initial_stack);
    unsafe { bsp::pic::init() };
    idt::init();

    vector::vector_init();
    vector::vector_set(VectorKind::SerialInterrupt, on_serial_interrupt);
    bsp::serial::enable_rx_interrupt();

    x86_64::instructions::interrupts::enable();

    bsp::serial_println!("goofy boot monitor");
    bsp::serial_print!("{}", shell::PROMPT);

    loop {
        let line = loop {
            if let Some(line) = without_interrupts(|| PENDING_LINE.lock().take()) {
                break line;
            }
            x86_64::instructions::hlt();
        };

        match shell::dispatch(line.as_str()) {
            ShellOutcome::Continue => bsp::serial_print!("{}", shell::PROMPT),
            ShellOutcome::Exit => break,
        }
    }

    bsp::serial_println!("monitor: exiting");
    loop {
        x86_64::instructions::hlt();
    }
}
