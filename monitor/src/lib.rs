#![no_std]
#![feature(abi_x86_interrupt)]

//! The boot monitor: the shell, the interrupt-driven line receiver, the
//! target half of the block-framed image transfer protocol, and the
//! monitor's own software-interrupt vector table (spec §2, §4.1-§4.2,
//! §4.6). Never shares storage with `kernel` -- only the `contract`
//! shapes both binaries agree on.

#[cfg(test)]
extern crate std;

pub mod idt;
pub mod image;
pub mod line_receiver;
pub mod shell;
pub mod vector;
pub mod xmodem_target;

/// Masks interrupts and halts after a best-effort diagnostic, mirroring
/// `kernel::scheduler::sysdown` for the monitor's own fatal-error path
/// (spec §4.1's "panics via the fatal-error path").
pub fn fatal() -> ! {
    x86_64::instructions::interrupts::disable();
    bsp::serial_println!("monitor: unhandled vector, halting");
    loop {
        x86_64::instructions::hlt();
    }
}

#[cfg(not(test))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    bsp::serial_println!("monitor panic: {}", info);
    fatal()
}
