#![no_std]
#![feature(abi_x86_interrupt)]

//! The multitasking kernel: software-interrupt dispatch, a priority
//! scheduler, syscall traps and context switching across a hardware
//! stack (spec §4.3-§4.5, §4.7). This is the image the boot monitor
//! receives over the wire and jumps to.
//!
//! No heap: per the Non-goal against dynamic memory beyond a bump
//! allocator for stacks, every module here works off fixed-capacity
//! arrays sized at compile time.

#[cfg(test)]
extern crate std;

pub mod arena;
pub mod context;
pub mod error;
pub mod idt;
pub mod irq;
pub mod logging;
pub mod queue;
pub mod scheduler;
pub mod syscall;
pub mod task;
pub mod vector;

/// Masks interrupts permanently off the critical path and parks the
/// core, per the Non-goal against power management beyond an idle
/// wait-for-interrupt primitive.
pub fn hlt_loop() -> ! {
    loop {
        x86_64::instructions::hlt();
    }
}

#[cfg(not(test))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    bsp::serial_println!("kernel panic: {}", info);
    scheduler::sysdown(contract::KernelError::FatalInvariantViolated)
}
