//! Runs a closure with interrupts masked, restoring the prior flag on
//! return. Every access to scheduler-owned global state goes through
//! this, per spec §5's "ready queues, TCB table and current-thread
//! pointer are accessed only with CPU interrupts masked."
//!
//! Grounded on the `irqsave` helper
//! `TheDigitalVirus-goofy-os/kernel/src/tasks/scheduler.rs` wraps every
//! scheduler mutation in.

use x86_64::instructions::interrupts;

pub fn irqsave<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let were_enabled = interrupts::are_enabled();
    if were_enabled {
        interrupts::disable();
    }
    let result = f();
    if were_enabled {
        interrupts::enable();
    }
    result
}
