//! The kernel's own instance of the software-interrupt vector table
//! (spec §4.1). The boot monitor keeps a separate instance in its own
//! binary -- the two never share storage, only `contract::VectorKind`'s
//! shape.
//!
//! Generalizes
//! `amoljassal-sis-kernel-showcase/crates/kernel/src/interrupts.rs`'s
//! `InterruptRegistry` (a fixed array of `Option<&dyn Handler>` keyed by a
//! bounded enum) from hardware IRQs to the three abstract vector kinds
//! this system dispatches.

use contract::VectorKind;
use contract::vector::NUM_VECTOR_KINDS;

use crate::error::{KernelError, Result};

pub type HandlerFn = fn(kind: VectorKind, saved_sp: usize);

static mut TABLE: [Option<HandlerFn>; NUM_VECTOR_KINDS] = [None; NUM_VECTOR_KINDS];

/// Clears all slots. Idempotent, per spec §4.1.
pub fn vector_init() {
    unsafe {
        TABLE = [None; NUM_VECTOR_KINDS];
    }
}

/// Installs or replaces the handler for `kind`.
pub fn vector_set(kind: VectorKind, handler: HandlerFn) {
    unsafe {
        TABLE[kind.index()] = Some(handler);
    }
}

/// Invoked from the low-level trap wrappers. Calls the installed handler,
/// or enters the fatal-error path if none is installed -- an unhandled
/// vector firing means the trap wrappers and the kernel's installed set
/// disagree, which is always a kernel bug rather than a recoverable
/// condition.
pub fn dispatch(kind: VectorKind, saved_sp: usize) {
    let handler = unsafe { TABLE[kind.index()] };
    match handler {
        Some(f) => f(kind, saved_sp),
        None => crate::scheduler::sysdown(KernelError::FatalInvariantViolated),
    }
}

/// Fallible variant used by callers that can reject an out-of-range kind
/// instead of relying on `VectorKind` being exhaustively checked at
/// compile time -- kept for parity with spec §4.1's documented failure
/// return, even though `VectorKind` makes the failure unreachable today.
pub fn try_vector_set(kind: VectorKind, handler: HandlerFn) -> Result<()> {
    if kind.index() >= NUM_VECTOR_KINDS {
        return Err(KernelError::BadVectorKind);
    }
    vector_set(kind, handler);
    Ok(())
}
