//! Kernel-side error taxonomy.
//!
//! Grounded on `brianmayclone-anyos/libs/stdlib/src/error.rs`'s no_std
//! `Error` enum with a manual `Display` impl (no `thiserror` below
//! `alloc`-only crates in this workspace).

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// The arena backing thread stacks or TCBs has no room left.
    OutOfMemory,
    /// A `ThreadId` doesn't name a live thread.
    BadHandle,
    /// A vector table lookup used a kind outside the fixed table.
    BadVectorKind,
    /// Requested priority is outside the configured priority range.
    BadPriority,
    /// A wakeup or chpri targeted a thread that isn't in a state that
    /// accepts it (e.g. waking an exiting thread).
    IllegalThreadState,
    /// An internal invariant the scheduler relies on was violated; the
    /// kernel cannot continue safely.
    FatalInvariantViolated,
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KernelError::OutOfMemory => "out of memory",
            KernelError::BadHandle => "bad thread handle",
            KernelError::BadVectorKind => "bad vector kind",
            KernelError::BadPriority => "bad priority",
            KernelError::IllegalThreadState => "illegal thread state for operation",
            KernelError::FatalInvariantViolated => "fatal invariant violated",
        };
        f.write_str(s)
    }
}

pub type Result<T> = core::result::Result<T, KernelError>;
