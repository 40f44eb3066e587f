//! Kernel error taxonomy: the same `contract::KernelError` the syscall
//! ABI carries back to callers, re-exported so kernel modules don't each
//! depend on `contract::error` directly.

pub use contract::error::{KernelError, Result};
