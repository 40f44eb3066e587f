#![no_std]

//! Shared ABI between the boot monitor and the kernel image it loads, and
//! between the host-side transfer tool and the monitor's receiver.
//!
//! Nothing in this crate touches hardware. It only fixes the shapes that
//! both sides of a boundary must agree on byte-for-byte.

pub mod error;
pub mod syscall;
pub mod thread;
pub mod vector;
pub mod xmodem;

pub use error::KernelError;
pub use syscall::{SyscallKind, SyscallRequest, SyscallResult};
pub use thread::ThreadId;
pub use vector::VectorKind;
