//! Software interrupt vector table keys.
//!
//! Grounded on the fixed small handler table in
//! `amoljassal-sis-kernel-showcase/crates/kernel/src/interrupts.rs`
//! (`InterruptRegistry` indexed by a bounded enum rather than a raw vector
//! number), generalized to the three vector kinds this system dispatches.

/// Number of distinct software vector kinds. Sized to match `VectorKind`'s
/// variant count so the dispatch table can be a fixed-size array.
pub const NUM_VECTOR_KINDS: usize = 3;

/// Identifies which software vector fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorKind {
    /// Unrecoverable CPU-detected fault (divide error, invalid opcode, ...).
    SoftError,
    /// A thread executed the trap instruction to request kernel service.
    Syscall,
    /// The serial line controller has a byte ready or a line to deliver.
    SerialInterrupt,
}

impl VectorKind {
    /// Maps a vector kind onto its slot in a `[_; NUM_VECTOR_KINDS]` table.
    pub const fn index(self) -> usize {
        match self {
            VectorKind::SoftError => 0,
            VectorKind::Syscall => 1,
            VectorKind::SerialInterrupt => 2,
        }
    }
}
