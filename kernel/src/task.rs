//! The thread control block.
//!
//! Fields follow spec §3's TCB attribute list directly. Queue linkage is a
//! `ThreadId` arena index rather than a pointer (spec §9's design note),
//! since the thread table itself is a fixed-capacity array indexed by the
//! same id — there is no heap, so `Arc<Spinlock<Task>>` as in
//! `TheDigitalVirus-goofy-os/kernel/src/tasks/task.rs` isn't available, and
//! wouldn't fit the Non-goal against dynamic memory beyond a bump
//! allocator for stacks anyway.

use contract::syscall::{SyscallRequest, ThreadEntry};
use contract::{SyscallResult, ThreadId};

pub const NUM_PRIORITIES: usize = 8;
/// Sentinel priority marking the idle thread / "no priority".
pub const IDLE_PRIORITY: u8 = u8::MAX;
/// Passed to `chpri` to mean "report current priority, change nothing".
pub const PRIORITY_NO_CHANGE: u8 = u8::MAX - 1;
pub const MAX_THREADS: usize = 32;
pub const MAX_NAME_LEN: usize = 15;

/// Wait reason, per spec §3: {Runnable, Sleeping, Exiting}.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitReason {
    Runnable,
    Sleeping,
    Exiting,
}

/// A short, fixed-capacity, non-owning name label. No heap `String` --
/// names are always short thread labels set at `run` time.
#[derive(Clone, Copy)]
pub struct Name {
    bytes: [u8; MAX_NAME_LEN],
    len: u8,
}

impl Name {
    pub const fn empty() -> Self {
        Name {
            bytes: [0; MAX_NAME_LEN],
            len: 0,
        }
    }

    pub fn from_str(s: &str) -> Self {
        let mut bytes = [0u8; MAX_NAME_LEN];
        let src = s.as_bytes();
        let n = src.len().min(MAX_NAME_LEN);
        bytes[..n].copy_from_slice(&src[..n]);
        Name {
            bytes,
            len: n as u8,
        }
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }
}

/// Per-thread system-call request slot: kind tag plus parameter block,
/// populated on trap entry and resolved by the dispatched handler.
#[derive(Clone, Copy, Default)]
pub struct RequestSlot {
    pub request: Option<SyscallRequest>,
    pub result: Option<SyscallResult>,
}

impl RequestSlot {
    pub const fn empty() -> Self {
        RequestSlot {
            request: None,
            result: None,
        }
    }
}

pub struct Tcb {
    pub id: ThreadId,
    pub name: Name,
    pub priority: u8,
    pub entry: Option<ThreadEntry>,
    pub argc: usize,
    pub argv: *const *const u8,
    /// Exclusively-owned stack region: `[stack_base, stack_base + stack_size)`.
    pub stack_base: usize,
    pub stack_size: usize,
    /// Saved context pointer: the stack pointer parked while not running.
    pub saved_sp: usize,
    /// Queue linkage: successor within whichever queue owns this TCB, or
    /// `None` if tail-of-queue or not queued.
    pub next: Option<ThreadId>,
    pub state: WaitReason,
    pub request: RequestSlot,
    pub live: bool,
}

impl Tcb {
    pub const fn vacant() -> Self {
        Tcb {
            id: ThreadId::from_raw(0),
            name: Name::empty(),
            priority: IDLE_PRIORITY,
            entry: None,
            argc: 0,
            argv: core::ptr::null(),
            stack_base: 0,
            stack_size: 0,
            saved_sp: 0,
            next: None,
            state: WaitReason::Exiting,
            request: RequestSlot::empty(),
            live: false,
        }
    }
}

// SAFETY: `argv` only ever points at a caller-owned argument array that
// outlives the thread, and the whole table is only ever touched with
// interrupts masked on a single core.
unsafe impl Send for Tcb {}
