//! Software-interrupt syscall trap (spec §4.5): a thread populates its
//! TCB's request slot, executes the trap instruction, and the installed
//! `Syscall` vector handler reads the slot, performs the corresponding
//! scheduler operation, and writes the result back before resuming. On
//! this flat ring-0 target there's no privilege transition to enforce,
//! but the trap instruction is kept anyway so the call shape matches
//! spec §4.5 rather than collapsing into a plain function call -- this
//! mirrors KOZOS's `TRAPA #0` into a single syscall entry point.
//!
//! Grounded on `TheDigitalVirus-goofy-os/kernel/src/tasks/syscall.rs`'s
//! split between a low-level trap entry and per-call wrapper functions.

use core::arch::asm;

use contract::syscall::{SyscallRequest, SyscallResult, ThreadEntry};
use contract::{KernelError, ThreadId, VectorKind};

use crate::scheduler;

/// Software interrupt vector used for syscalls, analogous to `int 0x80`
/// on a traditional flat-memory x86 kernel.
pub const SYSCALL_VECTOR: u8 = 0x80;

/// Executes the trap instruction. Requires the IDT entry for
/// [`SYSCALL_VECTOR`] to already be installed (see `kernel::idt`).
#[inline(never)]
pub fn trap() {
    unsafe {
        asm!("int {vec}", vec = const SYSCALL_VECTOR, options(nomem, nostack));
    }
}

/// The `Syscall` vector handler: reads the current thread's pending
/// request, performs it, and writes the result back into the same slot.
/// Installed via `vector::vector_set` in `scheduler::kernel_start`.
pub fn on_syscall_vector(kind: VectorKind, _saved_sp: usize) {
    debug_assert_eq!(kind, VectorKind::Syscall);

    let Some(req) = scheduler::take_current_request() else {
        scheduler::sysdown(KernelError::FatalInvariantViolated);
    };

    let result = match req {
        SyscallRequest::Run {
            entry,
            priority,
            argc,
            argv,
        } => match scheduler::run(entry, "", priority, scheduler::DEFAULT_STACK_SIZE, argc, argv) {
            Ok(id) => SyscallResult::ThreadCreated(id),
            Err(e) => SyscallResult::Err(e),
        },
        SyscallRequest::Exit => scheduler::exit(),
        SyscallRequest::Wait => {
            scheduler::wait();
            SyscallResult::Ok
        }
        SyscallRequest::Sleep => {
            scheduler::sleep();
            SyscallResult::Ok
        }
        SyscallRequest::Wakeup { target } => match scheduler::wakeup(target) {
            Ok(()) => SyscallResult::Ok,
            Err(e) => SyscallResult::Err(e),
        },
        SyscallRequest::ChangePriority { priority } => match scheduler::chpri(priority) {
            Ok(old) => SyscallResult::Priority(old),
            Err(e) => SyscallResult::Err(e),
        },
        SyscallRequest::GetId => SyscallResult::Id(scheduler::getid()),
    };

    scheduler::set_current_result(result);
}

/// The `SoftError` vector handler. Nothing in this kernel raises it yet
/// (there's no MMU, so there are no recoverable page faults to route
/// here), but spec §4.1 requires every vector kind to have a handler
/// installed before the first dispatch, so an unreachable request is
/// still a fatal one rather than a silently dropped one.
pub fn on_soft_error(kind: VectorKind, _saved_sp: usize) {
    debug_assert_eq!(kind, VectorKind::SoftError);
    scheduler::sysdown(KernelError::FatalInvariantViolated);
}

/// Thread-side system call wrappers (spec §4.3). These are what a
/// spawned thread actually calls; each fills in a request, traps, and
/// unpacks the result the handler wrote back.
pub fn sys_run(
    entry: ThreadEntry,
    priority: u8,
    argc: usize,
    argv: *const *const u8,
) -> Result<ThreadId, KernelError> {
    match scheduler::request(SyscallRequest::Run {
        entry,
        priority,
        argc,
        argv,
    }) {
        SyscallResult::ThreadCreated(id) => Ok(id),
        SyscallResult::Err(e) => Err(e),
        _ => unreachable!("run yields ThreadCreated or Err"),
    }
}

/// Never returns: the caller's thread is gone once the kernel handles
/// this request.
pub fn sys_exit() -> ! {
    scheduler::request(SyscallRequest::Exit);
    unreachable!("a thread that exited is never resumed")
}

pub fn sys_wait() {
    scheduler::request(SyscallRequest::Wait);
}

pub fn sys_sleep() {
    scheduler::request(SyscallRequest::Sleep);
}

pub fn sys_wakeup(target: ThreadId) -> Result<(), KernelError> {
    match scheduler::request(SyscallRequest::Wakeup { target }) {
        SyscallResult::Ok => Ok(()),
        SyscallResult::Err(e) => Err(e),
        _ => unreachable!("wakeup yields Ok or Err"),
    }
}

pub fn sys_chpri(priority: u8) -> Result<u8, KernelError> {
    match scheduler::request(SyscallRequest::ChangePriority { priority }) {
        SyscallResult::Priority(old) => Ok(old),
        SyscallResult::Err(e) => Err(e),
        _ => unreachable!("chpri yields Priority or Err"),
    }
}

pub fn sys_getid() -> ThreadId {
    match scheduler::request(SyscallRequest::GetId) {
        SyscallResult::Id(id) => id,
        _ => unreachable!("getid yields Id"),
    }
}
