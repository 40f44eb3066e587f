//! Architecture-specific context primitives.
//!
//! Spec §9 requires implementations to isolate exactly two operations
//! behind an otherwise-portable scheduler: `context_init` and
//! `context_switch`. This is the only module in the kernel with inline
//! assembly. Adapted from
//! `TheDigitalVirus-goofy-os/kernel/src/tasks/state.rs`'s `State` frame
//! and `create_stack_frame`, and the naked-function trampoline shape of
//! `tasks/syscall.rs`'s `syscall_handler`.

use contract::syscall::ThreadEntry;
use core::arch::naked_asm;

/// Callee-saved register frame plus the instruction pointer a freshly
/// created thread resumes at. Matches the `State` struct's field order in
/// the teacher module, minus the caller-saved registers (the trap path,
/// not this one, is responsible for those).
#[repr(C)]
struct InitialFrame {
    r15: u64,
    r14: u64,
    r13: u64,
    r12: u64,
    rbx: u64,
    rbp: u64,
    /// `context_switch`'s `ret` resumes here.
    rip: u64,
}

/// Builds the initial saved stack pointer for a newly-created thread, per
/// spec §9's `context_init(stack, entry, argc, argv, exit_trampoline) ->
/// context_ref` primitive. The returned value is what `Tcb::saved_sp`
/// should hold: the first `context_switch` into this thread lands it at
/// `trampoline_entry`, which calls `entry(argc, argv)` and then calls
/// `exit_trampoline` if `entry` returns, per spec §4.3's "upon return,
/// invokes the exit system call".
pub fn context_init(
    stack_base: usize,
    stack_size: usize,
    entry: ThreadEntry,
    argc: usize,
    argv: *const *const u8,
    exit_trampoline: extern "C" fn() -> !,
) -> usize {
    // x86_64 requires rsp % 16 == 0 at a call instruction; we're building
    // a frame as if `ret` had just fired, so leave room for the return
    // address a real `call` would have pushed.
    let top = (stack_base + stack_size) & !0xF;

    unsafe {
        let mut sp = top;

        sp -= core::mem::size_of::<usize>() * 4;
        // Laid out low-to-high as entry, argc, argv, exit_trampoline so
        // `trampoline_entry`'s four `pop`s land them in that order.
        let arg_slot = sp as *mut usize;
        arg_slot.write(entry as usize);
        arg_slot.add(1).write(argc);
        arg_slot.add(2).write(argv as usize);
        arg_slot.add(3).write(exit_trampoline as usize);

        sp -= core::mem::size_of::<InitialFrame>();
        let frame = sp as *mut InitialFrame;
        (*frame).rip = trampoline_entry as usize as u64;
        (*frame).rbp = 0;
        (*frame).rbx = 0;
        (*frame).r12 = 0;
        (*frame).r13 = 0;
        (*frame).r14 = 0;
        (*frame).r15 = 0;

        sp
    }
}

/// First instruction ever executed on a new thread's stack. Pulls
/// `(entry, argc, argv, exit_trampoline)` back off the slots
/// `context_init` planted just above this frame, calls `entry(argc,
/// argv)`, and if that returns, calls `exit_trampoline` (which never
/// returns -- it re-enters the scheduler via the `exit` syscall service).
#[unsafe(naked)]
unsafe extern "C" fn trampoline_entry() -> ! {
    naked_asm!(
        "pop r12",   // entry
        "pop rdi",   // argc (1st arg to entry, per SysV ABI)
        "pop rsi",   // argv (2nd arg to entry)
        "pop r13",   // exit_trampoline
        "call r12",
        "call r13",
        // exit_trampoline is `-> !`; this is unreachable.
        "ud2",
    )
}

/// Saves the callee-saved registers and stack pointer of the current
/// thread into `*from_sp`, then resumes execution from `to_sp`. Never
/// returns to its caller directly -- it returns into whatever the
/// resumed thread's saved frame points at, which may be a different
/// call site entirely the next time `*from_sp`'s owner runs again.
#[unsafe(naked)]
pub unsafe extern "C" fn context_switch(from_sp: *mut usize, to_sp: usize) {
    naked_asm!(
        "push rbp",
        "push rbx",
        "push r12",
        "push r13",
        "push r14",
        "push r15",
        "mov [rdi], rsp",
        "mov rsp, rsi",
        "pop r15",
        "pop r14",
        "pop r13",
        "pop r12",
        "pop rbx",
        "pop rbp",
        "ret",
    )
}
