//! The scheduler: thread table, ready queues, and the seven primitive
//! system calls (spec §4.3/§4.4). Generalizes
//! `TheDigitalVirus-goofy-os/kernel/src/tasks/scheduler.rs`'s `Scheduler`
//! (there, an `Arc<Spinlock<Task>>`-based table behind a global
//! `Spinlock<Option<Scheduler>>`) onto a fixed-capacity array, since this
//! kernel has no heap.
//!
//! Following the teacher module's own pattern, the global lock is held
//! only while *deciding* what to run next -- never across the actual
//! `context_switch`, since that call may not "return" into this stack
//! frame until long after some other thread has taken the lock again.

use contract::syscall::ThreadEntry;
use contract::{SyscallResult, ThreadId};
use spinning_top::Spinlock;

use crate::context::{context_init, context_switch};
use crate::error::{KernelError, Result};
use crate::irq::irqsave;
use crate::queue::PriorityReadyQueue;
use crate::task::{IDLE_PRIORITY, MAX_THREADS, Name, PRIORITY_NO_CHANGE, Tcb, WaitReason};
use crate::{arena, vector};

/// Default stack size handed to `run` callers that don't override it.
pub const DEFAULT_STACK_SIZE: usize = 4096;

/// What the scheduler decided while holding its lock: either stay put,
/// or switch away, carrying the raw stack-pointer slots `context_switch`
/// needs. Computed and returned with the lock released, per the note
/// above.
struct SwitchDecision {
    from_sp_ptr: *mut usize,
    to_sp: usize,
    to_stack_top: usize,
}

// SAFETY: `from_sp_ptr` points into the single static scheduler table and
// is only ever dereferenced on this core with interrupts masked.
unsafe impl Send for SwitchDecision {}

struct Scheduler {
    table: [Tcb; MAX_THREADS],
    ready: PriorityReadyQueue,
    current: ThreadId,
    idle_id: ThreadId,
    next_id: u32,
}

impl Scheduler {
    fn new() -> Self {
        let mut table = core::array::from_fn(|_| Tcb::vacant());
        let idle_id = ThreadId::from_raw(0);
        table[0] = Tcb {
            id: idle_id,
            name: Name::from_str("idle"),
            priority: IDLE_PRIORITY,
            state: WaitReason::Runnable,
            live: true,
            ..Tcb::vacant()
        };

        Scheduler {
            table,
            ready: PriorityReadyQueue::new(),
            current: idle_id,
            idle_id,
            next_id: 1,
        }
    }

    fn alloc_slot(&mut self) -> Result<usize> {
        self.table
            .iter()
            .position(|t| !t.live)
            .ok_or(KernelError::OutOfMemory)
    }

    fn fresh_id(&mut self) -> ThreadId {
        let id = ThreadId::from_raw(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    fn find_slot(&self, id: ThreadId) -> Option<usize> {
        self.table.iter().position(|t| t.live && t.id == id)
    }

    /// `run`: spec §4.3 steps 1-4.
    fn run(
        &mut self,
        entry: ThreadEntry,
        name: &str,
        priority: u8,
        stacksize: usize,
        argc: usize,
        argv: *const *const u8,
    ) -> Result<ThreadId> {
        if priority as usize >= crate::task::NUM_PRIORITIES {
            return Err(KernelError::BadPriority);
        }

        let slot = self.alloc_slot()?;
        let (stack_base, stack_size) = arena::alloc_stack(stacksize)?;
        let id = self.fresh_id();

        let saved_sp = context_init(stack_base, stack_size, entry, argc, argv, exit_trampoline);

        self.table[slot] = Tcb {
            id,
            name: Name::from_str(name),
            priority,
            entry: Some(entry),
            argc,
            argv,
            stack_base,
            stack_size,
            saved_sp,
            next: None,
            state: WaitReason::Runnable,
            request: Default::default(),
            live: true,
        };

        self.ready.push(id, &mut self.table);
        log::info!("run: created thread {} ({})", id, name);
        Ok(id)
    }

    fn getid(&self) -> ThreadId {
        self.current
    }

    /// Marks the caller Exiting; the returned decision always switches
    /// away (the caller never gets to run again).
    fn exit(&mut self) -> SwitchDecision {
        let slot = self.find_slot(self.current).expect("current thread live");
        log::info!("exit: thread {} exiting", self.current);
        self.table[slot].state = WaitReason::Exiting;
        self.decide_block()
    }

    /// `wait`: decide who's next among threads already on a ready lane
    /// (the caller is never one of them -- spec §3's invariant that the
    /// running thread is on no queue), then re-append the caller to the
    /// tail of its own lane. Same pop-before-push order `chpri` already
    /// uses, and for the same reason: pushing first would let the caller
    /// win its own decision whenever it's alone at its priority, starving
    /// any lower-priority thread that just became Runnable.
    fn wait(&mut self) -> Option<SwitchDecision> {
        let next = self.ready.pop(&mut self.table);
        if self.current != self.idle_id {
            self.ready.push(self.current, &mut self.table);
        }
        self.decide_switch(next.unwrap_or(self.idle_id))
    }

    fn sleep(&mut self) -> SwitchDecision {
        let slot = self.find_slot(self.current).expect("current thread live");
        self.table[slot].state = WaitReason::Sleeping;
        log::trace!("sleep: thread {} sleeping", self.current);
        self.decide_block()
    }

    /// spec §4.3's open-question resolution: no-op on a Runnable target,
    /// failure on an Exiting one. Never switches -- "the caller continues
    /// to run."
    fn wakeup(&mut self, target: ThreadId) -> Result<()> {
        let slot = self.find_slot(target).ok_or(KernelError::BadHandle)?;
        match self.table[slot].state {
            WaitReason::Sleeping => {
                self.table[slot].state = WaitReason::Runnable;
                self.ready.push(target, &mut self.table);
                log::trace!("wakeup: thread {} woken", target);
                Ok(())
            }
            WaitReason::Runnable => Ok(()),
            WaitReason::Exiting => Err(KernelError::IllegalThreadState),
        }
    }

    /// `chpri`: sentinel `PRIORITY_NO_CHANGE` just reports the current
    /// value. Otherwise the change takes effect immediately and forces a
    /// reschedule decision, per spec §4.3.
    fn chpri(&mut self, priority: u8) -> Result<(u8, Option<SwitchDecision>)> {
        let slot = self.find_slot(self.current).expect("current thread live");
        if priority == PRIORITY_NO_CHANGE {
            return Ok((self.table[slot].priority, None));
        }
        if priority as usize >= crate::task::NUM_PRIORITIES {
            return Err(KernelError::BadPriority);
        }
        let old = self.table[slot].priority;
        self.table[slot].priority = priority;
        log::trace!("chpri: thread {} {} -> {}", self.current, old, priority);

        let decision = self
            .ready
            .pop_with_prio(priority, &mut self.table)
            .map(|next| {
                self.ready.push(self.current, &mut self.table);
                self.decide_switch(next).expect("next != current by construction")
            });
        Ok((old, decision))
    }

    /// Caller is leaving the ready set entirely (sleep, exit): whatever's
    /// highest-priority now (or idle) must run next.
    fn decide_block(&mut self) -> SwitchDecision {
        let next = self.ready.pop(&mut self.table).unwrap_or(self.idle_id);
        self.decide_switch(next)
            .unwrap_or_else(|| panic!("blocking thread cannot switch to itself"))
    }

    fn decide_switch(&mut self, next: ThreadId) -> Option<SwitchDecision> {
        if next == self.current {
            return None;
        }
        let from_slot = self.find_slot(self.current).expect("current thread live");
        let from_sp_ptr: *mut usize = &mut self.table[from_slot].saved_sp;
        let to_slot = self.find_slot(next).expect("next thread live");
        let to_sp = self.table[to_slot].saved_sp;
        let to_stack_top = self.table[to_slot].stack_base + self.table[to_slot].stack_size;

        log::trace!("switch: {} -> {}", self.current, next);
        self.current = next;

        Some(SwitchDecision {
            from_sp_ptr,
            to_sp,
            to_stack_top,
        })
    }

    /// Frees the table slot of any thread that switched away while
    /// Exiting. Deferred until after the switch away from it, since its
    /// own stack is in use up to the `context_switch` call.
    fn reap_exited(&mut self) {
        for t in self.table.iter_mut() {
            if t.live && t.state == WaitReason::Exiting && t.id != self.current {
                log::info!("reap: thread {} released", t.id);
                *t = Tcb::vacant();
            }
        }
    }
}

/// Performs a switch decision if one was made, and always reaps exited
/// threads afterward. Interrupts must already be masked by the caller;
/// this is the only place `context_switch` is actually invoked.
fn perform(decision: Option<SwitchDecision>) {
    if let Some(d) = decision {
        bsp::gdt::set_kernel_stack(x86_64::VirtAddr::new(d.to_stack_top as u64));
        unsafe { context_switch(d.from_sp_ptr, d.to_sp) };
    }
    with_scheduler(|s| s.reap_exited());
}

extern "C" fn exit_trampoline() -> ! {
    exit()
}

static SCHEDULER: Spinlock<Option<Scheduler>> = Spinlock::new(None);

fn with_scheduler<R>(f: impl FnOnce(&mut Scheduler) -> R) -> R {
    let mut guard = SCHEDULER.lock();
    f(guard.as_mut().expect("scheduler not initialized"))
}

pub fn run(
    entry: ThreadEntry,
    name: &str,
    priority: u8,
    stacksize: usize,
    argc: usize,
    argv: *const *const u8,
) -> Result<ThreadId> {
    irqsave(|| with_scheduler(|s| s.run(entry, name, priority, stacksize, argc, argv)))
}

pub fn exit() -> ! {
    let decision = irqsave(|| with_scheduler(|s| s.exit()));
    perform(Some(decision));
    unreachable!("a thread that exited is never switched back to");
}

pub fn wait() {
    let decision = irqsave(|| with_scheduler(|s| s.wait()));
    perform(decision);
}

pub fn sleep() {
    let decision = irqsave(|| with_scheduler(|s| s.sleep()));
    perform(Some(decision));
}

pub fn wakeup(target: ThreadId) -> Result<()> {
    irqsave(|| with_scheduler(|s| s.wakeup(target)))
}

pub fn chpri(priority: u8) -> Result<u8> {
    let (old, decision) = irqsave(|| with_scheduler(|s| s.chpri(priority)))?;
    perform(decision);
    Ok(old)
}

pub fn getid() -> ThreadId {
    irqsave(|| with_scheduler(|s| s.getid()))
}

/// Reads and clears the current thread's pending request, per spec §4.5
/// step 4: "the installed syscall handler reads the request slot."
pub fn take_current_request() -> Option<contract::SyscallRequest> {
    irqsave(|| {
        with_scheduler(|s| {
            let slot = s.find_slot(s.current).expect("current thread live");
            s.table[slot].request.request.take()
        })
    })
}

/// Writes the outcome of a handled syscall back into the caller's
/// parameter block.
pub fn set_current_result(result: SyscallResult) {
    irqsave(|| {
        with_scheduler(|s| {
            let slot = s.find_slot(s.current).expect("current thread live");
            s.table[slot].request.result = Some(result);
        })
    })
}

/// A thread's half of a syscall: stash the request, trap, and read back
/// the result the kernel wrote. This is the only place user code touches
/// the request slot directly.
pub fn request(req: contract::SyscallRequest) -> SyscallResult {
    irqsave(|| {
        with_scheduler(|s| {
            let slot = s.find_slot(s.current).expect("current thread live");
            s.table[slot].request.request = Some(req);
        })
    });
    crate::syscall::trap();
    irqsave(|| {
        with_scheduler(|s| {
            let slot = s.find_slot(s.current).expect("current thread live");
            s.table[slot]
                .request
                .result
                .take()
                .expect("syscall handler always writes a result")
        })
    })
}

/// Installs the `SoftError`/`Syscall` vector handlers, creates the first
/// thread, and hands off to the scheduler. Never returns under normal
/// operation, per spec §4.7.
pub fn kernel_start(
    entry: ThreadEntry,
    name: &str,
    priority: u8,
    stacksize: usize,
    argc: usize,
    argv: *const *const u8,
) -> ! {
    irqsave(|| {
        *SCHEDULER.lock() = Some(Scheduler::new());
    });

    vector::vector_init();
    vector::vector_set(contract::VectorKind::SoftError, crate::syscall::on_soft_error);
    vector::vector_set(contract::VectorKind::Syscall, crate::syscall::on_syscall_vector);

    match run(entry, name, priority, stacksize, argc, argv) {
        Ok(id) => log::info!("kernel_start: first thread {}", id),
        Err(e) => sysdown(e),
    }

    x86_64::instructions::interrupts::enable();
    loop {
        wait();
        x86_64::instructions::hlt();
    }
}

/// Masks interrupts and halts after a best-effort diagnostic, per spec
/// §7's `FatalInvariantViolated` handling.
pub fn sysdown(reason: KernelError) -> ! {
    x86_64::instructions::interrupts::disable();
    bsp::serial_println!("sysdown: {}", reason);
    loop {
        x86_64::instructions::hlt();
    }
}

/// `Scheduler`'s decision methods touch no hardware -- only `perform()`
/// and the module-level wrappers above call into `context_switch` -- so
/// they're exercised directly here on the host, the same way `queue.rs`'s
/// `table_with` builds a `PriorityReadyQueue` scenario in isolation.
#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    extern "C" fn test_entry(_argc: usize, _argv: *const *const u8) {}

    /// These tests never actually context-switch into a spawned thread,
    /// so the stack just needs to be big enough for `context_init`'s
    /// initial frame.
    const TEST_STACK: usize = 128;

    fn spawn(s: &mut Scheduler, name: &str, priority: u8) -> ThreadId {
        s.run(test_entry, name, priority, TEST_STACK, 0, core::ptr::null())
            .expect("arena has room and priority is valid")
    }

    // S1: single thread, single syscall. `T` calls `getid` then `exit`;
    // `getid` returns the id `run` assigned, and the system ends up idle
    // with nothing left Runnable.
    #[test]
    fn s1_single_thread_single_syscall() {
        let mut s = Scheduler::new();
        let t = spawn(&mut s, "T", 3);

        // idle dispatches T, same as `kernel_start`'s own `loop { wait(); ... }`.
        s.wait();
        assert_eq!(s.current, t);
        assert_eq!(s.getid(), t);

        s.exit();
        assert_eq!(s.current, s.idle_id, "idle runs once T exits");
        assert!(s.ready.is_empty(), "no thread remains Runnable");
    }

    // S2: round-robin at equal priority. Three threads at the same
    // priority, each calling `wait()` in a loop, dispatch in the order
    // they were created, wrapping around: A B C A B C A B C.
    #[test]
    fn s2_round_robin_at_equal_priority() {
        let mut s = Scheduler::new();
        let a = spawn(&mut s, "A", 5);
        let b = spawn(&mut s, "B", 5);
        let c = spawn(&mut s, "C", 5);

        s.wait(); // idle dispatches the first of the three

        let mut order = Vec::new();
        for _ in 0..9 {
            order.push(s.current);
            s.wait();
        }
        assert_eq!(order, [a, b, c, a, b, c, a, b, c]);
    }

    // S3: priority preemption via wakeup. Low-priority `L` sleeps;
    // high-priority `H` runs, wakes `L`, then waits; `L` -- the only
    // Runnable thread left -- runs next.
    #[test]
    fn s3_priority_preemption_via_wakeup() {
        let mut s = Scheduler::new();
        let l = spawn(&mut s, "L", 7);

        s.wait(); // idle dispatches L, the only thread so far
        assert_eq!(s.current, l);

        let h = spawn(&mut s, "H", 2);
        s.sleep(); // L sleeps; H is the only other Runnable thread
        assert_eq!(s.current, h);

        s.wakeup(l).expect("L is Sleeping");
        assert_eq!(s.current, h, "wakeup never switches away from the caller");

        s.wait();
        assert_eq!(s.current, l, "priority 7 is the only Runnable thread left");
    }

    // Invariant 3: after any syscall returns, the current thread is the
    // head of the highest-priority non-empty ready queue as of the
    // decision -- exercised here via `chpri` forcing a low-priority
    // thread to yield to one that outranks its new priority.
    #[test]
    fn invariant3_current_is_the_highest_priority_candidate() {
        let mut s = Scheduler::new();
        let low = spawn(&mut s, "low", 5);
        s.wait();
        assert_eq!(s.current, low);

        let high = spawn(&mut s, "high", 1);
        let (old, decision) = s.chpri(2).expect("priority 2 is valid");
        assert_eq!(old, 5, "chpri reports the prior priority");
        assert!(decision.is_some(), "high now outranks low's new priority");
        assert_eq!(s.current, high);

        // low is still Runnable, requeued at its new priority, not lost.
        assert!(!s.ready.is_empty());
    }

    // wakeup on an already-Runnable (never-slept) thread is a no-op and
    // never switches the caller away, per spec §4.3's open-question
    // resolution -- the path the `demo_main`/`worker` threads in
    // `main.rs` rely on when they wake each other before either sleeps.
    #[test]
    fn wakeup_on_runnable_thread_is_a_no_op() {
        let mut s = Scheduler::new();
        let a = spawn(&mut s, "A", 4);
        s.wait();
        assert_eq!(s.current, a);

        let b = spawn(&mut s, "B", 4);
        s.wakeup(b).expect("B is Runnable, not Sleeping");
        assert_eq!(s.current, a, "wakeup on a Runnable thread never switches");
    }
}
