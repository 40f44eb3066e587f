//! Per-priority FIFO ready queues.
//!
//! Generalizes `TheDigitalVirus-goofy-os/kernel/src/tasks/task.rs`'s
//! `PriorityTaskQueue` (there, a `BTreeMap`/`VecDeque`-backed structure
//! keyed by `TaskPriority`) to a fixed array of intrusive singly-linked
//! lists threaded through `Tcb::next`, since this kernel has no heap.

use contract::ThreadId;

use crate::task::{NUM_PRIORITIES, Tcb};

#[derive(Clone, Copy)]
struct Lane {
    head: Option<ThreadId>,
    tail: Option<ThreadId>,
}

impl Lane {
    const fn empty() -> Self {
        Lane {
            head: None,
            tail: None,
        }
    }
}

/// One FIFO lane per priority level. Pushing and popping never allocate;
/// linkage lives inside the TCBs themselves (`table` is the thread table
/// these ids index into).
pub struct PriorityReadyQueue {
    lanes: [Lane; NUM_PRIORITIES],
}

impl PriorityReadyQueue {
    pub const fn new() -> Self {
        PriorityReadyQueue {
            lanes: [Lane::empty(); NUM_PRIORITIES],
        }
    }

    /// Appends `id` to the tail of its priority lane. `table[id]` must
    /// already have its priority set and must not be linked elsewhere.
    pub fn push(&mut self, id: ThreadId, table: &mut [Tcb]) {
        let prio = table[id.raw() as usize].priority as usize;
        table[id.raw() as usize].next = None;
        let lane = &mut self.lanes[prio];
        match lane.tail {
            Some(tail) => {
                table[tail.raw() as usize].next = Some(id);
                lane.tail = Some(id);
            }
            None => {
                lane.head = Some(id);
                lane.tail = Some(id);
            }
        }
    }

    /// Pops the head of the highest-priority (lowest numeric value)
    /// non-empty lane.
    pub fn pop(&mut self, table: &mut [Tcb]) -> Option<ThreadId> {
        for prio in 0..NUM_PRIORITIES {
            if let Some(id) = self.pop_lane(prio, table) {
                return Some(id);
            }
        }
        None
    }

    /// Pops the head of the highest-priority lane at or above (numerically
    /// at or below) `current_prio`. Used to decide whether a just-yielded
    /// or still-running thread should be preempted by something no lower
    /// in priority than itself, per spec §4.4's tie-break / preemption
    /// rule.
    pub fn pop_with_prio(&mut self, current_prio: u8, table: &mut [Tcb]) -> Option<ThreadId> {
        for prio in 0..=(current_prio as usize).min(NUM_PRIORITIES - 1) {
            if let Some(id) = self.pop_lane(prio, table) {
                return Some(id);
            }
        }
        None
    }

    fn pop_lane(&mut self, prio: usize, table: &mut [Tcb]) -> Option<ThreadId> {
        let lane = &mut self.lanes[prio];
        let head = lane.head?;
        let next = table[head.raw() as usize].next.take();
        lane.head = next;
        if next.is_none() {
            lane.tail = None;
        }
        Some(head)
    }

    /// True if every lane is empty -- the scheduler's idle-loop condition.
    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(|l| l.head.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{MAX_THREADS, Name, WaitReason};
    use std::vec::Vec;

    fn table_with(priorities: &[u8]) -> ([Tcb; MAX_THREADS], Vec<ThreadId>) {
        let mut table = core::array::from_fn(|_| Tcb::vacant());
        let mut ids = Vec::new();
        for (i, &p) in priorities.iter().enumerate() {
            let id = ThreadId::from_raw(i as u32);
            table[i].id = id;
            table[i].priority = p;
            table[i].name = Name::from_str("t");
            table[i].state = WaitReason::Runnable;
            table[i].live = true;
            ids.push(id);
        }
        (table, ids)
    }

    #[test]
    fn fifo_within_priority() {
        let (mut table, ids) = table_with(&[5, 5, 5]);
        let mut q = PriorityReadyQueue::new();
        for &id in &ids {
            q.push(id, &mut table);
        }
        assert_eq!(q.pop(&mut table), Some(ids[0]));
        assert_eq!(q.pop(&mut table), Some(ids[1]));
        assert_eq!(q.pop(&mut table), Some(ids[2]));
        assert_eq!(q.pop(&mut table), None);
    }

    #[test]
    fn higher_priority_served_first() {
        let (mut table, ids) = table_with(&[7, 2, 5]);
        let mut q = PriorityReadyQueue::new();
        for &id in &ids {
            q.push(id, &mut table);
        }
        assert_eq!(q.pop(&mut table), Some(ids[1])); // priority 2
        assert_eq!(q.pop(&mut table), Some(ids[2])); // priority 5
        assert_eq!(q.pop(&mut table), Some(ids[0])); // priority 7
    }

    #[test]
    fn pop_with_prio_ignores_lower_priority_work() {
        let (mut table, ids) = table_with(&[7]);
        let mut q = PriorityReadyQueue::new();
        q.push(ids[0], &mut table);
        // current thread runs at priority 2; only priority <=2 should preempt it
        assert_eq!(q.pop_with_prio(2, &mut table), None);
        assert_eq!(q.pop(&mut table), Some(ids[0]));
    }
}
