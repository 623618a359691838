use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Deferred work a capability can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Scheduler: the "next behavior" delay elapsed.
    BehaviorDue,
    /// Scheduler: the running behavior's duration elapsed.
    BehaviorFinished,
    /// Scheduler: sleep mode re-asserts the sleep animation.
    SleepReassert,
    /// Movement: a temporary speed burst ends.
    SpeedBurstEnd,
}

/// A task that came due, handed back to the world for dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DueTask {
    pub entity: hecs::Entity,
    /// Install token of the capability that scheduled it. Callbacks compare
    /// it with the currently installed capability and drop mismatches.
    pub token: u64,
    pub task: Task,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    due_us: u64,
    seq: u64,
    job: DueTask,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due_us == other.due_us && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap, we want the earliest first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due_us, other.seq).cmp(&(self.due_us, self.seq))
    }
}

/// Timer queue driven by simulation time. Polled once per tick on the
/// update thread, so callbacks never race entity state.
pub struct TaskQueue {
    now_us: u64,
    seq: u64,
    next_token: u64,
    heap: BinaryHeap<Entry>,
}

fn secs_to_us(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1_000_000.0).round() as u64
    } else {
        0
    }
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            now_us: 0,
            seq: 0,
            next_token: 1,
            heap: BinaryHeap::with_capacity(64),
        }
    }

    /// Simulation clock in seconds.
    pub fn now(&self) -> f64 {
        self.now_us as f64 / 1_000_000.0
    }

    pub fn advance(&mut self, dt: f64) {
        self.now_us = self.now_us.saturating_add(secs_to_us(dt));
    }

    /// Fresh install token. Never reused.
    pub fn issue_token(&mut self) -> u64 {
        let token = self.next_token;
        self.next_token += 1;
        token
    }

    pub fn schedule(&mut self, delay_secs: f64, entity: hecs::Entity, token: u64, task: Task) {
        self.seq += 1;
        self.heap.push(Entry {
            due_us: self.now_us.saturating_add(secs_to_us(delay_secs)),
            seq: self.seq,
            job: DueTask {
                entity,
                token,
                task,
            },
        });
    }

    /// Pop the earliest task whose time has come.
    pub fn pop_due(&mut self) -> Option<DueTask> {
        if self.heap.peek()?.due_us > self.now_us {
            return None;
        }
        self.heap.pop().map(|e| e.job)
    }

    /// Drop every pending task for `entity`.
    pub fn cancel_entity(&mut self, entity: hecs::Entity) {
        self.heap.retain(|e| e.job.entity != entity);
    }

    /// Drop pending tasks issued under `token`.
    pub fn cancel_token(&mut self, token: u64) {
        self.heap.retain(|e| e.job.token != token);
    }

    pub fn pending_for(&self, entity: hecs::Entity) -> usize {
        self.heap.iter().filter(|e| e.job.entity == entity).count()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> hecs::Entity {
        hecs::World::new().spawn(())
    }

    #[test]
    fn fires_in_due_order() {
        let e = entity();
        let mut q = TaskQueue::new();
        q.schedule(2.0, e, 1, Task::BehaviorFinished);
        q.schedule(1.0, e, 1, Task::BehaviorDue);
        assert!(q.pop_due().is_none());

        q.advance(1.5);
        assert_eq!(q.pop_due().map(|t| t.task), Some(Task::BehaviorDue));
        assert!(q.pop_due().is_none());

        q.advance(1.0);
        assert_eq!(q.pop_due().map(|t| t.task), Some(Task::BehaviorFinished));
        assert!(q.is_empty());
    }

    #[test]
    fn same_deadline_keeps_insertion_order() {
        let e = entity();
        let mut q = TaskQueue::new();
        q.schedule(1.0, e, 1, Task::SleepReassert);
        q.schedule(1.0, e, 1, Task::SpeedBurstEnd);
        q.advance(1.0);
        assert_eq!(q.pop_due().map(|t| t.task), Some(Task::SleepReassert));
        assert_eq!(q.pop_due().map(|t| t.task), Some(Task::SpeedBurstEnd));
    }

    #[test]
    fn cancel_drops_pending() {
        let e = entity();
        let mut q = TaskQueue::new();
        q.schedule(1.0, e, 7, Task::BehaviorDue);
        q.schedule(1.0, e, 8, Task::SpeedBurstEnd);
        q.cancel_token(7);
        assert_eq!(q.pending_for(e), 1);
        q.cancel_entity(e);
        assert!(q.is_empty());
    }

    #[test]
    fn tokens_are_unique() {
        let mut q = TaskQueue::new();
        let a = q.issue_token();
        let b = q.issue_token();
        assert_ne!(a, b);
    }
}
