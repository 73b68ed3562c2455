//! Delay-based one-shot task scheduler.
//!
//! Tasks are identified by a [`TaskId`] and carry a caller-chosen payload.
//! Each call to [`Scheduler::update`] counts every pending delay down by the
//! number of elapsed ticks and hands back the tasks that became due, in the
//! order they were scheduled.

use estate_types::TaskId;
use tracing::trace;

#[derive(Debug, Clone)]
struct PendingTask<T> {
    id: TaskId,
    payload: T,
    remaining: u64,
}

/// Pending tasks with a payload of type `T`.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    pending: Vec<PendingTask<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` to fire after `delay_ticks` ticks.
    ///
    /// A task already pending under `id` is replaced, and the replacement
    /// is ordered as if newly scheduled. A delay of 0 fires on the next
    /// [`Self::update`].
    pub fn schedule(&mut self, id: TaskId, payload: T, delay_ticks: u64) {
        self.pending.retain(|task| task.id != id);
        trace!(task = %id, delay_ticks, "task scheduled");
        self.pending.push(PendingTask {
            id,
            payload,
            remaining: delay_ticks,
        });
    }

    /// Advance by `delta_ticks`, removing and returning every task that is now due.
    pub fn update(&mut self, delta_ticks: u64) -> Vec<(TaskId, T)> {
        let mut due = Vec::new();
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for mut task in self.pending.drain(..) {
            task.remaining = task.remaining.saturating_sub(delta_ticks);
            if task.remaining == 0 {
                trace!(task = %task.id, "task fired");
                due.push((task.id, task.payload));
            } else {
                still_pending.push(task);
            }
        }
        self.pending = still_pending;
        due
    }

    /// Remove a pending task. Returns whether it existed.
    pub fn cancel(&mut self, id: &TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|task| task.id != *id);
        self.pending.len() != before
    }

    /// Ticks left before `id` fires, if it is pending.
    pub fn remaining(&self, id: &TaskId) -> Option<u64> {
        self.pending
            .iter()
            .find(|task| task.id == *id)
            .map(|task| task.remaining)
    }

    /// Whether `id` is pending.
    pub fn is_scheduled(&self, id: &TaskId) -> bool {
        self.pending.iter().any(|task| task.id == *id)
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Callback = Box<dyn FnOnce() -> u32>;

    fn callback(value: u32) -> Callback {
        Box::new(move || value)
    }

    #[test]
    fn fires_after_delay() {
        let mut scheduler: Scheduler<Callback> = Scheduler::new();
        scheduler.schedule(TaskId::new("a"), callback(1), 3);
        assert!(scheduler.update(1).is_empty());
        assert!(scheduler.update(1).is_empty());
        assert_eq!(scheduler.remaining(&TaskId::new("a")), Some(1));
        let fired = scheduler.update(1);
        let values: Vec<u32> = fired.into_iter().map(|(_, f)| f()).collect();
        assert_eq!(values, vec![1]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn overshoot_fires_once() {
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        scheduler.schedule(TaskId::new("a"), 7, 2);
        assert_eq!(scheduler.update(10).len(), 1);
        assert!(scheduler.update(10).is_empty());
    }

    #[test]
    fn simultaneous_tasks_fire_in_insertion_order() {
        let mut scheduler: Scheduler<Callback> = Scheduler::new();
        scheduler.schedule(TaskId::new("late"), callback(3), 5);
        scheduler.schedule(TaskId::new("first"), callback(1), 2);
        scheduler.schedule(TaskId::new("second"), callback(2), 1);
        let fired = scheduler.update(5);
        let ids: Vec<String> = fired.iter().map(|(id, _)| id.to_string()).collect();
        assert_eq!(ids, vec!["late", "first", "second"]);
        let values: Vec<u32> = fired.into_iter().map(|(_, f)| f()).collect();
        assert_eq!(values, vec![3, 1, 2]);
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut scheduler: Scheduler<Callback> = Scheduler::new();
        scheduler.schedule(TaskId::new("a"), callback(1), 1);
        scheduler.schedule(TaskId::new("b"), callback(2), 1);
        assert!(scheduler.cancel(&TaskId::new("a")));
        assert!(!scheduler.cancel(&TaskId::new("a")));
        let fired = scheduler.update(1);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired.first().map(|(id, _)| id.as_str()), Some("b"));
    }

    #[test]
    fn rescheduling_replaces_existing_task() {
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        scheduler.schedule(TaskId::new("a"), 1, 1);
        scheduler.schedule(TaskId::new("a"), 2, 3);
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.update(1).is_empty());
        let fired = scheduler.update(2);
        assert_eq!(fired.first().map(|(_, v)| *v), Some(2));
    }

    #[test]
    fn zero_delay_fires_next_update() {
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        scheduler.schedule(TaskId::new("now"), 1, 0);
        assert!(scheduler.is_scheduled(&TaskId::new("now")));
        assert_eq!(scheduler.update(0).len(), 1);
    }
}
