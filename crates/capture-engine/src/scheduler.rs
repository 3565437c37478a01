//! Cancellable delayed tasks in virtual time.
//!
//! Time is a [`Duration`] since the scheduler was created. Nothing here
//! sleeps: callers ask for the next deadline, wait however they like, then
//! pop whatever has come due. Tasks sharing a deadline fire in the order
//! they were scheduled.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Handle to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Delayed task queue keyed by `(deadline, sequence)`.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), T>,
    deadlines: HashMap<u64, Duration>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of tasks still pending.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Run `task` once `delay` has elapsed from now.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let deadline = self.now.saturating_add(delay);
        self.queue.insert((deadline, seq), task);
        self.deadlines.insert(seq, deadline);
        TaskId(seq)
    }

    /// Drop a pending task. Returns it if it had not fired yet.
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let deadline = self.deadlines.remove(&id.0)?;
        self.queue.remove(&(deadline, id.0))
    }

    /// Drop every pending task, returning how many there were.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.queue.len();
        self.queue.clear();
        self.deadlines.clear();
        cancelled
    }

    /// Deadline of the earliest pending task.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Remove the earliest task due at or before `until`.
    ///
    /// Virtual time moves forward to the task's deadline, never backward.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TaskId, T)> {
        let (&(deadline, seq), _) = self.queue.iter().next()?;
        if deadline > until {
            return None;
        }
        let task = self.queue.remove(&(deadline, seq))?;
        self.deadlines.remove(&seq);
        self.now = self.now.max(deadline);
        Some((TaskId(seq), task))
    }

    /// Move virtual time forward to `to` without firing anything.
    pub fn advance_to(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn pops_in_deadline_order_then_fifo() {
        let mut sched = Scheduler::new();
        sched.schedule(ms(300), "late");
        sched.schedule(ms(100), "first");
        sched.schedule(ms(100), "second");

        assert_eq!(sched.next_deadline(), Some(ms(100)));
        assert_eq!(sched.pop_due(ms(1000)).map(|(_, t)| t), Some("first"));
        assert_eq!(sched.pop_due(ms(1000)).map(|(_, t)| t), Some("second"));
        assert_eq!(sched.now(), ms(100));
        assert_eq!(sched.pop_due(ms(1000)).map(|(_, t)| t), Some("late"));
        assert_eq!(sched.pop_due(ms(1000)), None);
    }

    #[test]
    fn nothing_fires_before_its_deadline() {
        let mut sched = Scheduler::new();
        sched.schedule(ms(500), ());
        assert!(sched.pop_due(ms(499)).is_none());
        assert_eq!(sched.now(), Duration::ZERO);
        assert!(sched.pop_due(ms(500)).is_some());
    }

    #[test]
    fn delays_are_relative_to_current_time() {
        let mut sched = Scheduler::new();
        sched.advance_to(ms(1000));
        sched.schedule(ms(300), ());
        assert_eq!(sched.next_deadline(), Some(ms(1300)));

        sched.advance_to(ms(10));
        assert_eq!(sched.now(), ms(1000));
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut sched = Scheduler::new();
        let a = sched.schedule(ms(10), 'a');
        sched.schedule(ms(20), 'b');

        assert_eq!(sched.cancel(a), Some('a'));
        assert_eq!(sched.cancel(a), None);
        assert_eq!(sched.pending(), 1);

        assert_eq!(sched.cancel_all(), 1);
        assert_eq!(sched.next_deadline(), None);
        assert!(sched.pop_due(Duration::MAX).is_none());
    }
}
