//! Deferred work.

use std::cell::RefCell;
use std::rc::Rc;

/// A task run once after a delay.
pub type Task = Box<dyn FnOnce()>;

/// Runs tasks after a delay on the host's event loop.
pub trait Scheduler {
    /// Run `task` once, no sooner than `delay_ms` milliseconds from now.
    fn delayed_call(&self, delay_ms: u32, task: Task);
}

struct Pending {
    due_ms: u64,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct Clock {
    now_ms: u64,
    next_seq: u64,
    queue: Vec<Pending>,
}

/// Virtual-clock scheduler. Tasks run only when [`advance`](Self::advance)
/// moves the clock past their due time.
///
/// Used by tests and by hosts that drive their own frame clock.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<Clock>>,
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clock = self.clock.borrow();
        f.debug_struct("ManualScheduler")
            .field("now_ms", &clock.now_ms)
            .field("pending", &clock.queue.len())
            .finish()
    }
}

impl ManualScheduler {
    /// Create a scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.clock.borrow().now_ms
    }

    /// Number of tasks waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.clock.borrow().queue.len()
    }

    /// Move the clock forward by `ms`, running due tasks in due-time order.
    ///
    /// Tasks scheduled by a running task run in the same call if they fall
    /// due before the new time.
    pub fn advance(&self, ms: u64) {
        let target = self.clock.borrow().now_ms + ms;
        while let Some(pending) = self.pop_due(target) {
            self.clock.borrow_mut().now_ms = pending.due_ms;
            (pending.task)();
        }
        self.clock.borrow_mut().now_ms = target;
    }

    /// Run every pending task regardless of due time.
    pub fn flush(&self) {
        while let Some(due) = self.next_due() {
            let now = self.now_ms();
            self.advance(due.saturating_sub(now));
        }
    }

    fn next_due(&self) -> Option<u64> {
        self.clock.borrow().queue.iter().map(|p| p.due_ms).min()
    }

    fn pop_due(&self, target: u64) -> Option<Pending> {
        let mut clock = self.clock.borrow_mut();
        let index = clock
            .queue
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= target)
            .min_by_key(|(_, p)| (p.due_ms, p.seq))
            .map(|(i, _)| i)?;
        Some(clock.queue.swap_remove(index))
    }
}

impl Scheduler for ManualScheduler {
    fn delayed_call(&self, delay_ms: u32, task: Task) {
        let mut clock = self.clock.borrow_mut();
        let due_ms = clock.now_ms + u64::from(delay_ms);
        let seq = clock.next_seq;
        clock.next_seq += 1;
        clock.queue.push(Pending { due_ms, seq, task });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_run_in_due_order() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay, name) in [(30, "c"), (10, "a"), (20, "b"), (10, "a2")] {
            let log = Rc::clone(&log);
            scheduler.delayed_call(delay, Box::new(move || log.borrow_mut().push(name)));
        }

        scheduler.advance(15);
        assert_eq!(*log.borrow(), vec!["a", "a2"]);
        assert_eq!(scheduler.pending(), 2);

        scheduler.advance(100);
        assert_eq!(*log.borrow(), vec!["a", "a2", "b", "c"]);
        assert_eq!(scheduler.now_ms(), 115);
    }

    #[test]
    fn nested_tasks_run_when_due() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_log = Rc::clone(&log);
        let inner_scheduler = scheduler.clone();
        scheduler.delayed_call(
            10,
            Box::new(move || {
                inner_log.borrow_mut().push(1);
                let log = Rc::clone(&inner_log);
                inner_scheduler.delayed_call(10, Box::new(move || log.borrow_mut().push(2)));
            }),
        );

        scheduler.advance(25);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn flush_runs_everything() {
        let scheduler = ManualScheduler::new();
        let count = Rc::new(RefCell::new(0));
        for delay in [5, 500, 5000] {
            let count = Rc::clone(&count);
            scheduler.delayed_call(delay, Box::new(move || *count.borrow_mut() += 1));
        }
        scheduler.flush();
        assert_eq!(*count.borrow(), 3);
        assert_eq!(scheduler.pending(), 0);
    }
}
