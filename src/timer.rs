use std::cell::{Cell, RefCell};
use std::time::Duration;
use tracing::debug;

pub type Task = Box<dyn FnOnce()>;

/// Runs a task once after a delay, on the same thread that scheduled it.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Task);
}

struct Pending {
    due: Duration,
    task: Task,
}

/// Virtual-time scheduler. Nothing runs until [`ManualScheduler::advance`]
/// moves the clock past a task's due time.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    pending: RefCell<Vec<Pending>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Moves the clock forward, running due tasks in due-time order. Tasks
    /// scheduled by a running task are picked up if they fall inside the
    /// window.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        while let Some(next) = self.take_next_due(target) {
            self.now.set(next.due);
            (next.task)();
        }
        self.now.set(target);
    }

    /// Runs everything still pending, however far in the future.
    pub fn run_all(&self) {
        let last_due = self
            .pending
            .borrow()
            .iter()
            .map(|pending| pending.due)
            .max();
        if let Some(due) = last_due {
            self.advance(due.saturating_sub(self.now.get()));
        }
    }

    fn take_next_due(&self, target: Duration) -> Option<Pending> {
        let mut pending = self.pending.borrow_mut();
        let index = pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= target)
            .min_by_key(|(_, p)| p.due)
            .map(|(index, _)| index)?;
        Some(pending.remove(index))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let due = self.now.get() + delay;
        debug!("Task scheduled at {:?}", due);
        self.pending.borrow_mut().push(Pending { due, task });
    }
}
