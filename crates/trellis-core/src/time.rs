//! Frame-driven scheduling
//!
//! The host owns the frame clock and reports elapsed time. The scheduler keeps
//! two kinds of tasks:
//! - one-shot timers that fire once a delay has elapsed
//! - per-tick tasks that fire on every advance until cancelled
//!
//! Tasks carry a [`ChangeTicket`] instead of a callback. Whoever drives the
//! scheduler routes the ticket to the change it names.

use crate::{ChangeTicket, TaskId};
use std::time::Duration;

/// A fired task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub task: TaskId,
    pub ticket: ChangeTicket,
}

#[derive(Debug, Clone)]
struct Timer {
    task: TaskId,
    due: Duration,
    ticket: ChangeTicket,
}

/// Deterministic single-threaded scheduler
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    now: Duration,
    next_task: u64,
    /// One-shot timers, kept sorted by due time (stable for equal times)
    timers: Vec<Timer>,
    /// Per-tick tasks in registration order
    tickers: Vec<(TaskId, ChangeTicket)>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scheduler time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `ticket` once `delay` has elapsed
    pub fn schedule_after(&mut self, delay: Duration, ticket: ChangeTicket) -> TaskId {
        let task = self.allocate();
        let due = self.now + delay;
        let index = self.timers.partition_point(|t| t.due <= due);
        self.timers.insert(index, Timer { task, due, ticket });
        tracing::trace!(task = task.0, due_ms = due.as_millis() as u64, "timer scheduled");
        task
    }

    /// Fire `ticket` on every advance until cancelled
    pub fn every_tick(&mut self, ticket: ChangeTicket) -> TaskId {
        let task = self.allocate();
        self.tickers.push((task, ticket));
        task
    }

    /// Cancel a pending task. Returns false when it already fired or never existed.
    pub fn cancel(&mut self, task: TaskId) -> bool {
        if let Some(index) = self.timers.iter().position(|t| t.task == task) {
            self.timers.remove(index);
            return true;
        }
        if let Some(index) = self.tickers.iter().position(|(t, _)| *t == task) {
            self.tickers.remove(index);
            return true;
        }
        false
    }

    /// Pop the earliest timer due at or before `until`
    ///
    /// The clock moves to the timer's due time, so work triggered by this
    /// timer is scheduled relative to the moment it fired.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired> {
        let first = self.timers.first()?;
        if first.due > until {
            return None;
        }
        let timer = self.timers.remove(0);
        self.now = self.now.max(timer.due);
        tracing::trace!(task = timer.task.0, now_ms = self.now.as_millis() as u64, "timer fired");
        Some(Fired {
            task: timer.task,
            ticket: timer.ticket,
        })
    }

    /// Move the clock forward to `time` (never backwards)
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }

    /// Snapshot of the per-tick tasks registered right now
    pub fn tickers(&self) -> Vec<Fired> {
        self.tickers
            .iter()
            .map(|&(task, ticket)| Fired { task, ticket })
            .collect()
    }

    /// Check whether a per-tick task is still registered
    pub fn is_ticking(&self, task: TaskId) -> bool {
        self.tickers.iter().any(|(t, _)| *t == task)
    }

    /// Number of tasks still waiting to fire
    pub fn pending(&self) -> usize {
        self.timers.len() + self.tickers.len()
    }

    fn allocate(&mut self) -> TaskId {
        let task = TaskId(self.next_task);
        self.next_task += 1;
        task
    }
}
