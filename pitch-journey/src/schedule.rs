//! Scripted delays on a virtual millisecond clock.
//!
//! Every task carries the [`SessionToken`] that was current when it was
//! scheduled. The controller discards tasks whose token no longer matches,
//! so a restart or a manual step change cancels pending auto-advances.

use serde::{Deserialize, Serialize};

use crate::journey::{Journey, Step};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SessionToken(pub u64);

impl SessionToken {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "task", content = "to")]
pub enum ScheduledTask {
    AutoAdvance(Step),
    FinishTransition(Journey),
    FinishRestart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueTask {
    pub id: TaskId,
    pub due_ms: u64,
    pub task: ScheduledTask,
    pub token: SessionToken,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_id: u64,
    pending: Vec<DueTask>,
}

impl Scheduler {
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule(&mut self, delay_ms: u64, task: ScheduledTask, token: SessionToken) {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(DueTask {
            id,
            due_ms: self.now_ms.saturating_add(delay_ms),
            task,
            token,
        });
    }

    /// Remove the earliest task due at or before `until_ms` and move the
    /// clock to its due time. Ties fire in scheduling order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<DueTask> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due_ms <= until_ms)
            .min_by_key(|(_, task)| (task.due_ms, task.id))
            .map(|(index, _)| index)?;
        let task = self.pending.remove(index);
        self.now_ms = self.now_ms.max(task.due_ms);
        Some(task)
    }

    /// Move the clock forward without firing anything.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    /// Milliseconds until the next pending task, if any.
    #[must_use]
    pub fn next_due_in(&self) -> Option<u64> {
        self.pending
            .iter()
            .map(|task| task.due_ms.saturating_sub(self.now_ms))
            .min()
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn pending(&self) -> &[DueTask] {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_tasks_fire_in_time_then_schedule_order() {
        let mut scheduler = Scheduler::default();
        let token = SessionToken(1);
        scheduler.schedule(500, ScheduledTask::FinishRestart, token);
        scheduler.schedule(200, ScheduledTask::AutoAdvance(Step::B4), token);
        scheduler.schedule(200, ScheduledTask::FinishTransition(Journey::C), token);

        assert!(scheduler.pop_due(100).is_none());
        let first = scheduler.pop_due(1_000).unwrap();
        assert_eq!(first.task, ScheduledTask::AutoAdvance(Step::B4));
        assert_eq!(scheduler.now_ms(), 200);
        let second = scheduler.pop_due(1_000).unwrap();
        assert_eq!(second.task, ScheduledTask::FinishTransition(Journey::C));
        assert_eq!(scheduler.next_due_in(), Some(300));
        assert_eq!(
            scheduler.pop_due(1_000).unwrap().task,
            ScheduledTask::FinishRestart
        );
        assert!(scheduler.pop_due(1_000).is_none());
        scheduler.settle(1_000);
        assert_eq!(scheduler.now_ms(), 1_000);
    }

    #[test]
    fn delays_are_relative_to_the_current_clock() {
        let mut scheduler = Scheduler::default();
        scheduler.settle(1_000);
        scheduler.schedule(250, ScheduledTask::FinishRestart, SessionToken(0));
        assert_eq!(scheduler.pending()[0].due_ms, 1_250);
        scheduler.settle(10);
        assert_eq!(scheduler.now_ms(), 1_000);
    }

    #[test]
    fn cancel_all_drops_every_pending_task() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(10, ScheduledTask::FinishRestart, SessionToken(0));
        scheduler.schedule(20, ScheduledTask::FinishRestart, SessionToken(0));
        assert_eq!(scheduler.pending().len(), 2);
        scheduler.cancel_all();
        assert!(scheduler.pending().is_empty());
        assert_eq!(scheduler.next_due_in(), None);
    }

    #[test]
    fn tokens_advance() {
        assert_eq!(SessionToken(4).next(), SessionToken(5));
    }
}
