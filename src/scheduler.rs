use std::time::{Duration, Instant};

use crate::notice::NoticeId;

/// Work the page defers to a later tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    FocusFirstField,
    DismissNotification(NoticeId),
    ClearDrafts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Entry {
    id: TaskId,
    due: Instant,
    task: Task,
}

/// Fixed-delay timers owned by a page. Everything still pending is dropped
/// when the page is torn down.
#[derive(Debug, Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, after: Duration, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due: now + after,
            task,
        });
        id
    }

    /// Returns false if the task already ran or was cancelled
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Drain every task whose deadline has passed, earliest first.
    /// Tasks with the same deadline come out in scheduling order.
    pub fn due(&mut self, now: Instant) -> Vec<Task> {
        let (mut ready, pending): (Vec<Entry>, Vec<Entry>) =
            self.entries.drain(..).partition(|e| e.due <= now);
        self.entries = pending;

        ready.sort_by_key(|e| (e.due, e.id));
        ready.into_iter().map(|e| e.task).collect()
    }

    pub fn is_scheduled(&self, task: Task) -> bool {
        self.entries.iter().any(|e| e.task == task)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Cancel everything, returning how many tasks were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_due_before_deadline() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(now, Duration::from_millis(100), Task::FocusFirstField);

        assert!(scheduler.due(now + Duration::from_millis(99)).is_empty());
        assert_eq!(scheduler.due(now + Duration::from_millis(100)), vec![Task::FocusFirstField]);
        assert_eq!(scheduler.len(), 0);
    }

    #[test]
    fn test_due_tasks_come_out_in_deadline_order() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(now, Duration::from_secs(1), Task::ClearDrafts);
        scheduler.schedule(now, Duration::from_millis(100), Task::FocusFirstField);
        scheduler.schedule(now, Duration::from_secs(1), Task::DismissNotification(NoticeId(7)));

        let ran = scheduler.due(now + Duration::from_secs(2));
        assert_eq!(
            ran,
            vec![
                Task::FocusFirstField,
                Task::ClearDrafts,
                Task::DismissNotification(NoticeId(7)),
            ]
        );
    }

    #[test]
    fn test_cancel_removes_only_that_task() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new();
        let focus = scheduler.schedule(now, Duration::ZERO, Task::FocusFirstField);
        scheduler.schedule(now, Duration::ZERO, Task::ClearDrafts);

        assert!(scheduler.cancel(focus));
        assert!(!scheduler.cancel(focus));
        assert_eq!(scheduler.due(now), vec![Task::ClearDrafts]);
    }

    #[test]
    fn test_clear_reports_dropped_tasks() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(now, Duration::from_secs(1), Task::ClearDrafts);
        scheduler.schedule(now, Duration::from_secs(5), Task::DismissNotification(NoticeId(0)));

        assert_eq!(scheduler.clear(), 2);
        assert!(scheduler.due(now + Duration::from_secs(10)).is_empty());
    }
}
