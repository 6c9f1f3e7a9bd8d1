use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::Instant;

pub type TaskId = u64;

/// Body of a scheduled task; invoked once per run.
pub type TaskFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Runs once, then becomes `Done` and is eligible for removal
    Single,
    /// Returns to `Waiting` after every run
    Recurrent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Waiting,
    Running,
    Done,
}

pub(crate) struct TaskEntry {
    pub(crate) kind: TaskKind,
    pub(crate) interval: Duration,
    pub(crate) status: TaskStatus,
    /// Completion time of the previous run; `None` means never ran and
    /// the task is due immediately.
    pub(crate) last_run: Option<Instant>,
    pub(crate) job: TaskFn,
}

impl TaskEntry {
    pub(crate) fn is_due(&self, now: Instant) -> bool {
        match self.last_run {
            None => true,
            Some(finished) => finished + self.interval <= now,
        }
    }
}
