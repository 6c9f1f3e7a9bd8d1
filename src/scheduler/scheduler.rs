use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio::time::Instant;
use tracing::debug;
use tracing::warn;

use crate::constants::DRAIN_POLL_MS;
use crate::scheduler::TaskEntry;
use crate::scheduler::TaskFn;
use crate::scheduler::TaskId;
use crate::scheduler::TaskKind;
use crate::scheduler::TaskStatus;
use crate::SchedulerError;

/// Concurrent recurring/one-shot task runner.
///
/// A dedicated scan loop wakes once per tick and starts every `Waiting`
/// task whose `last_run + interval` has elapsed. Task bodies execute on
/// the runtime through a semaphore-bounded pool; a task that is still
/// `Running` is skipped by the scan regardless of elapsed time, so no
/// task ever overlaps itself.
pub struct Scheduler {
    tasks: Arc<DashMap<TaskId, TaskEntry>>,
    next_id: AtomicU64,
    tick: Duration,
    pool: Arc<Semaphore>,
    running: Arc<AtomicBool>,
    scan_loop: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(tick: Duration, workers: usize) -> Self {
        Scheduler {
            tasks: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(1),
            tick,
            pool: Arc::new(Semaphore::new(workers)),
            running: Arc::new(AtomicBool::new(false)),
            scan_loop: Mutex::new(None),
        }
    }

    pub fn add_task<F>(&self, kind: TaskKind, interval: Duration, job: F) -> TaskId
    where
        F: Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.tasks.insert(
            id,
            TaskEntry {
                kind,
                interval,
                status: TaskStatus::Waiting,
                last_run: None,
                job: Arc::new(job),
            },
        );
        id
    }

    pub fn add_recurrent<F>(&self, interval: Duration, job: F) -> TaskId
    where
        F: Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        self.add_task(TaskKind::Recurrent, interval, job)
    }

    pub fn add_single<F>(&self, job: F) -> TaskId
    where
        F: Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        self.add_task(TaskKind::Single, Duration::ZERO, job)
    }

    /// Removes a task from the scan. An execution already in flight runs
    /// to completion.
    pub fn remove_task(&self, id: TaskId) -> bool {
        self.tasks.remove(&id).is_some()
    }

    pub fn task_status(&self, id: TaskId) -> Option<TaskStatus> {
        self.tasks.get(&id).map(|entry| entry.status)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// True when no task body is executing.
    pub fn is_idle(&self) -> bool {
        !self
            .tasks
            .iter()
            .any(|entry| entry.status == TaskStatus::Running)
    }

    /// Spawns the scan loop.
    pub fn start(&self) -> Result<(), SchedulerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyRunning);
        }

        let tasks = self.tasks.clone();
        let pool = self.pool.clone();
        let running = self.running.clone();
        let tick = self.tick;

        let handle = tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                Self::scan(&tasks, &pool);
                sleep(tick).await;
            }
            debug!("scheduler scan loop exited");
        });
        *self.scan_loop.lock() = Some(handle);

        Ok(())
    }

    /// Flips the run flag; the loop observes it on its next tick.
    /// In-flight task bodies are not cancelled.
    pub fn stop(&self) -> Result<(), SchedulerError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(SchedulerError::NotRunning);
        }
        Ok(())
    }

    /// Stops the loop and waits until no task is running. Task state must
    /// not be torn down before this returns.
    pub async fn shutdown(&self) {
        let _ = self.stop();

        let handle = self.scan_loop.lock().take();
        if let Some(handle) = handle {
            if let Err(join_error) = handle.await {
                warn!(%join_error, "scheduler scan loop did not exit cleanly");
            }
        }

        while !self.is_idle() {
            sleep(Duration::from_millis(DRAIN_POLL_MS)).await;
        }
    }

    fn scan(tasks: &Arc<DashMap<TaskId, TaskEntry>>, pool: &Arc<Semaphore>) {
        let now = Instant::now();
        let mut started: Vec<(TaskId, TaskFn, TaskKind)> = Vec::new();

        for mut entry in tasks.iter_mut() {
            if entry.status != TaskStatus::Waiting || !entry.is_due(now) {
                continue;
            }
            entry.status = TaskStatus::Running;
            started.push((*entry.key(), entry.job.clone(), entry.kind));
        }

        for (id, job, kind) in started {
            let tasks = tasks.clone();
            let pool = pool.clone();
            tokio::spawn(async move {
                let _permit = match pool.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };

                job().await;

                // The entry may have been removed while the body ran
                if let Some(mut entry) = tasks.get_mut(&id) {
                    entry.last_run = Some(Instant::now());
                    entry.status = match kind {
                        TaskKind::Single => TaskStatus::Done,
                        TaskKind::Recurrent => TaskStatus::Waiting,
                    };
                }
            });
        }
    }
}
