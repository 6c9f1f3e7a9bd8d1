use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::time::sleep;
use tokio::time::Instant;

use crate::scheduler::Scheduler;
use crate::scheduler::TaskStatus;

fn scheduler() -> Scheduler {
    Scheduler::new(Duration::from_millis(100), 4)
}

/// Case 1: a recurrent task keeps firing, one interval apart.
#[tokio::test(start_paused = true)]
async fn test_recurrent_task_fires_repeatedly() {
    let sched = scheduler();
    let count = Arc::new(AtomicU32::new(0));

    let counter = count.clone();
    sched.add_recurrent(Duration::from_secs(1), move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        .boxed()
    });

    sched.start().expect("should start");
    sleep(Duration::from_millis(3_050)).await;
    sched.shutdown().await;

    let fired = count.load(Ordering::SeqCst);
    assert!((3..=5).contains(&fired), "fired {fired} times");
}

/// Case 2: a task that finished at t is never started again before
/// t + interval.
#[tokio::test(start_paused = true)]
async fn test_recurrent_task_spacing() {
    let sched = scheduler();
    let starts: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));

    let log = starts.clone();
    let interval = Duration::from_secs(1);
    sched.add_recurrent(interval, move || {
        let log = log.clone();
        async move {
            log.lock().push(Instant::now());
        }
        .boxed()
    });

    sched.start().expect("should start");
    sleep(Duration::from_secs(5)).await;
    sched.shutdown().await;

    let starts = starts.lock();
    assert!(starts.len() >= 3);
    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= interval);
    }
}

/// Case 3: a slow task is skipped by the scan while still running.
#[tokio::test(start_paused = true)]
async fn test_task_never_overlaps_itself() {
    let sched = scheduler();
    let active = Arc::new(AtomicU32::new(0));
    let max_active = Arc::new(AtomicU32::new(0));

    let active_in = active.clone();
    let max_in = max_active.clone();
    sched.add_recurrent(Duration::from_millis(100), move || {
        let active = active_in.clone();
        let max_active = max_in.clone();
        async move {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            max_active.fetch_max(now, Ordering::SeqCst);
            sleep(Duration::from_millis(500)).await;
            active.fetch_sub(1, Ordering::SeqCst);
        }
        .boxed()
    });

    sched.start().expect("should start");
    sleep(Duration::from_secs(3)).await;
    sched.shutdown().await;

    assert_eq!(max_active.load(Ordering::SeqCst), 1);
}

/// Case 4: single tasks run once and end up Done.
#[tokio::test(start_paused = true)]
async fn test_single_task_runs_once() {
    let sched = scheduler();
    let count = Arc::new(AtomicU32::new(0));

    let counter = count.clone();
    let id = sched.add_single(move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        .boxed()
    });

    sched.start().expect("should start");
    sleep(Duration::from_secs(2)).await;

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(sched.task_status(id), Some(TaskStatus::Done));

    assert!(sched.remove_task(id));
    assert!(sched.is_empty());
    sched.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_is_an_error() {
    let sched = scheduler();
    sched.start().expect("should start");
    assert!(sched.start().is_err());
    sched.shutdown().await;

    assert!(sched.stop().is_err());
}

/// Case 5: shutdown waits for in-flight task bodies.
#[tokio::test(start_paused = true)]
async fn test_shutdown_waits_until_idle() {
    let sched = scheduler();
    let done = Arc::new(AtomicU32::new(0));

    let flag = done.clone();
    sched.add_single(move || {
        let flag = flag.clone();
        async move {
            sleep(Duration::from_secs(1)).await;
            flag.store(1, Ordering::SeqCst);
        }
        .boxed()
    });

    sched.start().expect("should start");
    sleep(Duration::from_millis(150)).await;
    sched.shutdown().await;

    assert_eq!(done.load(Ordering::SeqCst), 1);
    assert!(sched.is_idle());
}
