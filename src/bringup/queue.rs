use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

struct Entry<T> {
    due: Instant,
    delay: Duration,
    value: T,
}

/// Delay-ordered queue. Values are pushed with a delay after which they
/// become eligible; until then they cannot be popped with
/// [`pop_due`](Self::pop_due). Each popped value carries the delay it
/// waited, so the consumer can grow it on the next requeue.
pub struct TimedQueue<T> {
    entries: Mutex<Vec<Entry<T>>>,
}

impl<T> TimedQueue<T> {
    pub fn new() -> Self {
        TimedQueue {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Pushes a value that is eligible immediately.
    pub fn push(&self, value: T) {
        self.push_in(value, Duration::ZERO);
    }

    /// Pushes a value that becomes eligible after `delay`.
    pub fn push_in(&self, value: T, delay: Duration) {
        let mut entries = self.entries.lock();
        entries.push(Entry {
            due: Instant::now() + delay,
            delay,
            value,
        });
        entries.sort_by_key(|entry| entry.due);
    }

    /// Pops the head if it is eligible. `None` means the queue is empty
    /// or the head is still waiting; [`waiting`](Self::waiting) tells the
    /// two apart.
    pub fn pop_due(&self) -> Option<(T, Duration)> {
        let mut entries = self.entries.lock();
        if entries.first()?.due > Instant::now() {
            return None;
        }
        let entry = entries.remove(0);
        Some((entry.value, entry.delay))
    }

    /// Pops the head regardless of its due time; used to drain the queue
    /// at shutdown.
    pub fn pop_any(&self) -> Option<(T, Duration)> {
        let mut entries = self.entries.lock();
        if entries.is_empty() {
            return None;
        }
        let entry = entries.remove(0);
        Some((entry.value, entry.delay))
    }

    /// True when the head exists but is not yet eligible.
    pub fn waiting(&self) -> bool {
        let entries = self.entries.lock();
        match entries.first() {
            Some(entry) => entry.due > Instant::now(),
            None => false,
        }
    }
}

impl<T> Default for TimedQueue<T> {
    fn default() -> Self {
        TimedQueue::new()
    }
}
