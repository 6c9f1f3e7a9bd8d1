// -
// Scheduler

/// Scan-loop tick of the task scheduler
pub(crate) const SCHEDULER_TICK_MS: u64 = 100;

/// Poll interval used while waiting for in-flight tasks to drain
pub(crate) const DRAIN_POLL_MS: u64 = 100;

// -
// Device bring-up

/// First retry delay for an offline device
pub(crate) const BRINGUP_SEED_DELAY_MS: u64 = 1_000;

/// Retry delay cap for an offline device
pub(crate) const BRINGUP_MAX_DELAY_MS: u64 = 5 * 60 * 1_000;

/// Default number of workers initializing devices in parallel
pub(crate) const BRINGUP_WORKERS: usize = 8;

// -
// Table rendering

pub(crate) const TABLE_COLUMN_SEPARATOR: char = ',';
pub(crate) const TABLE_ROW_SEPARATOR: char = '\n';
