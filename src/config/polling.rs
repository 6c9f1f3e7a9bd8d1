use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::BRINGUP_MAX_DELAY_MS;
use crate::constants::BRINGUP_SEED_DELAY_MS;
use crate::constants::BRINGUP_WORKERS;
use crate::constants::SCHEDULER_TICK_MS;

/// Retry backoff for devices that are offline at bring-up: the delay
/// doubles from the seed up to the cap.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct BackoffPolicy {
    #[serde(default = "default_seed_delay_ms")]
    pub seed_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl BackoffPolicy {
    /// Delay to wait after a failed attempt that already waited `prev`.
    pub fn next_delay(&self, prev: Duration) -> Duration {
        let seed = Duration::from_millis(self.seed_delay_ms);
        let max = Duration::from_millis(self.max_delay_ms);

        if prev < seed {
            return seed;
        }
        (prev * 2).min(max)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy {
            seed_delay_ms: default_seed_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct PollingConfig {
    /// Scheduler scan-loop tick in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Bound on concurrently executing polling tasks
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Workers initializing devices in parallel at bring-up
    #[serde(default = "default_bringup_workers")]
    pub bringup_workers: usize,

    #[serde(default)]
    pub backoff: BackoffPolicy,
}

impl PollingConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        PollingConfig {
            tick_ms: default_tick_ms(),
            workers: default_workers(),
            bringup_workers: default_bringup_workers(),
            backoff: BackoffPolicy::default(),
        }
    }
}

fn default_tick_ms() -> u64 {
    SCHEDULER_TICK_MS
}

fn default_workers() -> usize {
    8
}

fn default_bringup_workers() -> usize {
    BRINGUP_WORKERS
}

fn default_seed_delay_ms() -> u64 {
    BRINGUP_SEED_DELAY_MS
}

fn default_max_delay_ms() -> u64 {
    BRINGUP_MAX_DELAY_MS
}
