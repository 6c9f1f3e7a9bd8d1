use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::metrics;
use crate::utils::time::timestamp_secs;
use crate::DeviceClient;
use crate::DeviceConfig;
use crate::ObjectValue;
use crate::Oid;
use crate::ProbeStatus;
use crate::Scheduler;
use crate::SnmpSession;
use crate::SyncedObject;
use crate::TaskId;

struct PollBucket {
    task: TaskId,
    objects: BTreeMap<Oid, SyncedObject>,
}

/// One polled remote device: an immutable configuration snapshot, a gated
/// session client and the registry of synchronized objects grouped by
/// polling interval.
///
/// Each interval bucket is backed by one recurrent scheduler task; an
/// identifier lives in at most one bucket at a time.
pub struct Device {
    config: DeviceConfig,
    client: Arc<DeviceClient>,
    registry: Mutex<BTreeMap<u64, PollBucket>>,
}

impl Device {
    pub fn new(config: DeviceConfig, session: Arc<dyn SnmpSession>) -> Arc<Self> {
        let client = Arc::new(DeviceClient::new(&config.name, session));
        Arc::new(Device {
            config,
            client,
            registry: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<DeviceClient> {
        &self.client
    }

    /// Existing object for this exact (identifier, interval) pair, used
    /// to avoid duplicate registration when several configuration entries
    /// resolve to the same identifier.
    pub fn lookup(&self, id: &Oid, interval: u64) -> Option<SyncedObject> {
        let registry = self.registry.lock();
        registry
            .get(&interval)
            .and_then(|bucket| bucket.objects.get(id))
            .cloned()
    }

    /// Places the object in the bucket for `interval`, creating the
    /// bucket's recurrent polling task on first use. An identifier
    /// already registered under another interval is moved.
    pub fn register(
        self: &Arc<Self>,
        object: SyncedObject,
        interval: u64,
        scheduler: &Scheduler,
    ) {
        let id = object.id().clone();
        let mut registry = self.registry.lock();

        for (other_interval, bucket) in registry.iter_mut() {
            if *other_interval != interval && bucket.objects.remove(&id).is_some() {
                warn!(
                    device = self.name(), oid = %id, from = *other_interval, to = interval,
                    "object moved between polling intervals"
                );
            }
        }

        let bucket = registry.entry(interval).or_insert_with(|| {
            let device = Arc::clone(self);
            let task = scheduler.add_recurrent(Duration::from_secs(interval), move || {
                let device = device.clone();
                async move {
                    device.poll_interval(interval).await;
                }
                .boxed()
            });
            debug!(device = self.name(), interval, "polling task created");
            PollBucket {
                task,
                objects: BTreeMap::new(),
            }
        });
        bucket.objects.insert(id, object);
    }

    /// Removes the identifier from every bucket. Empty buckets keep their
    /// task; the scan simply finds nothing to refresh.
    pub fn deregister(&self, id: &Oid) {
        let mut registry = self.registry.lock();
        for bucket in registry.values_mut() {
            bucket.objects.remove(id);
        }
    }

    /// Refreshes every object registered under `interval`, in registry
    /// order and completely; a failure only affects its own object.
    pub async fn poll_interval(&self, interval: u64) {
        let objects: Vec<SyncedObject> = {
            let registry = self.registry.lock();
            match registry.get(&interval) {
                Some(bucket) => bucket.objects.values().cloned().collect(),
                None => return,
            }
        };

        for object in objects {
            object.refresh(&self.client).await;
        }

        metrics::NAMESPACE_LAST_UPDATE.set(timestamp_secs() as i64);
    }

    /// Refreshes all buckets once, regardless of their schedule.
    pub async fn poll_all(&self) {
        let intervals: Vec<u64> = self.registry.lock().keys().copied().collect();
        for interval in intervals {
            self.poll_interval(interval).await;
        }
    }

    /// Feeds trap-carried values to matching registered objects through
    /// the confirmed-value path, without re-contacting the device. Cell
    /// identifiers reach their table via ancestor matching.
    pub fn process_trap(&self, values: &[ObjectValue]) -> usize {
        let registry = self.registry.lock();
        let mut matched = 0;

        for value in values {
            let mut hit = false;
            for bucket in registry.values() {
                if let Some(object) = bucket.objects.get(&value.id) {
                    object.absorb(value);
                    hit = true;
                    continue;
                }
                for object in bucket.objects.values() {
                    if let SyncedObject::Table(_) = object {
                        if object.id().is_ancestor_of(&value.id) {
                            object.absorb(value);
                            hit = true;
                        }
                    }
                }
            }
            if hit {
                matched += 1;
            } else {
                debug!(device = self.name(), oid = %value.id, "trap value matches no registered object");
            }
        }

        matched
    }

    /// Bring-up reachability probe; not used during steady-state polling.
    pub async fn check_status(&self) -> ProbeStatus {
        self.client.check_status().await
    }

    pub fn interval_count(&self) -> usize {
        self.registry.lock().len()
    }

    pub fn object_count(&self) -> usize {
        self.registry
            .lock()
            .values()
            .map(|bucket| bucket.objects.len())
            .sum()
    }

    /// Deregisters the polling tasks and drops all objects. The caller
    /// must have waited for the scheduler to go idle first.
    pub fn shutdown(&self, scheduler: &Scheduler) {
        info!(device = self.name(), "tearing down device");
        let mut registry = self.registry.lock();
        for bucket in registry.values() {
            scheduler.remove_task(bucket.task);
        }
        registry.clear();
    }
}
