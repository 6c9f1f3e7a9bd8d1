use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tokio::time::Instant;
use tracing::error;
use tracing::info;

use crate::constants::DRAIN_POLL_MS;
use crate::metrics;
use crate::namespace::build_device_namespace;
use crate::namespace::BuildContext;
use crate::Device;
use crate::DiscoveryTree;
use crate::ProbeStatus;
use crate::Result;
use crate::SnmpFs;
use crate::TimedQueue;

/// Brings up every configured device: opens sessions, probes
/// reachability, and for each reachable device builds its discovery tree
/// and namespace subtree.
///
/// Devices are pulled from a delay-ordered queue by a pool of workers, so
/// one offline device backing off never blocks the others. Offline
/// devices are requeued with exponentially growing delays; devices that
/// reject our credentials are abandoned.
pub async fn run_bringup(fs: Arc<SnmpFs>, shutdown: watch::Receiver<()>) -> Result<()> {
    let configs = fs.settings().resolved_devices()?;

    let queue: Arc<TimedQueue<Arc<Device>>> = Arc::new(TimedQueue::new());
    for config in configs {
        let name = config.name.clone();
        match fs.factory().open(&config) {
            Ok(session) => queue.push(Device::new(config, session)),
            Err(open_error) => {
                error!(device = %name, %open_error, "session could not be created");
            }
        }
    }

    let workers = fs.settings().polling.bringup_workers.max(1);
    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let fs = fs.clone();
        let queue = queue.clone();
        let shutdown = shutdown.clone();
        handles.push(tokio::spawn(async move {
            bringup_worker(fs, queue, shutdown).await;
        }));
    }
    for handle in handles {
        let _ = handle.await;
    }

    // Devices still queued were cut off by shutdown
    while queue.pop_any().is_some() {}

    Ok(())
}

async fn bringup_worker(
    fs: Arc<SnmpFs>,
    queue: Arc<TimedQueue<Arc<Device>>>,
    shutdown: watch::Receiver<()>,
) {
    let policy = fs.settings().polling.backoff;

    loop {
        if shutdown.has_changed().unwrap_or(true) {
            break;
        }

        while queue.waiting() {
            if shutdown.has_changed().unwrap_or(true) {
                return;
            }
            sleep(Duration::from_millis(DRAIN_POLL_MS)).await;
        }

        let Some((device, prev_delay)) = queue.pop_due() else {
            break;
        };

        match device.check_status().await {
            ProbeStatus::Online => {
                if let Err(init_error) = init_device(&fs, &device).await {
                    error!(device = device.name(), %init_error, "initialization failed");
                }
            }
            ProbeStatus::AccessDenied => {
                error!(device = device.name(), "inaccessible, check credentials");
            }
            ProbeStatus::Offline => {
                let delay = policy.next_delay(prev_delay);
                info!(
                    device = device.name(),
                    "waiting {}s for device to become online",
                    delay.as_secs()
                );
                queue.push_in(device, delay);
            }
        }
    }
}

/// One reachable device: enumerate the configured scope, materialize its
/// namespace subtree and hand it over to steady-state polling.
async fn init_device(fs: &Arc<SnmpFs>, device: &Arc<Device>) -> Result<()> {
    let started = Instant::now();

    let tree = DiscoveryTree::from_config(device.client(), device.config()).await?;

    let ctx = BuildContext {
        tree: &tree,
        device,
        scheduler: fs.scheduler(),
        resolver: fs.resolver(),
    };
    build_device_namespace(&ctx, fs.root()).await?;

    fs.register_device(device.clone());
    metrics::DEVICES_ONLINE.inc();
    info!(
        device = device.name(),
        "initialization finished after {:.3}s",
        started.elapsed().as_secs_f64()
    );
    Ok(())
}
