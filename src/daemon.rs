use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::metrics;
use crate::Device;
use crate::MibResolver;
use crate::Node;
use crate::Result;
use crate::Scheduler;
use crate::SessionFactory;
use crate::Settings;
use crate::TrapReceiver;

/// The assembled filesystem daemon: configuration, the namespace root the
/// filesystem adapter serves, the scheduler driving all polling and the
/// devices brought up so far.
///
/// The whole model lives in memory and is rebuilt from configuration plus
/// live device enumeration at every process start.
pub struct SnmpFs {
    settings: Settings,
    root: Arc<Node>,
    scheduler: Scheduler,
    devices: Arc<Mutex<Vec<Arc<Device>>>>,
    resolver: Arc<dyn MibResolver>,
    factory: Arc<dyn SessionFactory>,
}

impl SnmpFs {
    pub fn new(
        settings: Settings,
        factory: Arc<dyn SessionFactory>,
        resolver: Arc<dyn MibResolver>,
    ) -> Arc<Self> {
        let scheduler = Scheduler::new(settings.polling.tick(), settings.polling.workers);
        Arc::new(SnmpFs {
            settings,
            root: Node::directory("/"),
            scheduler,
            devices: Arc::new(Mutex::new(Vec::new())),
            resolver,
            factory,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn resolver(&self) -> &Arc<dyn MibResolver> {
        &self.resolver
    }

    pub fn factory(&self) -> &Arc<dyn SessionFactory> {
        &self.factory
    }

    /// Snapshot of the devices that finished bring-up.
    pub fn devices(&self) -> Vec<Arc<Device>> {
        self.devices.lock().clone()
    }

    pub(crate) fn register_device(&self, device: Arc<Device>) {
        self.devices.lock().push(device);
    }

    /// Trap receiver sharing this daemon's device list, so devices
    /// appearing after bring-up are dispatched to as well.
    pub fn trap_receiver(&self) -> TrapReceiver {
        TrapReceiver::new(self.settings.trap.auth.clone(), self.devices.clone())
    }

    /// Starts the polling scheduler.
    pub fn start(&self) -> Result<()> {
        self.scheduler.start()?;
        info!("scheduler started");
        Ok(())
    }

    /// Orderly teardown: stop scheduling, wait until no task body is
    /// executing, then drop device registrations and sessions. Task state
    /// must not be freed under a running task.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;

        let devices: Vec<Arc<Device>> = {
            let mut devices = self.devices.lock();
            std::mem::take(&mut *devices)
        };
        for device in devices {
            device.shutdown(&self.scheduler);
        }

        metrics::DEVICES_ONLINE.set(0);
        info!("daemon stopped");
    }
}
