use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::info;
use tracing::warn;

use crate::AuthConfig;
use crate::Device;
use crate::ObjectValue;
use crate::SnmpVersion;

/// One unsolicited notification as decoded by the external transport:
/// origin address, the credential it carried and its variable bindings.
#[derive(Debug, Clone)]
pub struct TrapPdu {
    pub source: String,
    pub community: String,
    pub version: SnmpVersion,
    pub values: Vec<ObjectValue>,
}

/// Receives decoded traps and runs them through its handler chain:
/// authentication, device dispatch, logging. The receiver owns the chain
/// directly; there is no process-wide handler registry.
pub struct TrapReceiver {
    auth: AuthConfig,
    devices: Arc<Mutex<Vec<Arc<Device>>>>,
}

impl TrapReceiver {
    pub fn new(auth: AuthConfig, devices: Arc<Mutex<Vec<Arc<Device>>>>) -> Self {
        TrapReceiver { auth, devices }
    }

    /// Full chain for one trap. Returns whether the trap was accepted and
    /// dispatched to a device.
    pub fn handle(&self, trap: &TrapPdu) -> bool {
        if !self.authenticate(trap) {
            warn!(source = %trap.source, "trap failed authentication");
            return false;
        }

        let Some(device) = self.find_device(&trap.source) else {
            warn!(source = %trap.source, "no device found for trap");
            return false;
        };

        for value in &trap.values {
            info!(device = device.name(), oid = %value.id, data = %value.data, "trap");
        }

        device.process_trap(&trap.values);
        true
    }

    /// Drains the transport's feed until shutdown.
    pub async fn run(
        &self,
        mut feed: mpsc::Receiver<TrapPdu>,
        mut shutdown: watch::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                received = feed.recv() => match received {
                    Some(trap) => {
                        self.handle(&trap);
                    }
                    None => break,
                },
            }
        }
        info!("trap receiver stopped");
    }

    fn authenticate(&self, trap: &TrapPdu) -> bool {
        match trap.version {
            SnmpVersion::V1 | SnmpVersion::V2c => trap.community == self.auth.community,
            // v3 user security is handled by the transport; nothing
            // reaches this path yet
            SnmpVersion::V3 => false,
        }
    }

    /// The trap's source address has to appear in a configured peer
    /// address. DNS-named peers will not match; those traps are dropped
    /// with a warning.
    fn find_device(&self, source: &str) -> Option<Arc<Device>> {
        self.devices
            .lock()
            .iter()
            .find(|device| device.config().address.contains(source))
            .cloned()
    }
}
