use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::DeviceConfig;
use crate::ObjectValue;
use crate::Oid;
use crate::SnmpError;
use crate::ValueType;

/// Result of the lightweight reachability probe issued at bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// Device answered
    Online,
    /// Device answered but rejected our credentials
    AccessDenied,
    /// No usable answer
    Offline,
}

/// Wire-level request primitives against one remote device.
///
/// Implementations own protocol encoding, security parameters and
/// transport framing; the core only sees string-rendered values. All
/// calls are blocking from the device's perspective (one outstanding
/// request per session).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SnmpSession: Send + Sync {
    /// Reads the value bound to `id`.
    async fn get(&self, id: &Oid) -> Result<ObjectValue, SnmpError>;

    /// Reads the lexicographically next binding after `id`; `None` marks
    /// the end of the device's view.
    async fn get_next(&self, id: &Oid) -> Result<Option<ObjectValue>, SnmpError>;

    /// Writes `data` to `id` and returns the value the device confirmed,
    /// which may differ from what was sent.
    async fn set(
        &self,
        id: &Oid,
        value_type: ValueType,
        data: &str,
    ) -> Result<ObjectValue, SnmpError>;

    /// Issues one cheap request to classify reachability.
    async fn probe(&self) -> ProbeStatus;
}

/// Opens sessions for configured devices. The wire transport lives behind
/// this seam; the daemon only decides *when* to connect.
#[cfg_attr(test, automock)]
pub trait SessionFactory: Send + Sync {
    fn open(&self, config: &DeviceConfig) -> Result<Arc<dyn SnmpSession>, SnmpError>;
}
