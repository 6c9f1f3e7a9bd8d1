use std::sync::Arc;

use autometrics::autometrics;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

use crate::metrics;
use crate::utils::time::timestamp_secs;
use crate::ObjectValue;
use crate::Oid;
use crate::ProbeStatus;
use crate::SnmpError;
use crate::SnmpSession;
use crate::ValueType;
use crate::API_SLO;

/// Request surface of one device session.
///
/// Every request is serialized through the per-device gate so a write and
/// a concurrent scheduled refresh can never interleave partial responses
/// on one session, and every request is counted and timed.
pub struct DeviceClient {
    name: String,
    session: Arc<dyn SnmpSession>,
    gate: Mutex<()>,
}

#[autometrics(objective = API_SLO)]
impl DeviceClient {
    pub async fn get(&self, id: &Oid) -> Result<ObjectValue, SnmpError> {
        let _gate = self.gate.lock().await;
        let started = Instant::now();
        let result = self.session.get(id).await;
        self.record("get", started, result.as_ref().err());
        result
    }

    pub async fn get_next(&self, id: &Oid) -> Result<Option<ObjectValue>, SnmpError> {
        let _gate = self.gate.lock().await;
        let started = Instant::now();
        let result = self.session.get_next(id).await;
        self.record("getnext", started, result.as_ref().err());
        result
    }

    pub async fn set(
        &self,
        id: &Oid,
        value_type: ValueType,
        data: &str,
    ) -> Result<ObjectValue, SnmpError> {
        let _gate = self.gate.lock().await;
        let started = Instant::now();
        let result = self.session.set(id, value_type, data).await;
        self.record("set", started, result.as_ref().err());
        result
    }
}

impl DeviceClient {
    pub fn new(name: &str, session: Arc<dyn SnmpSession>) -> Self {
        DeviceClient {
            name: name.to_string(),
            session,
            gate: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads every binding below `root`, stopping as soon as the device
    /// hands back an identifier outside that subtree. Transport failures
    /// end the walk; whatever was collected so far is returned.
    pub async fn walk_subtree(&self, root: &Oid) -> Vec<ObjectValue> {
        let mut values = Vec::new();
        let mut current = root.clone();

        loop {
            match self.get_next(&current).await {
                Ok(Some(value)) => {
                    if !root.is_ancestor_of(&value.id) {
                        break;
                    }
                    current = value.id.clone();
                    values.push(value);
                }
                Ok(None) => break,
                Err(error) => {
                    warn!(device = %self.name, oid = %current, %error, "walk aborted");
                    break;
                }
            }
        }

        values
    }

    /// Enumerates the device's entire address space.
    pub async fn walk(&self) -> Vec<ObjectValue> {
        self.walk_subtree(&Oid::root()).await
    }

    /// One lightweight reachability probe, used during bring-up only.
    pub async fn check_status(&self) -> ProbeStatus {
        let _gate = self.gate.lock().await;
        self.session.probe().await
    }

    fn record(&self, op: &str, started: Instant, error: Option<&SnmpError>) {
        metrics::SNMP_REQUESTS_TOTAL
            .with_label_values(&[&self.name, op])
            .inc();
        metrics::SNMP_REQUEST_DURATION
            .with_label_values(&[&self.name, op])
            .observe(started.elapsed().as_secs_f64() * 1_000.0);
        metrics::SNMP_LAST_REQUEST
            .with_label_values(&[&self.name])
            .set(timestamp_secs() as i64);

        match error {
            Some(SnmpError::Timeout) => {
                warn!(device = %self.name, op, "request failed (no response from device)");
                metrics::SNMP_REQUEST_TIMEOUTS
                    .with_label_values(&[&self.name, op])
                    .inc();
            }
            Some(error) if error.is_transport() => {
                warn!(device = %self.name, op, %error, "request failed");
                metrics::SNMP_REQUEST_ERRORS
                    .with_label_values(&[&self.name, op])
                    .inc();
            }
            _ => {}
        }
    }
}
