use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use parking_lot::RwLock;

use crate::DeviceConfig;
use crate::ObjectValue;
use crate::Oid;
use crate::ProbeStatus;
use crate::SessionFactory;
use crate::SnmpError;
use crate::SnmpSession;
use crate::ValueType;

/// In-memory session simulating one device's address space.
///
/// Backs the demo profile of the binary and the transport-faithful tests:
/// GET/GETNEXT serve a sorted map, SET echoes the written value back as
/// the confirmed one.
pub struct SimSession {
    store: Mutex<BTreeMap<Oid, (ValueType, String)>>,
    read_only: Vec<Oid>,
    status: RwLock<ProbeStatus>,
}

impl SimSession {
    pub fn new() -> Self {
        SimSession {
            store: Mutex::new(BTreeMap::new()),
            read_only: Vec::new(),
            status: RwLock::new(ProbeStatus::Online),
        }
    }

    /// Session pre-populated with a small host profile: system scalars
    /// plus a two-column interface table.
    pub fn with_demo_profile(hostname: &str) -> Self {
        let session = SimSession::new();
        let scalars: &[(&str, ValueType, String)] = &[
            (".1.3.6.1.2.1.1.4.0", ValueType::OctetStr, "admin@example.org".to_string()),
            (".1.3.6.1.2.1.1.5.0", ValueType::OctetStr, hostname.to_string()),
            (".1.3.6.1.2.1.1.6.0", ValueType::OctetStr, "server room".to_string()),
            (".1.3.6.1.2.1.25.1.1.0", ValueType::TimeTicks, "123456".to_string()),
        ];
        for (raw, value_type, data) in scalars {
            let id: Oid = raw.parse().expect("demo OID must parse");
            session.put(id, *value_type, data);
        }

        // ifIndex / ifDescr columns, three rows
        for row in 1..=3u32 {
            let index: Oid = format!(".1.3.6.1.2.1.2.2.1.1.{row}").parse().unwrap();
            let descr: Oid = format!(".1.3.6.1.2.1.2.2.1.2.{row}").parse().unwrap();
            session.put(index, ValueType::Integer, &row.to_string());
            session.put(descr, ValueType::OctetStr, &format!("eth{}", row - 1));
        }

        session
    }

    pub fn put(&self, id: Oid, value_type: ValueType, data: &str) {
        self.store.lock().insert(id, (value_type, data.to_string()));
    }

    pub fn remove(&self, id: &Oid) {
        self.store.lock().remove(id);
    }

    pub fn mark_read_only(mut self, id: Oid) -> Self {
        self.read_only.push(id);
        self
    }

    pub fn set_status(&self, status: ProbeStatus) {
        *self.status.write() = status;
    }
}

impl Default for SimSession {
    fn default() -> Self {
        SimSession::new()
    }
}

#[async_trait]
impl SnmpSession for SimSession {
    async fn get(&self, id: &Oid) -> Result<ObjectValue, SnmpError> {
        let store = self.store.lock();
        match store.get(id) {
            Some((value_type, data)) => Ok(ObjectValue::new(id.clone(), *value_type, data)),
            None => Err(SnmpError::NoSuchName),
        }
    }

    async fn get_next(&self, id: &Oid) -> Result<Option<ObjectValue>, SnmpError> {
        let store = self.store.lock();
        let next = store
            .range((Bound::Excluded(id.clone()), Bound::Unbounded))
            .next();
        Ok(next.map(|(next_id, (value_type, data))| {
            ObjectValue::new(next_id.clone(), *value_type, data)
        }))
    }

    async fn set(
        &self,
        id: &Oid,
        value_type: ValueType,
        data: &str,
    ) -> Result<ObjectValue, SnmpError> {
        if self.read_only.contains(id) {
            return Err(SnmpError::NotWritable);
        }

        let mut store = self.store.lock();
        if !store.contains_key(id) {
            return Err(SnmpError::InconsistentName);
        }
        store.insert(id.clone(), (value_type, data.to_string()));
        Ok(ObjectValue::new(id.clone(), value_type, data))
    }

    async fn probe(&self) -> ProbeStatus {
        *self.status.read()
    }
}

/// Factory handing every configured device its own demo-profile session.
/// A community mismatch yields a session that answers `AccessDenied`.
pub struct SimSessionFactory {
    community: String,
}

impl SimSessionFactory {
    pub fn new(community: &str) -> Self {
        SimSessionFactory {
            community: community.to_string(),
        }
    }
}

impl SessionFactory for SimSessionFactory {
    fn open(&self, config: &DeviceConfig) -> Result<Arc<dyn SnmpSession>, SnmpError> {
        let session = SimSession::with_demo_profile(&config.name);
        if config.auth.community != self.community {
            session.set_status(ProbeStatus::AccessDenied);
        }
        Ok(Arc::new(session))
    }
}
