use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::error;

use crate::object::AttributeEvent;
use crate::object::Subscribers;
use crate::AccessFlags;
use crate::ContentMirror;
use crate::DeviceClient;
use crate::MibNode;
use crate::MibResolver;
use crate::ObjectValue;
use crate::Oid;
use crate::SnmpError;
use crate::ValueType;

/// One synchronized scalar: identifier, type tag, last confirmed value
/// and the subscribers mirroring it.
///
/// `data` only ever holds values accepted from a confirmed remote read or
/// a confirmed remote write; a failed write never mutates it.
pub struct Attribute {
    id: Oid,
    value_type: ValueType,
    mib: Option<Arc<MibNode>>,
    access: AccessFlags,
    data: ArcSwap<String>,
    subscribers: Subscribers,
}

impl Attribute {
    /// Schema resolution happens here, once; it is never re-queried.
    pub fn new(id: Oid, value_type: ValueType, resolver: &dyn MibResolver) -> Self {
        let mib = resolver.resolve(&id);
        let access = AccessFlags::from_access(mib.as_ref().map(|node| node.access));
        Attribute {
            id,
            value_type,
            mib,
            access,
            data: ArcSwap::from_pointee(String::new()),
            subscribers: Subscribers::default(),
        }
    }

    /// Attribute pre-loaded with a value observed during discovery.
    pub fn seeded(value: &ObjectValue, resolver: &dyn MibResolver) -> Self {
        let attribute = Attribute::new(value.id.clone(), value.value_type, resolver);
        attribute.data.store(Arc::new(value.data.clone()));
        attribute
    }

    pub fn id(&self) -> &Oid {
        &self.id
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn mib(&self) -> Option<&Arc<MibNode>> {
        self.mib.as_ref()
    }

    pub fn data(&self) -> String {
        self.data.load().as_ref().clone()
    }

    pub fn is_readable(&self) -> bool {
        self.access.readable()
    }

    pub fn is_writable(&self) -> bool {
        self.access.writable()
    }

    pub fn set_readable(&self, readable: bool) {
        self.access.set_readable(readable);
    }

    pub fn set_writable(&self, writable: bool) {
        self.access.set_writable(writable);
    }

    pub fn subscribe(&self, sink: Arc<ContentMirror>) {
        self.subscribers.add(sink);
    }

    pub fn notify_changed(&self, restore: bool) {
        let data = self.data.load();
        self.subscribers.notify(AttributeEvent::Changed {
            data: data.as_str(),
            restore,
        });
    }

    pub fn notify_updated(&self) {
        self.subscribers.notify(AttributeEvent::Updated);
    }

    /// remote -> local: issues GET. Fires `Updated` on every successful
    /// exchange and `Changed` only when the value differs. Never panics;
    /// failures are classified into access-flag adjustments.
    pub async fn refresh(&self, client: &DeviceClient) -> bool {
        match client.get(&self.id).await {
            Ok(response) => {
                self.notify_updated();
                self.absorb(&response);
                true
            }
            Err(response_error) => {
                self.classify_error(client.name(), &response_error);
                false
            }
        }
    }

    /// local -> remote: issues SET and stores the device's confirmed
    /// echo. Unchanged data is a no-op success. On failure the confirmed
    /// value stays untouched and subscribers are told to restore.
    pub async fn commit(&self, client: &DeviceClient, data: &str) -> bool {
        // Trailing newlines come from the editing side, not the value
        let prepared = data.strip_suffix('\n').unwrap_or(data);

        if self.data.load().as_str() == prepared {
            return true;
        }

        match client.set(&self.id, self.value_type, prepared).await {
            Ok(confirmed) => {
                self.absorb(&confirmed);
                true
            }
            Err(response_error) => {
                self.classify_error(client.name(), &response_error);
                self.notify_changed(true);
                false
            }
        }
    }

    /// Applies a value that is already device-confirmed (trap delivery,
    /// SET echo). Returns whether the stored data actually changed.
    pub fn absorb(&self, value: &ObjectValue) -> bool {
        if self.id != value.id {
            return false;
        }
        if self.data.load().as_str() == value.data {
            return false;
        }

        self.data.store(Arc::new(value.data.clone()));
        self.notify_changed(false);
        true
    }

    pub(crate) fn classify_error(&self, device: &str, response_error: &SnmpError) {
        error!(device, oid = %self.id, %response_error, "error in response for object");

        match response_error {
            SnmpError::NoAccess => {
                self.access.set_readable(false);
                self.access.set_writable(false);
            }
            SnmpError::NotWritable => {
                self.access.set_writable(false);
            }
            _ => {}
        }
    }
}
