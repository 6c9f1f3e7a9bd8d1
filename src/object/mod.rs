mod attribute;
mod table;

pub use attribute::*;
pub use table::*;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::ContentMirror;
use crate::DeviceClient;
use crate::ObjectValue;
use crate::Oid;

#[cfg(test)]
mod attribute_test;

/// The two ways synchronized state is announced to its subscribers.
#[derive(Debug, Clone, Copy)]
pub enum AttributeEvent<'a> {
    /// The confirmed value changed; on `restore` the subscriber reverts a
    /// speculative local edit without touching its change timestamp.
    Changed { data: &'a str, restore: bool },
    /// A remote exchange completed; the value did not necessarily change.
    Updated,
}

/// Explicit subscription list: events fan out to content mirrors, no
/// dynamic dispatch involved.
#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    sinks: Mutex<Vec<Arc<ContentMirror>>>,
}

impl Subscribers {
    pub(crate) fn add(&self, sink: Arc<ContentMirror>) {
        self.sinks.lock().push(sink);
    }

    pub(crate) fn notify(&self, event: AttributeEvent<'_>) {
        let sinks = self.sinks.lock();
        for sink in sinks.iter() {
            match event {
                AttributeEvent::Changed { data, restore } => sink.apply_changed(data, restore),
                AttributeEvent::Updated => sink.apply_updated(),
            }
        }
    }
}

/// A scalar attribute or a table, as stored in the device registry and
/// bound to namespace nodes.
#[derive(Clone)]
pub enum SyncedObject {
    Scalar(Arc<Attribute>),
    Table(Arc<Table>),
}

impl SyncedObject {
    pub fn id(&self) -> &Oid {
        match self {
            SyncedObject::Scalar(attribute) => attribute.id(),
            SyncedObject::Table(table) => table.id(),
        }
    }

    /// Current confirmed content in its file representation.
    pub fn data(&self) -> String {
        match self {
            SyncedObject::Scalar(attribute) => attribute.data(),
            SyncedObject::Table(table) => table.render(),
        }
    }

    pub fn is_readable(&self) -> bool {
        match self {
            SyncedObject::Scalar(attribute) => attribute.is_readable(),
            SyncedObject::Table(table) => table.is_readable(),
        }
    }

    pub fn is_writable(&self) -> bool {
        match self {
            SyncedObject::Scalar(attribute) => attribute.is_writable(),
            SyncedObject::Table(table) => table.is_writable(),
        }
    }

    /// remote -> local transfer via GET
    pub async fn refresh(&self, client: &DeviceClient) -> bool {
        match self {
            SyncedObject::Scalar(attribute) => attribute.refresh(client).await,
            SyncedObject::Table(table) => table.refresh(client).await,
        }
    }

    /// local -> remote transfer via SET
    pub async fn commit(&self, client: &DeviceClient, text: &str) -> bool {
        match self {
            SyncedObject::Scalar(attribute) => attribute.commit(client, text).await,
            SyncedObject::Table(table) => table.commit(client, text).await,
        }
    }

    /// Applies an already-confirmed value without contacting the device.
    pub fn absorb(&self, value: &ObjectValue) -> bool {
        match self {
            SyncedObject::Scalar(attribute) => attribute.absorb(value),
            SyncedObject::Table(table) => table.absorb(value),
        }
    }

    pub fn subscribe(&self, sink: Arc<ContentMirror>) {
        match self {
            SyncedObject::Scalar(attribute) => attribute.subscribe(sink),
            SyncedObject::Table(table) => table.subscribe(sink),
        }
    }

    pub fn notify_changed(&self, restore: bool) {
        match self {
            SyncedObject::Scalar(attribute) => attribute.notify_changed(restore),
            SyncedObject::Table(table) => table.notify_changed(restore),
        }
    }

    pub fn notify_updated(&self) {
        match self {
            SyncedObject::Scalar(attribute) => attribute.notify_updated(),
            SyncedObject::Table(table) => table.notify_updated(),
        }
    }
}
