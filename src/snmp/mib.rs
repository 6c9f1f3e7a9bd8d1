use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use crate::Oid;

/// Access category a schema assigns to an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MibAccess {
    ReadOnly,
    ReadWrite,
    WriteOnly,
    NotAccessible,
    Unknown,
}

/// One resolved schema node: label, position below the parent, access
/// category and child nodes (a table node carries its entry node, the
/// entry node carries the columns).
#[derive(Debug, Clone)]
pub struct MibNode {
    pub label: String,
    pub sub_id: u32,
    pub access: MibAccess,
    pub children: Vec<Arc<MibNode>>,
}

impl MibNode {
    pub fn child(&self, sub_id: u32) -> Option<&Arc<MibNode>> {
        self.children.iter().find(|child| child.sub_id == sub_id)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Conventionally, conceptual tables are labelled `...Table`.
    pub fn is_table(&self) -> bool {
        self.label.to_lowercase().ends_with("table")
    }
}

/// Schema metadata lookup, supplied externally (e.g. from parsed MIB
/// files). Resolution happens once per object at construction time and is
/// never re-queried.
#[cfg_attr(test, automock)]
pub trait MibResolver: Send + Sync {
    fn resolve(&self, id: &Oid) -> Option<Arc<MibNode>>;
}

/// Resolver used when no schema files are loaded.
#[derive(Debug, Default)]
pub struct EmptyMib;

impl MibResolver for EmptyMib {
    fn resolve(&self, _id: &Oid) -> Option<Arc<MibNode>> {
        None
    }
}

/// In-memory schema tree built programmatically.
#[derive(Debug, Default)]
pub struct MibTree {
    nodes: BTreeMap<Oid, Arc<MibNode>>,
}

impl MibTree {
    pub fn new() -> Self {
        MibTree::default()
    }

    /// Registers a node at `id`. Children have to be inserted bottom-up so
    /// parents can reference them; `insert` links nothing automatically.
    pub fn insert(&mut self, id: Oid, node: MibNode) {
        self.nodes.insert(id, Arc::new(node));
    }

    /// Convenience for a node without children.
    pub fn insert_leaf(&mut self, id: Oid, label: &str, access: MibAccess) {
        let sub_id = id.back().unwrap_or(0);
        self.insert(
            id,
            MibNode {
                label: label.to_string(),
                sub_id,
                access,
                children: Vec::new(),
            },
        );
    }
}

impl MibResolver for MibTree {
    fn resolve(&self, id: &Oid) -> Option<Arc<MibNode>> {
        if let Some(node) = self.nodes.get(id) {
            return Some(node.clone());
        }

        // Scalar instances are addressed with a trailing .0 while the
        // schema names the object itself.
        if id.back() == Some(0) {
            if let Some(node) = self.nodes.get(&id.parent()) {
                return Some(node.clone());
            }
        }

        None
    }
}

/// Readable/writable capability pair derived from a schema access
/// category, adjusted at runtime when the device reports access errors.
#[derive(Debug)]
pub struct AccessFlags {
    readable: AtomicBool,
    writable: AtomicBool,
}

impl AccessFlags {
    /// Absent or unknown schema information falls back to fully
    /// accessible; the flags self-correct on the first refused request.
    pub fn from_access(access: Option<MibAccess>) -> Self {
        let (readable, writable) = match access {
            Some(MibAccess::ReadOnly) => (true, false),
            Some(MibAccess::ReadWrite) => (true, true),
            Some(MibAccess::WriteOnly) => (false, true),
            Some(MibAccess::NotAccessible) => (false, false),
            Some(MibAccess::Unknown) | None => (true, true),
        };
        AccessFlags {
            readable: AtomicBool::new(readable),
            writable: AtomicBool::new(writable),
        }
    }

    pub fn readable(&self) -> bool {
        self.readable.load(Ordering::Relaxed)
    }

    pub fn writable(&self) -> bool {
        self.writable.load(Ordering::Relaxed)
    }

    pub fn set_readable(&self, readable: bool) {
        self.readable.store(readable, Ordering::Relaxed);
    }

    pub fn set_writable(&self, writable: bool) {
        self.writable.store(writable, Ordering::Relaxed);
    }
}

impl Default for AccessFlags {
    fn default() -> Self {
        AccessFlags::from_access(None)
    }
}
