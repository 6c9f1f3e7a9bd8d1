use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::DeviceClient;
use crate::DeviceConfig;
use crate::EntryKind;
use crate::ObjectValue;
use crate::Oid;
use crate::Result;
use crate::TreeError;

/// Index of one node inside a [`DiscoveryTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug)]
struct DiscoveryNode {
    id: Oid,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    value: Option<ObjectValue>,
}

/// Cache of the identifiers (and last-seen values) a device revealed
/// during enumeration, arranged by identifier prefix.
///
/// Built once per device bring-up to amortize one discovery pass across
/// all namespace-construction decisions, then discarded. Nodes live in an
/// arena; a node at depth `d` corresponds to a length-`d` identifier
/// prefix.
#[derive(Debug)]
pub struct DiscoveryTree {
    nodes: Vec<DiscoveryNode>,
}

impl DiscoveryTree {
    pub fn new() -> Self {
        DiscoveryTree {
            nodes: vec![DiscoveryNode {
                id: Oid::root(),
                parent: None,
                children: Vec::new(),
                value: None,
            }],
        }
    }

    /// Walks only the subtrees the configuration refers to. Identifiers
    /// may be shared between entries, so scope roots are deduplicated
    /// before walking.
    pub async fn from_config(client: &DeviceClient, config: &DeviceConfig) -> Result<Self> {
        let mut roots: BTreeSet<Oid> = BTreeSet::new();
        for entry in &config.objects {
            let id = entry.parsed_oid()?;
            match entry.kind {
                EntryKind::Scalar => {
                    roots.insert(id.parent());
                }
                EntryKind::Table | EntryKind::Subtree => {
                    roots.insert(id);
                }
                // Placeholders are expanded before devices are built
                EntryKind::Reuse => {}
            }
        }

        let mut tree = DiscoveryTree::new();
        for root in roots {
            for value in client.walk_subtree(&root).await {
                tree.insert(value)?;
            }
        }

        Ok(tree)
    }

    /// Walks the device's whole address space.
    pub async fn from_device(client: &DeviceClient) -> Result<Self> {
        let mut tree = DiscoveryTree::new();
        for value in client.walk().await {
            tree.insert(value)?;
        }
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Total number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Inserts a value, creating any missing ancestor nodes. Inserting
    /// the same identifier twice keeps one node with the latest value.
    pub fn insert(&mut self, value: ObjectValue) -> std::result::Result<NodeId, TreeError> {
        self.insert_below(self.root(), value)
    }

    /// Inserts below `start`, whose identifier must be an ancestor of the
    /// value's.
    pub fn insert_below(
        &mut self,
        start: NodeId,
        value: ObjectValue,
    ) -> std::result::Result<NodeId, TreeError> {
        let depth = self.node(start).id.len();
        if value.id.len() < depth {
            return Err(TreeError::OutOfOrderInsert {
                depth,
                len: value.id.len(),
            });
        }

        let mut current = start;
        for level in depth..value.id.len() {
            let component = value.id.get(level).expect("level is below id length");
            current = match self.child_by_component(current, component) {
                Some(child) => child,
                None => self.add_child(current, component),
            };
        }

        self.nodes[current.0].value = Some(value);
        Ok(current)
    }

    /// Exact-node lookup from the root.
    pub fn get(&self, id: &Oid) -> Option<NodeId> {
        let mut current = self.root();
        for level in 0..id.len() {
            let component = id.get(level).expect("level is below id length");
            current = self.child_by_component(current, component)?;
        }
        Some(current)
    }

    pub fn contains(&self, id: &Oid) -> bool {
        self.get(id).is_some()
    }

    /// Finds `target` starting from any previously visited node: walks up
    /// until an ancestor of `target` is reached, then down to the exact
    /// node. O(depth) when `start` is near the target.
    pub fn find_from(&self, start: NodeId, target: &Oid) -> Option<NodeId> {
        let mut current = start;
        loop {
            let node = self.node(current);
            if node.id == *target {
                return Some(current);
            }

            if !node.id.is_ancestor_of(target) {
                current = node.parent?;
                continue;
            }

            let component = target.get(node.id.len())?;
            current = self.child_by_component(current, component)?;
        }
    }

    pub fn oid(&self, node: NodeId) -> &Oid {
        &self.node(node).id
    }

    pub fn value(&self, node: NodeId) -> Option<&ObjectValue> {
        self.node(node).value.as_ref()
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    pub fn child_oids(&self, node: NodeId) -> Vec<Oid> {
        self.node(node)
            .children
            .iter()
            .map(|child| self.node(*child).id.clone())
            .collect()
    }

    pub fn child_by_component(&self, node: NodeId, component: u32) -> Option<NodeId> {
        let depth = self.node(node).id.len();
        self.node(node)
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).id.get(depth) == Some(component))
    }

    /// Indented dump of the whole tree for diagnostics.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(self.root(), &mut out);
        out
    }

    fn render_node(&self, node: NodeId, out: &mut String) {
        let entry = self.node(node);
        for _ in 0..entry.id.len() {
            out.push('-');
        }
        if entry.id.is_empty() {
            out.push_str("ROOT");
        } else {
            let _ = write!(out, "{}", entry.id);
        }
        if let Some(value) = &entry.value {
            let _ = write!(out, " ({}) {}", value.value_type.as_char(), value.data);
        }
        out.push('\n');

        for child in entry.children.clone() {
            self.render_node(child, out);
        }
    }

    fn node(&self, id: NodeId) -> &DiscoveryNode {
        &self.nodes[id.0]
    }

    fn add_child(&mut self, parent: NodeId, component: u32) -> NodeId {
        let id = self.node(parent).id.child(component);
        let child = NodeId(self.nodes.len());
        self.nodes.push(DiscoveryNode {
            id,
            parent: Some(parent),
            children: Vec::new(),
            value: None,
        });
        self.nodes[parent.0].children.push(child);
        child
    }
}

impl Default for DiscoveryTree {
    fn default() -> Self {
        DiscoveryTree::new()
    }
}
