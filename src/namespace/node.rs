use std::fmt::Write as _;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;
use tracing::warn;

use crate::ContentMirror;
use crate::DeviceClient;
use crate::NamespaceError;
use crate::SyncedObject;

/// Read/write capability of a node as exposed to the filesystem adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMode {
    pub directory: bool,
    pub readable: bool,
    pub writable: bool,
}

enum NodeKind {
    Directory {
        children: RwLock<Vec<Arc<Node>>>,
    },
    File {
        object: SyncedObject,
        client: Arc<DeviceClient>,
        mirror: Arc<ContentMirror>,
    },
}

/// One entry of the exposed virtual hierarchy: either a grouping
/// directory or a file bound to a synchronized object.
///
/// Built once at device bring-up and mutated in place afterwards as bound
/// objects change; content reads and observer writes may run
/// concurrently.
pub struct Node {
    name: String,
    kind: NodeKind,
}

impl Node {
    pub fn directory(name: &str) -> Arc<Node> {
        Arc::new(Node {
            name: name.to_string(),
            kind: NodeKind::Directory {
                children: RwLock::new(Vec::new()),
            },
        })
    }

    /// Leaf bound to an object; the node subscribes its content mirror so
    /// confirmed changes land in the file content.
    pub fn file(name: &str, object: SyncedObject, client: Arc<DeviceClient>) -> Arc<Node> {
        let mirror = Arc::new(ContentMirror::new());
        object.subscribe(mirror.clone());
        Arc::new(Node {
            name: name.to_string(),
            kind: NodeKind::File {
                object,
                client,
                mirror,
            },
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    pub fn add_child(&self, child: Arc<Node>) -> Result<(), NamespaceError> {
        match &self.kind {
            NodeKind::Directory { children } => {
                children.write().push(child);
                Ok(())
            }
            NodeKind::File { .. } => Err(NamespaceError::NotADirectory(self.name.clone())),
        }
    }

    pub fn child_by_name(&self, name: &str) -> Option<Arc<Node>> {
        match &self.kind {
            NodeKind::Directory { children } => children
                .read()
                .iter()
                .find(|child| child.name == name)
                .cloned(),
            NodeKind::File { .. } => None,
        }
    }

    pub fn children(&self) -> Vec<Arc<Node>> {
        match &self.kind {
            NodeKind::Directory { children } => children.read().clone(),
            NodeKind::File { .. } => Vec::new(),
        }
    }

    pub fn child_count(&self) -> usize {
        match &self.kind {
            NodeKind::Directory { children } => children.read().len(),
            NodeKind::File { .. } => 0,
        }
    }

    pub fn mode(&self) -> FileMode {
        match &self.kind {
            NodeKind::Directory { .. } => FileMode {
                directory: true,
                readable: true,
                writable: true,
            },
            NodeKind::File { object, .. } => FileMode {
                directory: false,
                readable: object.is_readable(),
                writable: object.is_writable(),
            },
        }
    }

    pub fn size(&self) -> usize {
        match &self.kind {
            NodeKind::Directory { .. } => 0,
            NodeKind::File { mirror, .. } => mirror.len(),
        }
    }

    pub fn time_accessed(&self) -> SystemTime {
        match &self.kind {
            NodeKind::Directory { .. } => SystemTime::now(),
            NodeKind::File { mirror, .. } => mirror.time_accessed(),
        }
    }

    pub fn time_changed(&self) -> SystemTime {
        match &self.kind {
            NodeKind::Directory { .. } => SystemTime::now(),
            NodeKind::File { mirror, .. } => mirror.time_changed(),
        }
    }

    pub fn time_updated(&self) -> SystemTime {
        match &self.kind {
            NodeKind::Directory { .. } => SystemTime::now(),
            NodeKind::File { mirror, .. } => mirror.time_updated(),
        }
    }

    // -
    // File content calls, used by the filesystem adapter

    pub fn open(&self, truncate: bool) -> Result<(), NamespaceError> {
        let mirror = self.mirror()?;
        if truncate {
            mirror.truncate(0);
        }
        Ok(())
    }

    pub fn read(&self, offset: usize, size: usize) -> Result<Vec<u8>, NamespaceError> {
        Ok(self.mirror()?.read(offset, size))
    }

    pub fn write(&self, offset: usize, buf: &[u8]) -> Result<usize, NamespaceError> {
        Ok(self.mirror()?.write(offset, buf))
    }

    pub fn truncate(&self, size: usize) -> Result<(), NamespaceError> {
        self.mirror()?.truncate(size);
        Ok(())
    }

    /// Commits speculatively edited content to the device. Unmodified
    /// content is a no-op; a rejected commit surfaces as an error after
    /// the mirror has already been restored to the confirmed value.
    pub async fn flush(&self) -> Result<(), NamespaceError> {
        let NodeKind::File {
            object,
            client,
            mirror,
        } = &self.kind
        else {
            return Err(NamespaceError::NotAFile(self.name.clone()));
        };

        if !mirror.is_modified() {
            return Ok(());
        }

        let text = mirror.text();
        if object.commit(client, &text).await {
            mirror.clear_modified();
            Ok(())
        } else {
            Err(NamespaceError::CommitFailed(object.id().to_string()))
        }
    }

    /// Indented dump of the subtree for diagnostics.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        self.render_tree_rec(&mut out, 0);
        out
    }

    fn render_tree_rec(&self, out: &mut String, depth: usize) {
        for _ in 1..depth {
            out.push_str("    ");
        }
        if depth > 0 {
            out.push_str("|-- ");
        }
        let _ = writeln!(out, "{}", self.name);

        for child in self.children() {
            child.render_tree_rec(out, depth + 1);
        }
    }

    fn mirror(&self) -> Result<&Arc<ContentMirror>, NamespaceError> {
        match &self.kind {
            NodeKind::File { mirror, .. } => Ok(mirror),
            NodeKind::Directory { .. } => Err(NamespaceError::NotAFile(self.name.clone())),
        }
    }
}

/// Walks the hierarchy for the node at `path` (`/` separated, leading
/// slash optional).
pub fn find_by_path(root: &Arc<Node>, path: &str) -> Option<Arc<Node>> {
    let mut current = root.clone();
    for part in path.split('/').filter(|part| !part.is_empty()) {
        current = current.child_by_name(part)?;
    }
    Some(current)
}

/// Inserts `node` at `path`, creating intermediate directories. The last
/// path component is expected to match the node's name; the path `/`
/// attaches directly below the root.
pub fn insert_by_path(
    root: &Arc<Node>,
    path: &str,
    node: Arc<Node>,
) -> Result<(), NamespaceError> {
    let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();

    let mut current = root.clone();
    for part in parts.iter().take(parts.len().saturating_sub(1)) {
        current = match current.child_by_name(part) {
            Some(existing) => existing,
            None => {
                let dir = Node::directory(part);
                current.add_child(dir.clone())?;
                dir
            }
        };
    }

    if let Some(last) = parts.last() {
        if *last != node.name() {
            warn!(path, node = node.name(), "path tail does not match node name");
        }
    }
    current.add_child(node)
}
