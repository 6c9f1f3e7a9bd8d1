use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use parking_lot::RwLock;

/// Byte content and timestamps of one virtual file, shared between the
/// filesystem adapter (reads, speculative writes) and the synchronized
/// object that mirrors its confirmed value into it.
///
/// All mutation goes through this one synchronized entry point so a
/// refresh landing mid-read never exposes a torn buffer.
#[derive(Debug)]
pub struct ContentMirror {
    state: RwLock<MirrorState>,
}

#[derive(Debug)]
struct MirrorState {
    data: Vec<u8>,
    modified: bool,
    accessed: SystemTime,
    changed: SystemTime,
    updated: SystemTime,
}

impl ContentMirror {
    pub fn new() -> Self {
        ContentMirror {
            state: RwLock::new(MirrorState {
                data: Vec::new(),
                modified: false,
                accessed: UNIX_EPOCH,
                changed: UNIX_EPOCH,
                updated: UNIX_EPOCH,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.state.read().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().data.is_empty()
    }

    pub fn is_modified(&self) -> bool {
        self.state.read().modified
    }

    pub fn snapshot(&self) -> Vec<u8> {
        self.state.read().data.clone()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.state.read().data).into_owned()
    }

    pub fn read(&self, offset: usize, size: usize) -> Vec<u8> {
        let mut state = self.state.write();
        state.accessed = SystemTime::now();

        if offset >= state.data.len() {
            return Vec::new();
        }
        let end = state.data.len().min(offset + size);
        state.data[offset..end].to_vec()
    }

    /// Speculative edit by the filesystem adapter; confirmed content only
    /// lands through [`apply_changed`](Self::apply_changed).
    pub fn write(&self, offset: usize, buf: &[u8]) -> usize {
        let mut state = self.state.write();
        if offset + buf.len() > state.data.len() {
            state.data.resize(offset + buf.len(), 0);
        }
        state.data[offset..offset + buf.len()].copy_from_slice(buf);
        state.modified = true;
        buf.len()
    }

    pub fn truncate(&self, size: usize) {
        let mut state = self.state.write();
        if state.data.len() == size {
            return;
        }
        state.data.resize(size, 0);
        state.modified = true;
    }

    pub fn clear_modified(&self) {
        self.state.write().modified = false;
    }

    /// Replaces the content with device-confirmed data. A restore keeps
    /// the change timestamp so a rejected write does not look like new
    /// data.
    pub fn apply_changed(&self, data: &str, restore: bool) {
        let mut state = self.state.write();
        state.data = data.as_bytes().to_vec();
        state.modified = false;
        if !restore {
            state.changed = SystemTime::now();
        }
    }

    pub fn apply_updated(&self) {
        self.state.write().updated = SystemTime::now();
    }

    pub fn time_accessed(&self) -> SystemTime {
        self.state.read().accessed
    }

    pub fn time_changed(&self) -> SystemTime {
        self.state.read().changed
    }

    pub fn time_updated(&self) -> SystemTime {
        self.state.read().updated
    }
}

impl Default for ContentMirror {
    fn default() -> Self {
        ContentMirror::new()
    }
}
