//! Durable destination mappings: `(ie_pid, entity_pid) -> canonical path`.
//!
//! Mappings are write-once per key: once a destination exists, resolution is
//! skipped entirely on later calls. The file-backed store keeps one JSON
//! document per intellectual entity, mirroring the per-IE destination files
//! the deposit workflow uses. The resolver treats read-then-write as a
//! critical section it does not guard itself; whichever store implementation
//! is injected carries that responsibility.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{StoreError, StoreResult};

/// Persistent key/value collaborator for resolved destinations.
pub trait DestMapStore {
    /// Mapping for `(ie_pid, entity_pid)`, if one was ever written.
    fn read(&self, ie_pid: &str, entity_pid: &str) -> StoreResult<Option<PathBuf>>;

    /// Record a freshly resolved destination. Keys are write-once; callers
    /// only write after `read` returned `None`.
    fn write(&self, ie_pid: &str, entity_pid: &str, dest: &Path) -> StoreResult<()>;
}

/// On-disk JSON document holding one intellectual entity's mappings.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DestMapFile {
    entries: BTreeMap<String, PathBuf>,
}

/// File-backed store: `<dir>/<ie_pid>.json`, one document per IE.
///
/// `write` is a lock-free read-modify-write of the per-IE document; this
/// store assumes the host serializes placement calls within one IE, as the
/// deposit workflow does. Hosts without that guarantee need a store with its
/// own locking.
pub struct FileDestMapStore {
    dir: PathBuf,
}

impl FileDestMapStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileDestMapStore { dir: dir.into() }
    }

    /// Default destinations directory: `~/.local/state/rips/destinations`.
    pub fn default_dir() -> anyhow::Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("rips")?;
        Ok(xdg_dirs.get_state_home().join("destinations"))
    }

    fn ie_file(&self, ie_pid: &str) -> PathBuf {
        self.dir.join(format!("{ie_pid}.json"))
    }

    fn load(&self, ie_pid: &str) -> StoreResult<DestMapFile> {
        let path = self.ie_file(ie_pid);
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(DestMapFile::default())
            }
            Err(e) => return Err(StoreError::io("read", path, e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| StoreError::io("parse", path, e.into()))
    }
}

impl DestMapStore for FileDestMapStore {
    fn read(&self, ie_pid: &str, entity_pid: &str) -> StoreResult<Option<PathBuf>> {
        Ok(self.load(ie_pid)?.entries.get(entity_pid).cloned())
    }

    fn write(&self, ie_pid: &str, entity_pid: &str, dest: &Path) -> StoreResult<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| StoreError::io("create dir", self.dir.clone(), e))?;
        let mut doc = self.load(ie_pid)?;
        doc.entries.insert(entity_pid.to_string(), dest.to_path_buf());
        let path = self.ie_file(ie_pid);
        let json = serde_json::to_string_pretty(&doc)
            .map_err(|e| StoreError::io("serialize", path.clone(), e.into()))?;
        std::fs::write(&path, json).map_err(|e| StoreError::io("write", path, e))?;
        Ok(())
    }
}

/// In-memory store for tests and for hosts that manage durability themselves.
#[derive(Default)]
pub struct MemoryDestMapStore {
    entries: Mutex<BTreeMap<(String, String), PathBuf>>,
}

impl MemoryDestMapStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DestMapStore for MemoryDestMapStore {
    fn read(&self, ie_pid: &str, entity_pid: &str) -> StoreResult<Option<PathBuf>> {
        let entries = self.entries.lock().expect("destination map lock poisoned");
        Ok(entries
            .get(&(ie_pid.to_string(), entity_pid.to_string()))
            .cloned())
    }

    fn write(&self, ie_pid: &str, entity_pid: &str, dest: &Path) -> StoreResult<()> {
        let mut entries = self.entries.lock().expect("destination map lock poisoned");
        entries.insert(
            (ie_pid.to_string(), entity_pid.to_string()),
            dest.to_path_buf(),
        );
        Ok(())
    }
}
