//! Storage layer for creator-tools
//!
//! Every logical collection (projects, each capture kind, the offline sync
//! log) is one JSON array stored under its own key. Writes replace the whole
//! array; appends are read-modify-write at the layer above.
//!
//! # Directory Structure
//!
//! ```text
//! <data_dir>/
//!   .lock                 # Advisory lock held during a single key write
//!   projects.json         # Project documents with embedded task trees
//!   timestamps.json       # Capture records, one file per kind
//!   notes.json
//!   photos.json
//!   receipts.json
//!   voice_notes.json
//!   offline_sync.json     # Change log awaiting remote reconciliation
//!   config.toml           # Optional configuration
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

use crate::error::Result;
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

/// Name of the fallback data directory when no platform directory exists
pub const FALLBACK_DIR: &str = ".creator-tools";

/// Logical collection keys, one per entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    Projects,
    Timestamps,
    Notes,
    Photos,
    Receipts,
    VoiceNotes,
    OfflineSync,
}

impl StorageKey {
    pub const ALL: [StorageKey; 7] = [
        StorageKey::Projects,
        StorageKey::Timestamps,
        StorageKey::Notes,
        StorageKey::Photos,
        StorageKey::Receipts,
        StorageKey::VoiceNotes,
        StorageKey::OfflineSync,
    ];

    /// Keys holding capture-tool records
    pub const CAPTURES: [StorageKey; 5] = [
        StorageKey::Timestamps,
        StorageKey::Notes,
        StorageKey::Photos,
        StorageKey::Receipts,
        StorageKey::VoiceNotes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::Projects => "projects",
            StorageKey::Timestamps => "timestamps",
            StorageKey::Notes => "notes",
            StorageKey::Photos => "photos",
            StorageKey::Receipts => "receipts",
            StorageKey::VoiceNotes => "voice_notes",
            StorageKey::OfflineSync => "offline_sync",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synchronous key/value storage holding raw serialized values
pub trait Store {
    /// Read the raw value under `key`, `None` when absent
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: Store + ?Sized> Store for &S {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Directory-backed store: one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Resolve the default data directory for this platform
    pub fn default_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "creator-tools")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(".lock")
    }
}

impl Store for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let _lock = FileLock::acquire(self.lock_path(), self.lock_timeout_ms)?;
        lock::write_atomic(self.path_for(key), value.as_bytes())
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.dir.exists() {
            return Ok(());
        }
        let _lock = FileLock::acquire(self.lock_path(), self.lock_timeout_ms)?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process store, used by tests and embedders without a filesystem
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

impl Store for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Typed, fail-soft access to whole collections
///
/// Read failures (missing key, I/O error, undecodable JSON) yield an empty
/// collection; write failures are logged and dropped. Nothing here returns
/// an error to the caller.
#[derive(Debug)]
pub struct Collections<S> {
    store: S,
}

impl<S: Store> Collections<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the whole collection under `key`
    pub fn get<T: DeserializeOwned>(&self, key: StorageKey) -> Vec<T> {
        let raw = match self.store.read(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(key = %key, error = %err, "failed to read collection, treating as empty");
                return Vec::new();
            }
        };

        if raw.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => items,
            Err(err) => {
                warn!(key = %key, error = %err, "discarding undecodable collection");
                Vec::new()
            }
        }
    }

    /// Replace the whole collection under `key`
    pub fn set<T: Serialize>(&self, key: StorageKey, items: &[T]) {
        let json = match serde_json::to_string(items) {
            Ok(json) => json,
            Err(err) => {
                error!(key = %key, error = %err, "failed to serialize collection, write dropped");
                return;
            }
        };

        match self.store.write(key.as_str(), &json) {
            Ok(()) => debug!(key = %key, count = items.len(), "collection written"),
            Err(err) => error!(key = %key, error = %err, "failed to write collection, write dropped"),
        }
    }

    /// Remove the collection under `key`
    pub fn clear(&self, key: StorageKey) {
        if let Err(err) = self.store.remove(key.as_str()) {
            error!(key = %key, error = %err, "failed to remove collection");
        }
    }

    /// Serialized size in bytes of the collection under `key`
    pub fn raw_len(&self, key: StorageKey) -> usize {
        match self.store.read(key.as_str()) {
            Ok(Some(raw)) => raw.len(),
            Ok(None) => 0,
            Err(err) => {
                warn!(key = %key, error = %err, "failed to read collection size");
                0
            }
        }
    }
}
