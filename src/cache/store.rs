//! Pluggable key-value storage backends.
//!
//! [`TtlCache`](super::TtlCache) depends only on the [`KvStore`] trait, so
//! backends are interchangeable: [`MemoryStore`] for session-scoped data
//! (and for test fakes), [`FileStore`] for data that survives restarts.
//!
//! Entries are independent string keys holding JSON strings. Writes may
//! fail (disk, quota); reads never do — a backend that cannot produce a
//! value reports absence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

/// Backend write failure. Absorbed by the cache layer; never reaches
/// callers of the public API.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String-keyed, string-valued storage.
///
/// All operations are synchronous; implementations are expected to be
/// cheap enough to call on a request path.
pub trait KvStore: Send + Sync {
    /// Read a raw value. `None` when absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a raw value, overwriting any prior entry.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove an entry. Removing an absent key is a no-op.
    fn remove(&self, key: &str);

    /// Snapshot of all keys currently in the backend.
    fn keys(&self) -> Vec<String>;
}

/// In-memory backend. Session-scoped: contents die with the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.lock().unwrap().keys().cloned().collect()
    }
}

/// Durable backend: a JSON object persisted to a single file.
///
/// The file is read once at open; every mutation writes the whole map
/// back (entries are small and few — cached searches and a handful of
/// recommendations). A missing or corrupt file degrades to an empty
/// store with a logged warning, never an error.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open a store backed by the given file, loading any existing entries.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Default location: `$PETMATCH_CACHE_DIR/cache.json`, falling back to
    /// the platform data directory (`…/petmatch/cache.json`).
    pub fn default_path() -> PathBuf {
        std::env::var("PETMATCH_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("petmatch")
            })
            .join("cache.json")
    }

    fn load(path: &Path) -> HashMap<String, String> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return HashMap::new(), // first run
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt cache file, starting empty");
                HashMap::new()
            }
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap();
        if entries.remove(key).is_some() {
            if let Err(e) = self.persist(&entries) {
                warn!(path = %self.path.display(), error = %e, "failed to persist removal");
            }
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries.lock().unwrap().keys().cloned().collect()
    }
}
