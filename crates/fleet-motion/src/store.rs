//! Durable string-keyed storage seam.
//!
//! The tracker persists one JSON blob under one namespace key.  The trait
//! mirrors that shape: load a string, save a string.  Host applications
//! plug in whatever durable storage they have; tests use [`MemoryStore`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

/// Errors produced by a state store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store poisoned: {0}")]
    Poisoned(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// String-keyed durable storage.
///
/// Absence of a key is `Ok(None)`, never an error.  Implementations are
/// expected to make `save` atomic per key but need no cross-key guarantees.
pub trait StateStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>>;
    fn save(&self, key: &str, value: &str) -> StoreResult<()>;
}

impl<T: StateStore + ?Sized> StateStore for &T {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).save(key, value)
    }
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

/// Volatile in-process store, for tests and hosts without durable storage.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ── FileStore ─────────────────────────────────────────────────────────────────

/// One file per key under a base directory.
///
/// Writes go through a temporary file and an atomic rename so a crash
/// mid-write never leaves a truncated blob.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are dotted namespaces, not user input; keep them readable.
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStore for FileStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl AsRef<Path> for FileStore {
    fn as_ref(&self) -> &Path {
        &self.dir
    }
}
