//! Keyed persistent store
//!
//! String-keyed, JSON-valued. One key per game's state, one key per game's
//! log list. Read failures (missing or corrupt entries) degrade to a
//! supplied default instead of propagating; write failures surface as
//! `LdError::StoreWrite` so the caller can keep going in memory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;

use ld_core::{LdError, LdResult};

/// Raw string-keyed storage backend
pub trait StateStore {
    /// Read the raw value for a key, `None` if absent or unreadable
    fn read(&self, key: &str) -> Option<String>;

    /// Write the raw value for a key
    fn write(&self, key: &str, value: &str) -> LdResult<()>;

    /// Remove a key (absent keys are fine)
    fn remove(&self, key: &str);
}

/// In-memory backend, also the test double
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> LdResult<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

impl<S: StateStore + ?Sized> StateStore for std::sync::Arc<S> {
    fn read(&self, key: &str) -> Option<String> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> LdResult<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// File-backed store: one `<key>.json` file per key under a root directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Store rooted at an explicit directory
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Store rooted at the platform config directory
    pub fn default_location() -> Self {
        let root = dirs::config_dir()
            .map(|d| d.join("lucky-draw"))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(root)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl StateStore for JsonFileStore {
    fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn write(&self, key: &str, value: &str) -> LdResult<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| LdError::StoreWrite(e.to_string()))?;
        }
        fs::write(&path, value).map_err(|e| LdError::StoreWrite(e.to_string()))
    }

    fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.path_for(key));
    }
}

/// Typed get/set/remove facade over a raw store
#[derive(Debug)]
pub struct KeyedStore<S: StateStore> {
    backend: S,
}

impl<S: StateStore> KeyedStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Read and deserialize, degrading to the default on any failure
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.backend.read(key) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("store: corrupt entry for key {key:?}: {e}");
                    default
                }
            },
            None => default,
        }
    }

    /// Serialize and write
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> LdResult<()> {
        let raw =
            serde_json::to_string(value).map_err(|e| LdError::StoreWrite(e.to_string()))?;
        self.backend.write(key, &raw)
    }

    pub fn remove(&self, key: &str) {
        self.backend.remove(key);
    }
}
