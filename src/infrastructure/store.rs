// src/infrastructure/store.rs
// Key-value store implementations behind the ledger

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::repository::KeyValueStore;

/// Durable store: one JSON file per key under a data directory. Plays the
/// role the browser's localStorage plays for the original ledger.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| StoreError::Write(format!("Failed to create storage dir: {}", e)))?;

        std::fs::write(self.path_for(key), value)
            .map_err(|e| StoreError::Write(format!("Failed to write {}: {}", key, e)))
    }
}

/// Process-lifetime store for tests and embedders without durable storage
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
