//! Snapshot Stores
//!
//! Full-list JSON snapshots in browser localStorage, or in memory.

use std::cell::RefCell;
use std::collections::HashMap;

use gloo_storage::errors::StorageError;
use gloo_storage::{LocalStorage, Storage};

use super::traits::SnapshotStore;
use crate::domain::{DomainError, DomainResult, Task};

/// Snapshot in `window.localStorage`, one JSON array per key
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageSnapshot;

impl SnapshotStore for LocalStorageSnapshot {
    fn save(&self, key: &str, tasks: &[Task]) -> DomainResult<()> {
        LocalStorage::set(key, tasks).map_err(storage_error)
    }

    fn load(&self, key: &str) -> DomainResult<Option<Vec<Task>>> {
        match LocalStorage::get::<Vec<Task>>(key) {
            Ok(tasks) => Ok(Some(tasks)),
            Err(StorageError::KeyNotFound(_)) => Ok(None),
            Err(err) => Err(storage_error(err)),
        }
    }
}

fn storage_error(err: StorageError) -> DomainError {
    match err {
        StorageError::SerdeError(e) => DomainError::Decode(e.to_string()),
        other => DomainError::Storage(other.to_string()),
    }
}

/// Snapshot held in a map of raw JSON strings
#[derive(Debug, Default)]
pub struct MemorySnapshot {
    entries: RefCell<HashMap<String, String>>,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON stored under `key`
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Store raw text under `key`, valid JSON or not
    pub fn put_raw(&self, key: &str, raw: &str) {
        self.entries.borrow_mut().insert(key.to_string(), raw.to_string());
    }
}

impl SnapshotStore for MemorySnapshot {
    fn save(&self, key: &str, tasks: &[Task]) -> DomainResult<()> {
        let json = serde_json::to_string(tasks)?;
        self.entries.borrow_mut().insert(key.to_string(), json);
        Ok(())
    }

    fn load(&self, key: &str) -> DomainResult<Option<Vec<Task>>> {
        match self.entries.borrow().get(key) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }
}
