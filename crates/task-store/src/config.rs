//! Store Configuration
//!
//! Everything needed to reach the remote collection and the local snapshot.
//! Every field has a default so a partial JSON object is enough.

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_DATABASE: &str = "(default)";
pub const DEFAULT_COLLECTION: &str = "tasks";
pub const DEFAULT_SNAPSHOT_KEY: &str = "tasks";
pub const DEFAULT_PAGE_SIZE: u32 = 300;

/// Which remote store backs the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Cloud Firestore over its REST API
    #[default]
    Firestore,
    /// In-process store, nothing leaves the page
    Memory,
}

/// Storage configuration (JSON, camelCase keys)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    pub backend: Backend,
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    /// Pre-issued Firebase Auth id token, sent as a bearer token
    pub id_token: Option<String>,
    pub database: String,
    pub collection: String,
    pub base_url: String,
    pub page_size: u32,
    /// localStorage key for the list snapshot
    pub snapshot_key: String,
    /// Seed the list from the snapshot before the first remote load
    pub restore_snapshot: bool,
    pub log_level: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Firestore,
            project_id: None,
            api_key: None,
            id_token: None,
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
            restore_snapshot: true,
            log_level: "info".to_string(),
        }
    }
}

impl StoreConfig {
    /// Parse and validate a JSON config object
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let config: StoreConfig =
            serde_json::from_str(json).map_err(|e| DomainError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// An in-memory configuration, used when no remote store is configured
    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.collection.trim().is_empty() {
            return Err(DomainError::Config("collection must not be empty".to_string()));
        }
        if self.snapshot_key.trim().is_empty() {
            return Err(DomainError::Config("snapshotKey must not be empty".to_string()));
        }
        if self.backend == Backend::Firestore {
            if self.project_id.as_deref().map_or(true, |p| p.trim().is_empty()) {
                return Err(DomainError::Config("firestore backend requires projectId".to_string()));
            }
            if self.page_size == 0 {
                return Err(DomainError::Config("pageSize must be positive".to_string()));
            }
        }
        Ok(())
    }
}
