//! Configuration for the snapshot store

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the snapshot store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base directory for persisted data
    pub data_dir: PathBuf,

    /// Name of the snapshot collection directory under `data_dir`
    pub collection: String,

    /// Whether to fsync after every write
    pub fsync_every_write: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            collection: "daily_snapshots".to_string(),
            fsync_every_write: true,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with custom data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), ..Default::default() }
    }

    /// Get the snapshot collection directory path
    pub fn snapshots_dir(&self) -> PathBuf {
        self.data_dir.join(&self.collection)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.collection.is_empty() {
            return Err("collection name must not be empty".to_string());
        }

        if self.collection.contains(std::path::is_separator) {
            return Err("collection name must not contain path separators".to_string());
        }

        Ok(())
    }
}
