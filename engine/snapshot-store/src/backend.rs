//! Snapshot store backend trait and implementations

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::snapshot::DailySnapshot;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Abstract trait for snapshot store backends
#[async_trait::async_trait]
pub trait SnapshotBackend: Send + Sync {
    /// Initialize the backend
    async fn initialize(&mut self) -> Result<()>;

    /// Shutdown the backend
    async fn shutdown(&mut self) -> Result<()>;

    /// Load the record for a date, if one exists
    async fn get(&self, date: NaiveDate) -> Result<Option<DailySnapshot>>;

    /// Load every stored record (no ordering guarantee)
    async fn get_all(&self) -> Result<Vec<DailySnapshot>>;

    /// Upsert the record for its date, replacing any existing record
    async fn put(&self, snapshot: &DailySnapshot) -> Result<()>;

    /// Remove every stored record
    async fn clear(&self) -> Result<()>;

    /// Number of stored dates
    async fn count(&self) -> Result<usize>;

    /// Get the configuration
    fn config(&self) -> &StoreConfig;

    /// Get the data directory
    fn data_dir(&self) -> &PathBuf;
}

/// Local file-based snapshot store
///
/// Persists one JSON file per calendar date under the configured collection
/// directory. Every `put` flushes (and by default fsyncs) before resolving,
/// so a restart after a completed call never loses the record.
pub struct LocalSnapshotStore {
    config: StoreConfig,
    initialized: bool,
}

impl LocalSnapshotStore {
    /// Create a new local snapshot store
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate().map_err(StoreError::config)?;

        Ok(Self { config, initialized: false })
    }

    /// Create a new local snapshot store with default config
    pub fn with_default_config(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let config = StoreConfig::new(data_dir);
        Self::new(config)
    }

    fn ensure_initialized(&self) -> Result<()> {
        if !self.initialized {
            return Err(StoreError::invalid_operation("snapshot store not initialized"));
        }
        Ok(())
    }

    fn snapshot_path(&self, date: NaiveDate) -> PathBuf {
        self.config.snapshots_dir().join(format!("{date}.json"))
    }

    fn read_snapshot_file(path: &Path) -> Result<DailySnapshot> {
        let file = File::open(path).map_err(StoreError::Io)?;
        let reader = BufReader::new(file);

        serde_json::from_reader(reader)
            .map_err(|e| StoreError::corruption(format!("{}: {e}", path.display())))
    }

    fn write_snapshot_file(&self, snapshot: &DailySnapshot) -> Result<()> {
        let path = self.snapshot_path(snapshot.date);

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(StoreError::Io)?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, snapshot).map_err(StoreError::Serialization)?;
        writer.flush().map_err(StoreError::Io)?;

        if self.config.fsync_every_write {
            writer.get_ref().sync_all().map_err(StoreError::Io)?;
        }

        Ok(())
    }

    /// List the dates that have a record on disk
    fn stored_dates(&self) -> Result<Vec<(NaiveDate, PathBuf)>> {
        let mut dates = Vec::new();

        let entries = std::fs::read_dir(self.config.snapshots_dir()).map_err(StoreError::Io)?;

        for entry in entries {
            let entry = entry.map_err(StoreError::Io)?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            // Stray files that are not named after a date are not ours; skip them.
            let stem = path.file_stem().and_then(|s| s.to_str());
            if let Some(date) = stem.and_then(|s| s.parse::<NaiveDate>().ok()) {
                dates.push((date, path));
            }
        }

        Ok(dates)
    }
}

#[async_trait::async_trait]
impl SnapshotBackend for LocalSnapshotStore {
    async fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        std::fs::create_dir_all(&self.config.data_dir).map_err(StoreError::Io)?;
        std::fs::create_dir_all(self.config.snapshots_dir()).map_err(StoreError::Io)?;

        self.initialized = true;

        tracing::info!("Local snapshot store initialized at: {:?}", self.config.data_dir);

        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }

        self.initialized = false;

        tracing::info!("Local snapshot store shutdown complete");

        Ok(())
    }

    async fn get(&self, date: NaiveDate) -> Result<Option<DailySnapshot>> {
        self.ensure_initialized()?;

        let path = self.snapshot_path(date);
        if !path.exists() {
            return Ok(None);
        }

        Self::read_snapshot_file(&path).map(Some)
    }

    async fn get_all(&self) -> Result<Vec<DailySnapshot>> {
        self.ensure_initialized()?;

        let mut snapshots = Vec::new();
        for (_, path) in self.stored_dates()? {
            snapshots.push(Self::read_snapshot_file(&path)?);
        }

        Ok(snapshots)
    }

    async fn put(&self, snapshot: &DailySnapshot) -> Result<()> {
        self.ensure_initialized()?;

        self.write_snapshot_file(snapshot)?;

        tracing::debug!("Stored snapshot for {}", snapshot.date);

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.ensure_initialized()?;

        let dates = self.stored_dates()?;
        let removed = dates.len();

        for (_, path) in dates {
            std::fs::remove_file(&path).map_err(StoreError::Io)?;
        }

        tracing::info!("Cleared {} stored snapshots", removed);

        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        self.ensure_initialized()?;

        Ok(self.stored_dates()?.len())
    }

    fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn data_dir(&self) -> &PathBuf {
        &self.config.data_dir
    }
}

/// In-memory snapshot store (for testing and single-session use)
pub struct InMemorySnapshotStore {
    config: StoreConfig,
    snapshots: Arc<Mutex<HashMap<NaiveDate, DailySnapshot>>>,
    initialized: bool,
}

impl InMemorySnapshotStore {
    /// Create a new in-memory snapshot store
    pub fn new(config: StoreConfig) -> Self {
        Self { config, snapshots: Arc::new(Mutex::new(HashMap::new())), initialized: false }
    }

    /// Create a new in-memory snapshot store with default config
    pub fn with_default_config() -> Self {
        Self::new(StoreConfig::default())
    }

    fn ensure_initialized(&self) -> Result<()> {
        if !self.initialized {
            return Err(StoreError::invalid_operation("snapshot store not initialized"));
        }
        Ok(())
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::with_default_config()
    }
}

#[async_trait::async_trait]
impl SnapshotBackend for InMemorySnapshotStore {
    async fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        self.initialized = true;

        tracing::info!("In-memory snapshot store initialized");

        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }

        self.initialized = false;

        tracing::info!("In-memory snapshot store shutdown complete");

        Ok(())
    }

    async fn get(&self, date: NaiveDate) -> Result<Option<DailySnapshot>> {
        self.ensure_initialized()?;

        let snapshots = self.snapshots.lock().await;
        Ok(snapshots.get(&date).cloned())
    }

    async fn get_all(&self) -> Result<Vec<DailySnapshot>> {
        self.ensure_initialized()?;

        let snapshots = self.snapshots.lock().await;
        Ok(snapshots.values().cloned().collect())
    }

    async fn put(&self, snapshot: &DailySnapshot) -> Result<()> {
        self.ensure_initialized()?;

        let mut snapshots = self.snapshots.lock().await;
        snapshots.insert(snapshot.date, snapshot.clone());

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.ensure_initialized()?;

        let mut snapshots = self.snapshots.lock().await;
        snapshots.clear();

        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        self.ensure_initialized()?;

        let snapshots = self.snapshots.lock().await;
        Ok(snapshots.len())
    }

    fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn data_dir(&self) -> &PathBuf {
        &self.config.data_dir
    }
}
