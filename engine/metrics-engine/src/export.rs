//! Snapshot history export and import
//!
//! The export document carries the full stored history plus bookkeeping
//! fields; field names match the dashboard's established download format.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use snapshot_store::{DailySnapshot, Result, SnapshotBackend};
use std::path::Path;

/// Exported snapshot history document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Every stored snapshot, ascending by date
    pub snapshots: Vec<DailySnapshot>,

    /// Instant the export was taken
    #[serde(rename = "exportDate")]
    pub export_date: DateTime<Utc>,

    /// Number of exported dates
    #[serde(rename = "totalDays")]
    pub total_days: usize,
}

impl ExportDocument {
    /// Build an export of everything in the store
    pub async fn from_store(store: &dyn SnapshotBackend) -> Result<Self> {
        let mut snapshots = store.get_all().await?;
        snapshots.sort_by_key(|s| s.date);

        let total_days = snapshots.len();

        Ok(Self { snapshots, export_date: Utc::now(), total_days })
    }

    /// Restore every exported record into the store
    pub async fn import_into(&self, store: &dyn SnapshotBackend) -> Result<usize> {
        for snapshot in &self.snapshots {
            store.put(snapshot).await?;
        }

        tracing::info!("Imported {} snapshots", self.snapshots.len());

        Ok(self.snapshots.len())
    }

    /// Write the document as pretty-printed JSON
    pub async fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Read a previously written document
    pub async fn read_from(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Suggested download file name for an export taken on `date`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("surely-analytics-{date}.json")
}
