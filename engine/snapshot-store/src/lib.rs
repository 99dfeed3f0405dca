//! # Snapshot Store
//!
//! This crate provides the persistence layer for the Surely analytics
//! dashboard. It stores one aggregated [`DailySnapshot`] per calendar date,
//! keyed by ISO date, and persists every mutation synchronously so a restart
//! after a completed call never loses data.
//!
//! ## Architecture
//!
//! - **SnapshotBackend**: Abstract trait for different storage backends
//! - **LocalSnapshotStore**: Local file-based implementation (one JSON record
//!   per date under a namespaced collection directory)
//! - **InMemorySnapshotStore**: In-memory implementation for tests and
//!   single-session use
//!
//! ## Usage
//!
//! ```rust
//! use snapshot_store::{create_local_store, DailySnapshot, SnapshotBackend};
//! use tempfile::TempDir;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let temp_dir = TempDir::new()?;
//!     let mut store = create_local_store(temp_dir.path())?;
//!     store.initialize().await?;
//!
//!     let date = "2024-01-05".parse()?;
//!     let mut snapshot = DailySnapshot::new(date, snapshot_store::Utc::now());
//!     snapshot.total = 120;
//!     store.put(&snapshot).await?;
//!
//!     assert_eq!(store.get(date).await?.unwrap().total, 120);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod local;
pub mod snapshot;

pub use backend::{InMemorySnapshotStore, LocalSnapshotStore, SnapshotBackend};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use local::{create_local_store, create_local_store_with_config};
pub use snapshot::DailySnapshot;

pub use chrono::{DateTime, NaiveDate, Utc};
/// Re-export common types for convenience
pub use serde::{Deserialize, Serialize};
