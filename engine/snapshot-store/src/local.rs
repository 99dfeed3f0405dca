//! Local file-based snapshot store helpers

use crate::backend::LocalSnapshotStore;
use crate::config::StoreConfig;
use crate::error::Result;

/// Create a new local snapshot store with default configuration
pub fn create_local_store(
    data_dir: impl Into<std::path::PathBuf>,
) -> Result<LocalSnapshotStore> {
    LocalSnapshotStore::with_default_config(data_dir)
}

/// Create a new local snapshot store with custom configuration
pub fn create_local_store_with_config(config: StoreConfig) -> Result<LocalSnapshotStore> {
    LocalSnapshotStore::new(config)
}
