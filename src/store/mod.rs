pub mod disk;
pub mod memory;

use crate::core::config::{AppConfig, StoreKind};
use crate::core::store::SnapshotStore;
use anyhow::{Context, Result};
use disk::DiskSnapshotStore;
use memory::MemorySnapshotStore;
use std::sync::Arc;
use tracing::info;

/// Opens the snapshot store selected by the configuration.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn SnapshotStore>> {
    match config.store {
        StoreKind::Memory => {
            info!("Using in-memory snapshot store");
            Ok(Arc::new(MemorySnapshotStore::new()))
        }
        StoreKind::Disk => {
            let path = config.default_data_path()?.join("snapshots");
            let store = DiskSnapshotStore::open(&path)
                .with_context(|| format!("Failed to open snapshot store at {}", path.display()))?;
            info!("Using snapshot store at {}", path.display());
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_disk_store_under_data_path() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = AppConfig {
            data_path: Some(temp_dir.path().to_string_lossy().into_owned()),
            ..AppConfig::default()
        };

        let store = open_store(&config)?;
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert!(store.find_by_date(date).await?.is_none());
        assert!(temp_dir.path().join("snapshots").exists());
        Ok(())
    }
}
