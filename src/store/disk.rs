use crate::core::error::StoreError;
use crate::core::snapshot::RateSnapshot;
use crate::core::store::SnapshotStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

const PARTITION: &str = "snapshots";

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// fjall-backed snapshot store; one JSON document per date key.
pub struct DiskSnapshotStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
    // Serializes check-then-insert so a date is written at most once.
    write_lock: Mutex<()>,
}

impl DiskSnapshotStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path).map_err(backend)?;

        let keyspace = fjall::Config::new(path).open().map_err(backend)?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .map_err(backend)?;
        debug!("Opened snapshot store at {}", path.display());

        Ok(Self {
            keyspace,
            partition,
            write_lock: Mutex::new(()),
        })
    }

    fn read(&self, date: NaiveDate) -> Result<Option<RateSnapshot>, StoreError> {
        match self.partition.get(date_key(date)).map_err(backend)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SnapshotStore for DiskSnapshotStore {
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<RateSnapshot>, StoreError> {
        let found = self.read(date)?;
        if found.is_some() {
            debug!("Store HIT for date: {}", date);
        } else {
            debug!("Store MISS for date: {}", date);
        }
        Ok(found)
    }

    async fn insert(&self, snapshot: RateSnapshot) -> Result<RateSnapshot, StoreError> {
        let _guard = self.write_lock.lock().await;
        if self.read(snapshot.date)?.is_some() {
            return Err(StoreError::Duplicate(snapshot.date));
        }

        let value = serde_json::to_vec(&snapshot)?;
        self.partition
            .insert(date_key(snapshot.date).as_bytes(), value)
            .map_err(backend)?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(backend)?;
        debug!("Store INSERT for date: {}", snapshot.date);
        Ok(snapshot)
    }
}
