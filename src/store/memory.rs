use crate::core::error::StoreError;
use crate::core::snapshot::RateSnapshot;
use crate::core::store::SnapshotStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Snapshot store kept in process memory; contents are lost on exit.
#[derive(Clone, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<Mutex<HashMap<NaiveDate, RateSnapshot>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<RateSnapshot>, StoreError> {
        let snapshots = self.inner.lock().await;
        let found = snapshots.get(&date).cloned();
        if found.is_some() {
            debug!("Store HIT for date: {}", date);
        } else {
            debug!("Store MISS for date: {}", date);
        }
        Ok(found)
    }

    async fn insert(&self, snapshot: RateSnapshot) -> Result<RateSnapshot, StoreError> {
        let mut snapshots = self.inner.lock().await;
        if snapshots.contains_key(&snapshot.date) {
            return Err(StoreError::Duplicate(snapshot.date));
        }
        debug!("Store INSERT for date: {}", snapshot.date);
        snapshots.insert(snapshot.date, snapshot.clone());
        Ok(snapshot)
    }
}
