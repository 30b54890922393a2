//! Persistence abstraction for daily snapshots.

use crate::core::error::StoreError;
use crate::core::snapshot::RateSnapshot;
use async_trait::async_trait;
use chrono::NaiveDate;

/// A store holding at most one [`RateSnapshot`] per date.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<RateSnapshot>, StoreError>;

    /// Persists a new snapshot. Fails with [`StoreError::Duplicate`] when the date is
    /// already taken; existing snapshots are never overwritten.
    async fn insert(&self, snapshot: RateSnapshot) -> Result<RateSnapshot, StoreError>;
}
