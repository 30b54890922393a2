//! Daily rate snapshot caching: persisted once per date, held in memory per process.

use crate::core::clock::Clock;
use crate::core::currency::RateProvider;
use crate::core::error::{RateError, StoreError};
use crate::core::snapshot::RateSnapshot;
use crate::core::store::SnapshotStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

/// Resolves the snapshot for a date, fetching and persisting it on first use.
#[derive(Clone)]
pub struct RateCacheManager {
    provider: Arc<dyn RateProvider>,
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
}

impl RateCacheManager {
    pub fn new(
        provider: Arc<dyn RateProvider>,
        store: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            store,
            clock,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub async fn get_current_snapshot(&self) -> Result<RateSnapshot, RateError> {
        self.snapshot_for(self.today()).await
    }

    /// Store lookup first; the provider is only contacted on a miss.
    #[instrument(skip(self), fields(date = %date))]
    pub async fn snapshot_for(&self, date: NaiveDate) -> Result<RateSnapshot, RateError> {
        if let Some(snapshot) = self.store.find_by_date(date).await? {
            debug!("Cache HIT");
            return Ok(snapshot);
        }
        debug!("Cache MISS");
        self.refresh(date).await
    }

    /// Fetches a fresh snapshot for `date` and persists it. If another writer
    /// stored that date first, its snapshot is returned instead.
    pub async fn refresh(&self, date: NaiveDate) -> Result<RateSnapshot, RateError> {
        info!(%date, "Refreshing rates from provider");
        let symbols = self.provider.fetch_symbols().await?;
        let daily = self.provider.fetch_rates(date).await?;
        let snapshot = RateSnapshot::new(date, symbols, daily);

        match self.store.insert(snapshot).await {
            Ok(stored) => {
                info!(%date, base = %stored.base, rates = stored.rates.len(), "Stored new snapshot");
                Ok(stored)
            }
            Err(StoreError::Duplicate(_)) => {
                warn!(%date, "Snapshot already stored by another writer, using it");
                let existing = self.store.find_by_date(date).await?.ok_or_else(|| {
                    StoreError::Backend(format!("snapshot for {date} missing after duplicate insert"))
                })?;
                Ok(existing)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-wide holder of the latest snapshot.
pub struct SnapshotCache {
    manager: RateCacheManager,
    current: RwLock<Arc<RateSnapshot>>,
    refresh_lock: Mutex<()>,
}

impl SnapshotCache {
    /// Loads today's snapshot. Callers treat failure as fatal: there is nothing
    /// to serve without it.
    pub async fn init(manager: RateCacheManager) -> Result<Self, RateError> {
        let snapshot = manager.get_current_snapshot().await?;
        info!(date = %snapshot.date, "Initial snapshot loaded");
        Ok(Self::with_snapshot(manager, snapshot))
    }

    pub fn with_snapshot(manager: RateCacheManager, snapshot: RateSnapshot) -> Self {
        Self {
            manager,
            current: RwLock::new(Arc::new(snapshot)),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.manager.today()
    }

    pub async fn get(&self) -> Arc<RateSnapshot> {
        Arc::clone(&*self.current.read().await)
    }

    /// Returns a snapshot valid for `today`, swapping in a new one when the held
    /// snapshot is older. A held snapshot from a later date is kept as is.
    pub async fn refresh_if_stale(&self, today: NaiveDate) -> Result<Arc<RateSnapshot>, RateError> {
        let current = self.get().await;
        if current.date >= today {
            return Ok(current);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another task may have refreshed while we waited.
        let current = self.get().await;
        if current.date >= today {
            return Ok(current);
        }

        let fresh = Arc::new(self.manager.snapshot_for(today).await?);
        *self.current.write().await = Arc::clone(&fresh);
        info!(from = %current.date, to = %fresh.date, "Swapped current snapshot");
        Ok(fresh)
    }
}
