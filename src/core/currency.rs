//! Exchange rate source abstractions

use crate::core::error::ProviderError;
use crate::core::snapshot::{DailyRates, SymbolSet};
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Currencies the provider can quote.
    async fn fetch_symbols(&self) -> Result<SymbolSet, ProviderError>;

    /// Base currency and rates published for `date`.
    async fn fetch_rates(&self, date: NaiveDate) -> Result<DailyRates, ProviderError>;
}
