//! Core domain types and the seams to external collaborators

pub mod clock;
pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod snapshot;
pub mod store;

// Re-export main types for cleaner imports
pub use clock::{Clock, LocalClock};
pub use currency::RateProvider;
pub use error::{ProviderError, RateError, StoreError};
pub use snapshot::{DailyRates, RateSnapshot, RateTable, SymbolSet};
pub use store::SnapshotStore;
