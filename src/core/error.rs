//! Error taxonomy for rate retrieval and persistence.

use chrono::NaiveDate;
use thiserror::Error;

/// Failures talking to the remote rate provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request error: {0}")]
    Request(String),

    #[error("HTTP error: {status} for {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("Provider error {code}: {info}")]
    Api { code: i64, info: String },

    #[error("Malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
}

/// Failures reading or writing persisted snapshots.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Snapshot for {0} already exists")]
    Duplicate(NaiveDate),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Failed to (de)serialize snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Anything that can go wrong while obtaining a rate snapshot.
#[derive(Debug, Error)]
pub enum RateError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
