//! Daily exchange-rate snapshot and its building blocks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Supported currency codes, each mapped to an "is convertible" marker.
pub type SymbolSet = BTreeMap<String, bool>;

/// Multipliers relative to a base currency: 1 base = `rates[code]` units of `code`.
pub type RateTable = BTreeMap<String, f64>;

/// Base and rates as published by a provider for one date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRates {
    pub base: String,
    pub rates: RateTable,
}

/// One calendar day's rates plus the currencies accepted for conversion that day.
///
/// A snapshot is keyed by `date` and never changes once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub date: NaiveDate,
    pub symbols: SymbolSet,
    pub base: String,
    pub rates: RateTable,
}

impl RateSnapshot {
    pub fn new(date: NaiveDate, symbols: SymbolSet, daily: DailyRates) -> Self {
        Self {
            date,
            symbols,
            base: daily.base,
            rates: daily.rates,
        }
    }

    /// Whether `code` (already normalized) may take part in a conversion.
    pub fn supports(&self, code: &str) -> bool {
        self.symbols.get(code).copied().unwrap_or(false)
    }

    /// Rate of `code` against the base. The base itself defaults to 1 when the
    /// provider leaves it out of the table.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates
            .get(code)
            .copied()
            .or_else(|| (code == self.base).then_some(1.0))
    }
}

/// Uppercases `raw` and checks it looks like an ISO 4217 style code.
pub fn normalize_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Some(code)
    } else {
        None
    }
}
