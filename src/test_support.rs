//! Fakes shared by unit tests.

use crate::core::clock::Clock;
use crate::core::currency::RateProvider;
use crate::core::error::ProviderError;
use crate::core::snapshot::{DailyRates, RateSnapshot, RateTable, SymbolSet};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn symbols(codes: &[&str]) -> SymbolSet {
    codes.iter().map(|code| (code.to_string(), true)).collect()
}

pub fn rates(pairs: &[(&str, f64)]) -> RateTable {
    pairs
        .iter()
        .map(|(code, rate)| (code.to_string(), *rate))
        .collect()
}

/// `{base: EUR, symbols: {USD, EUR, UAH}, rates: {USD: 1.10, UAH: 40.0}}`
pub fn sample_snapshot(on: NaiveDate) -> RateSnapshot {
    RateSnapshot {
        date: on,
        symbols: symbols(&["USD", "EUR", "UAH"]),
        base: "EUR".to_string(),
        rates: rates(&[("USD", 1.10), ("UAH", 40.0)]),
    }
}

pub struct FixedClock(Mutex<NaiveDate>);

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self(Mutex::new(today))
    }

    pub fn set(&self, today: NaiveDate) {
        *self.0.lock().unwrap() = today;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.0.lock().unwrap()
    }
}

/// Serves the sample rates and counts how often it is asked.
#[derive(Default)]
pub struct MockProvider {
    pub symbol_calls: AtomicUsize,
    pub rate_calls: AtomicUsize,
    failing: AtomicBool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn symbol_calls(&self) -> usize {
        self.symbol_calls.load(Ordering::SeqCst)
    }

    pub fn rate_calls(&self) -> usize {
        self.rate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateProvider for MockProvider {
    async fn fetch_symbols(&self) -> Result<SymbolSet, ProviderError> {
        self.symbol_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::Request("connection refused".to_string()));
        }
        Ok(symbols(&["USD", "EUR", "UAH"]))
    }

    async fn fetch_rates(&self, _date: NaiveDate) -> Result<DailyRates, ProviderError> {
        self.rate_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::Request("connection refused".to_string()));
        }
        Ok(DailyRates {
            base: "EUR".to_string(),
            rates: rates(&[("USD", 1.10), ("UAH", 40.0)]),
        })
    }
}
