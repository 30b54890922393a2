//! Currency conversion against a rate snapshot.

use crate::core::snapshot::RateSnapshot;
use rust_decimal::prelude::*;
use std::fmt;

/// Why a request produced no result. This is expected user-input noise, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    MissingCurrency,
    UnsupportedCurrency(String),
    MissingRate(String),
    MissingAmount,
    InvalidAmount(String),
    OutOfRange,
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejected::MissingCurrency => write!(f, "Both currencies are required"),
            Rejected::UnsupportedCurrency(code) => write!(f, "Unsupported currency: {code}"),
            Rejected::MissingRate(code) => write!(f, "No rate published for {code}"),
            Rejected::MissingAmount => write!(f, "Amount is required"),
            Rejected::InvalidAmount(text) => write!(f, "Invalid amount: {text}"),
            Rejected::OutOfRange => write!(f, "Result is out of range"),
        }
    }
}

/// A successful conversion, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub from: String,
    pub to: String,
    /// Amount exactly as the user typed it.
    pub amount: String,
    /// Always carries two fraction digits.
    pub result: Decimal,
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} is {} {}",
            self.amount, self.from, self.result, self.to
        )
    }
}

fn currency(snapshot: &RateSnapshot, raw: Option<&str>) -> Result<String, Rejected> {
    let code = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(Rejected::MissingCurrency)?
        .to_uppercase();
    if snapshot.supports(&code) {
        Ok(code)
    } else {
        Err(Rejected::UnsupportedCurrency(code))
    }
}

fn parse_amount(raw: Option<&str>) -> Result<(String, f64), Rejected> {
    let text = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(Rejected::MissingAmount)?;
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value != 0.0 => Ok((text.to_string(), value)),
        _ => Err(Rejected::InvalidAmount(text.to_string())),
    }
}

fn rate(snapshot: &RateSnapshot, code: &str) -> Result<f64, Rejected> {
    snapshot
        .rate(code)
        .ok_or_else(|| Rejected::MissingRate(code.to_string()))
}

/// Converts `amount` of `from` into `to`.
///
/// Codes are case-insensitive and must be listed in the snapshot's symbols. The
/// amount must parse to a finite, non-zero number. The result is rounded to two
/// decimals, ties away from zero.
pub fn convert(
    snapshot: &RateSnapshot,
    from: Option<&str>,
    to: Option<&str>,
    amount_text: Option<&str>,
) -> Result<Conversion, Rejected> {
    let from = currency(snapshot, from)?;
    let to = currency(snapshot, to)?;
    let (amount, value) = parse_amount(amount_text)?;

    let to_rate = rate(snapshot, &to)?;
    let raw = if from == snapshot.base {
        value * to_rate
    } else {
        value / rate(snapshot, &from)? * to_rate
    };

    let mut result = Decimal::from_f64_retain(raw)
        .ok_or(Rejected::OutOfRange)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    result.rescale(2);
    // rescale leaves the scale lower when 96 bits cannot hold two fraction digits
    if result.scale() != 2 {
        return Err(Rejected::OutOfRange);
    }

    Ok(Conversion {
        from,
        to,
        amount,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, rates, sample_snapshot, symbols};

    fn snapshot() -> RateSnapshot {
        sample_snapshot(date(2023, 1, 1))
    }

    fn run(from: &str, to: &str, amount: &str) -> Result<String, Rejected> {
        convert(&snapshot(), Some(from), Some(to), Some(amount)).map(|c| c.result.to_string())
    }

    #[test]
    fn test_cross_rate_conversion() {
        assert_eq!(run("USD", "UAH", "100"), Ok("3636.36".to_string()));
    }

    #[test]
    fn test_conversion_from_base() {
        assert_eq!(run("EUR", "USD", "50"), Ok("55.00".to_string()));
    }

    #[test]
    fn test_codes_are_case_insensitive() {
        let conversion = convert(&snapshot(), Some("usd"), Some("Uah"), Some("100")).unwrap();
        assert_eq!(conversion.from, "USD");
        assert_eq!(conversion.to, "UAH");
        assert_eq!(conversion.to_string(), "100 USD is 3636.36 UAH");
    }

    #[test]
    fn test_identity_on_base() {
        assert_eq!(run("EUR", "EUR", "12.346"), Ok("12.35".to_string()));
        assert_eq!(run("EUR", "EUR", "7"), Ok("7.00".to_string()));
    }

    #[test]
    fn test_round_trip_within_a_cent() {
        let there = run("USD", "UAH", "100").unwrap();
        let back = run("UAH", "USD", &there).unwrap();
        let diff = (back.parse::<f64>().unwrap() - 100.0).abs();
        assert!(diff <= 0.01, "round trip drifted to {back}");
    }

    #[test]
    fn test_deterministic() {
        let first = convert(&snapshot(), Some("UAH"), Some("USD"), Some("999.99"));
        for _ in 0..10 {
            assert_eq!(
                convert(&snapshot(), Some("UAH"), Some("USD"), Some("999.99")),
                first
            );
        }
    }

    #[test]
    fn test_ties_round_away_from_zero() {
        let snapshot = RateSnapshot {
            date: date(2023, 1, 1),
            symbols: symbols(&["EUR", "GBP"]),
            base: "EUR".to_string(),
            rates: rates(&[("GBP", 0.5)]),
        };
        let result = |amount| convert(&snapshot, Some("EUR"), Some("GBP"), Some(amount));
        assert_eq!(result("0.25").unwrap().result.to_string(), "0.13");
        assert_eq!(result("-0.25").unwrap().result.to_string(), "-0.13");
    }

    #[test]
    fn test_rejects_unknown_currency() {
        assert_eq!(
            run("GBP", "UAH", "100"),
            Err(Rejected::UnsupportedCurrency("GBP".to_string()))
        );
        assert_eq!(
            run("USD", "JPY", "100"),
            Err(Rejected::UnsupportedCurrency("JPY".to_string()))
        );
    }

    #[test]
    fn test_rejects_code_present_only_in_rates() {
        let mut snapshot = snapshot();
        snapshot.rates.insert("GBP".to_string(), 0.88);
        assert!(convert(&snapshot, Some("GBP"), Some("USD"), Some("1")).is_err());
    }

    #[test]
    fn test_rejects_symbol_without_rate() {
        let mut snapshot = snapshot();
        snapshot.symbols.insert("PLN".to_string(), true);
        assert_eq!(
            convert(&snapshot, Some("PLN"), Some("USD"), Some("1")),
            Err(Rejected::MissingRate("PLN".to_string()))
        );
    }

    #[test]
    fn test_rejects_bad_amounts() {
        assert_eq!(
            run("USD", "UAH", "0"),
            Err(Rejected::InvalidAmount("0".to_string()))
        );
        assert_eq!(
            run("USD", "UAH", "abc"),
            Err(Rejected::InvalidAmount("abc".to_string()))
        );
        assert_eq!(
            run("USD", "UAH", "NaN"),
            Err(Rejected::InvalidAmount("NaN".to_string()))
        );
        assert_eq!(
            convert(&snapshot(), Some("USD"), Some("UAH"), None),
            Err(Rejected::MissingAmount)
        );
    }

    #[test]
    fn test_rejects_results_too_large_for_two_decimals() {
        assert_eq!(run("EUR", "USD", "1e27"), Err(Rejected::OutOfRange));
        assert_eq!(run("EUR", "USD", "5e28"), Err(Rejected::OutOfRange));
        assert_eq!(run("EUR", "USD", "1e300"), Err(Rejected::OutOfRange));

        let large = convert(&snapshot(), Some("EUR"), Some("USD"), Some("1e26")).unwrap();
        assert_eq!(large.result.scale(), 2);
        assert!(large.result.to_string().ends_with(".00"));
    }

    #[test]
    fn test_rejects_missing_currency() {
        assert_eq!(
            convert(&snapshot(), None, Some("UAH"), Some("1")),
            Err(Rejected::MissingCurrency)
        );
        assert_eq!(
            convert(&snapshot(), Some("USD"), Some(""), Some("1")),
            Err(Rejected::MissingCurrency)
        );
    }
}
