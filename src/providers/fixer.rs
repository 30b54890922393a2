use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

use crate::core::currency::RateProvider;
use crate::core::error::ProviderError;
use crate::core::snapshot::{DailyRates, RateTable, SymbolSet, normalize_code};

// FixerProvider implementation for RateProvider
pub struct FixerProvider {
    base_url: String,
    access_key: String,
    client: reqwest::Client,
}

impl FixerProvider {
    pub fn new(base_url: &str, access_key: &str) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cnvtbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        Ok(FixerProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ProviderError> {
        let raw_url = format!("{}/{}", self.base_url, endpoint);
        let url =
            reqwest::Url::parse_with_params(&raw_url, &[("access_key", self.access_key.as_str())])
                .map_err(|e| ProviderError::Request(format!("Invalid URL {raw_url}: {e}")))?;
        // The access key rides in the query string; keep it out of logs and errors.
        debug!("Requesting fixer endpoint {}", raw_url);

        let response = self.client.get(url).send().await.map_err(|e| {
            ProviderError::Request(format!("{} for endpoint: {}", e.without_url(), endpoint))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        let text = response.text().await.map_err(|e| {
            ProviderError::Request(format!("{} for endpoint: {}", e.without_url(), endpoint))
        })?;
        parse_body(endpoint, &text)
    }
}

#[derive(Debug, Deserialize)]
struct FixerFailure {
    error: Option<FixerErrorBody>,
}

#[derive(Debug, Deserialize)]
struct FixerErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SymbolsResponse {
    symbols: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    base: String,
    rates: HashMap<String, Value>,
}

fn malformed(endpoint: &str, reason: impl ToString) -> ProviderError {
    ProviderError::Malformed {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    }
}

/// fixer answers API failures with HTTP 200 and `"success": false`.
fn parse_body<T: DeserializeOwned>(endpoint: &str, text: &str) -> Result<T, ProviderError> {
    let value: Value = serde_json::from_str(text).map_err(|e| malformed(endpoint, e))?;

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let failure: FixerFailure =
            serde_json::from_value(value).map_err(|e| malformed(endpoint, e))?;
        let (code, info) = failure
            .error
            .map(|body| (body.code, body.info.or(body.kind)))
            .unwrap_or((0, None));
        return Err(ProviderError::Api {
            code,
            info: info.unwrap_or_else(|| "unknown error".to_string()),
        });
    }

    serde_json::from_value(value).map_err(|e| malformed(endpoint, e))
}

/// JSON truthiness, matching how the symbol markers are published.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn ingest_symbols(endpoint: &str, raw: HashMap<String, Value>) -> Result<SymbolSet, ProviderError> {
    let mut symbols = SymbolSet::new();
    for (code, marker) in raw {
        match normalize_code(&code) {
            Some(code) => {
                symbols.insert(code, is_truthy(&marker));
            }
            None => warn!(code = %code, "Dropping invalid currency code from symbols"),
        }
    }

    if !symbols.values().any(|supported| *supported) {
        return Err(malformed(endpoint, "no usable symbols"));
    }
    Ok(symbols)
}

fn ingest_rates(endpoint: &str, raw: RatesResponse) -> Result<DailyRates, ProviderError> {
    let base = normalize_code(&raw.base)
        .ok_or_else(|| malformed(endpoint, format!("invalid base currency: {:?}", raw.base)))?;

    let mut rates = RateTable::new();
    for (code, value) in raw.rates {
        let rate = value.as_f64().filter(|r| r.is_finite() && *r > 0.0);
        match (normalize_code(&code), rate) {
            (Some(code), Some(rate)) => {
                rates.insert(code, rate);
            }
            _ => warn!(code = %code, value = %value, "Dropping invalid rate"),
        }
    }

    if rates.is_empty() {
        return Err(malformed(endpoint, "no usable rates"));
    }
    Ok(DailyRates { base, rates })
}

#[async_trait]
impl RateProvider for FixerProvider {
    #[instrument(name = "FixerSymbolsFetch", skip(self))]
    async fn fetch_symbols(&self) -> Result<SymbolSet, ProviderError> {
        let endpoint = "symbols";
        let data: SymbolsResponse = self.get_json(endpoint).await?;
        let symbols = ingest_symbols(endpoint, data.symbols)?;
        debug!(count = symbols.len(), "Received fixer symbols");
        Ok(symbols)
    }

    #[instrument(name = "FixerRatesFetch", skip(self), fields(date = %date))]
    async fn fetch_rates(&self, date: NaiveDate) -> Result<DailyRates, ProviderError> {
        let endpoint = date.format("%Y-%m-%d").to_string();
        let data: RatesResponse = self.get_json(&endpoint).await?;
        let rates = ingest_rates(&endpoint, data)?;
        debug!(base = %rates.base, count = rates.rates.len(), "Received fixer rates");
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ACCESS_KEY: &str = "test-key";

    async fn create_mock_server(endpoint: &str, response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/{endpoint}")))
            .and(query_param("access_key", ACCESS_KEY))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn provider(mock_server: &MockServer) -> FixerProvider {
        FixerProvider::new(&mock_server.uri(), ACCESS_KEY).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_successful_symbols_fetch() {
        let mock_response = r#"{
            "success": true,
            "symbols": {
                "USD": "United States Dollar",
                "eur": "Euro",
                "UAH": "Ukrainian Hryvnia",
                "BOGUS": "Not a currency"
            }
        }"#;
        let mock_server = create_mock_server(
            "symbols",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let symbols = provider(&mock_server).fetch_symbols().await.unwrap();
        assert_eq!(symbols.len(), 3);
        assert_eq!(symbols.get("USD"), Some(&true));
        assert_eq!(symbols.get("EUR"), Some(&true));
        assert!(!symbols.contains_key("BOGUS"));
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "success": true,
            "timestamp": 1672617599,
            "historical": true,
            "base": "EUR",
            "date": "2023-01-01",
            "rates": {
                "USD": 1.10,
                "UAH": 40.0,
                "EUR": 1,
                "XXX": null
            }
        }"#;
        let mock_server = create_mock_server(
            "2023-01-01",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let rates = provider(&mock_server).fetch_rates(date()).await.unwrap();
        assert_eq!(rates.base, "EUR");
        assert_eq!(rates.rates.len(), 3);
        assert_eq!(rates.rates.get("USD"), Some(&1.10));
        assert_eq!(rates.rates.get("EUR"), Some(&1.0));
    }

    #[tokio::test]
    async fn test_fixer_api_error_payload() {
        let mock_response = r#"{
            "success": false,
            "error": {
                "code": 101,
                "type": "invalid_access_key",
                "info": "You have not supplied a valid API Access Key."
            }
        }"#;
        let mock_server = create_mock_server(
            "symbols",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let result = provider(&mock_server).fetch_symbols().await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Provider error 101: You have not supplied a valid API Access Key."
        );
    }

    #[tokio::test]
    async fn test_fixer_http_error_response() {
        let mock_server = create_mock_server("2023-01-01", ResponseTemplate::new(500)).await;

        let result = provider(&mock_server).fetch_rates(date()).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 for 2023-01-01"
        );
    }

    #[tokio::test]
    async fn test_fixer_malformed_response() {
        let mock_response = r#"{"success": true, "quotes": {}}"#;
        let mock_server = create_mock_server(
            "2023-01-01",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let result = provider(&mock_server).fetch_rates(date()).await;
        assert!(matches!(result, Err(ProviderError::Malformed { .. })));
    }

    #[tokio::test]
    async fn test_fixer_invalid_base_rejected() {
        let mock_response = r#"{"success": true, "base": "EURO", "rates": {"USD": 1.1}}"#;
        let mock_server = create_mock_server(
            "2023-01-01",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let result = provider(&mock_server).fetch_rates(date()).await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("invalid base currency")
        );
    }

    #[test]
    fn test_truthy_markers() {
        assert!(is_truthy(&Value::Bool(true)));
        assert!(is_truthy(&Value::String("Euro".into())));
        assert!(is_truthy(&serde_json::json!(1)));
        assert!(!is_truthy(&Value::Bool(false)));
        assert!(!is_truthy(&Value::String(String::new())));
        assert!(!is_truthy(&serde_json::json!(0)));
        assert!(!is_truthy(&Value::Null));
    }
}
