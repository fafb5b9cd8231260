//! Exchange rate adapter backed by open.er-api.com.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::SourceError;
use crate::models::RateTable;

/// Provider ID constant
const PROVIDER_ID: &str = "OPEN_ER_API";

/// Production endpoint: latest rates against USD.
const DEFAULT_ENDPOINT: &str = "https://open.er-api.com/v6/latest/USD";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A provider of currency exchange rates against a fixed base currency.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<RateTable, SourceError>;
}

/// Response envelope of the open.er-api v6 feed.
#[derive(Debug, Deserialize)]
struct ErApiResponse {
    /// "success" or "error"; absent on some mirrors.
    result: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    rates: HashMap<String, Decimal>,
}

/// Exchange rate client for the open.er-api.com v6 feed.
pub struct OpenErApiClient {
    client: Client,
    endpoint: String,
}

impl OpenErApiClient {
    /// Create a client against the production endpoint.
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Create a client against a custom endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl Default for OpenErApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep only usable rates. The join divides by the rate, so zero or negative
/// entries are treated the same as a currency the feed does not cover.
fn sanitize_rates(rates: HashMap<String, Decimal>) -> RateTable {
    let before = rates.len();
    let table: RateTable = rates
        .into_iter()
        .filter(|(_, rate)| rate.is_sign_positive() && !rate.is_zero())
        .collect();
    if table.len() < before {
        log::warn!(
            "{}: dropped {} non-positive rates",
            PROVIDER_ID,
            before - table.len()
        );
    }
    table
}

#[async_trait]
impl RateSource for OpenErApiClient {
    async fn fetch_rates(&self) -> Result<RateTable, SourceError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(PROVIDER_ID, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                provider: PROVIDER_ID,
                status: status.as_u16(),
            });
        }

        let payload: ErApiResponse = response
            .json()
            .await
            .map_err(|e| SourceError::from_reqwest(PROVIDER_ID, e))?;

        if payload.result.as_deref() == Some("error") {
            return Err(SourceError::Upstream {
                provider: PROVIDER_ID,
                message: payload
                    .error_type
                    .unwrap_or_else(|| "unspecified error".to_string()),
            });
        }

        log::debug!("fetched {} rates from {}", payload.rates.len(), PROVIDER_ID);

        Ok(sanitize_rates(payload.rates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decode_v6_payload() {
        let body = r#"{
            "result": "success",
            "base_code": "USD",
            "rates": {"USD": 1, "EUR": 0.92, "NGN": 1538.42}
        }"#;

        let payload: ErApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(payload.result.as_deref(), Some("success"));
        let table = sanitize_rates(payload.rates);
        assert_eq!(table.get("EUR"), Some(&dec!(0.92)));
        assert_eq!(table.get("NGN"), Some(&dec!(1538.42)));
    }

    #[test]
    fn test_sanitize_drops_non_positive_rates() {
        let mut rates = HashMap::new();
        rates.insert("EUR".to_string(), dec!(0.92));
        rates.insert("BAD".to_string(), dec!(0));
        rates.insert("WORSE".to_string(), dec!(-3));

        let table = sanitize_rates(rates);
        assert_eq!(table.len(), 1);
        assert!(table.contains_key("EUR"));
    }

    #[test]
    fn test_decode_error_payload() {
        let body = r#"{"result": "error", "error-type": "unknown-code"}"#;
        let payload: ErApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(payload.result.as_deref(), Some("error"));
        assert_eq!(payload.error_type.as_deref(), Some("unknown-code"));
        assert!(payload.rates.is_empty());
    }
}
