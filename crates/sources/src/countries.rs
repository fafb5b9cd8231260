//! Country directory adapter backed by restcountries.com.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::SourceError;
use crate::models::RawCountry;

/// Provider ID constant
const PROVIDER_ID: &str = "RESTCOUNTRIES";

/// Production endpoint, restricted to the fields the join needs.
const DEFAULT_ENDPOINT: &str =
    "https://restcountries.com/v2/all?fields=name,capital,region,population,flag,currencies";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A provider of raw country records.
///
/// Success is all-or-nothing: either the full directory is returned or the
/// call fails with a [`SourceError`]. Implementations do not retry.
#[async_trait]
pub trait CountrySource: Send + Sync {
    async fn fetch_countries(&self) -> Result<Vec<RawCountry>, SourceError>;
}

/// One currency entry in the restcountries v2 payload.
#[derive(Debug, Deserialize)]
struct CurrencyDto {
    code: Option<String>,
}

/// One country entry in the restcountries v2 payload.
#[derive(Debug, Deserialize)]
struct CountryDto {
    name: String,
    capital: Option<String>,
    region: Option<String>,
    #[serde(default)]
    population: i64,
    /// Flag image URL.
    flag: Option<String>,
    #[serde(default)]
    currencies: Vec<CurrencyDto>,
}

impl From<CountryDto> for RawCountry {
    fn from(dto: CountryDto) -> Self {
        RawCountry {
            name: dto.name,
            capital: dto.capital,
            region: dto.region,
            population: dto.population,
            currency_codes: dto
                .currencies
                .into_iter()
                .filter_map(|currency| currency.code)
                .collect(),
            flag_url: dto.flag,
        }
    }
}

/// Country directory client for the restcountries.com v2 API.
pub struct RestCountriesClient {
    client: Client,
    endpoint: String,
}

impl RestCountriesClient {
    /// Create a client against the production endpoint.
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Create a client against a custom endpoint. Used by tests and by
    /// deployments that mirror the directory.
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

impl Default for RestCountriesClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CountrySource for RestCountriesClient {
    async fn fetch_countries(&self) -> Result<Vec<RawCountry>, SourceError> {
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

        let dtos: Vec<CountryDto> = response
            .json()
            .await
            .map_err(|e| SourceError::from_reqwest(PROVIDER_ID, e))?;

        log::debug!("fetched {} countries from {}", dtos.len(), PROVIDER_ID);

        Ok(dtos.into_iter().map(RawCountry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_v2_payload() {
        let body = r#"[
            {
                "name": "Aland Islands",
                "capital": "Mariehamn",
                "region": "Europe",
                "population": 28875,
                "flag": "https://flagcdn.com/ax.svg",
                "currencies": [{"code": "EUR", "name": "Euro", "symbol": "€"}]
            },
            {
                "name": "Antarctica",
                "population": 1000,
                "currencies": []
            }
        ]"#;

        let dtos: Vec<CountryDto> = serde_json::from_str(body).unwrap();
        let raw: Vec<RawCountry> = dtos.into_iter().map(RawCountry::from).collect();

        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].name, "Aland Islands");
        assert_eq!(raw[0].capital.as_deref(), Some("Mariehamn"));
        assert_eq!(raw[0].primary_currency(), Some("EUR"));
        assert_eq!(raw[0].flag_url.as_deref(), Some("https://flagcdn.com/ax.svg"));

        assert_eq!(raw[1].name, "Antarctica");
        assert_eq!(raw[1].capital, None);
        assert_eq!(raw[1].region, None);
        assert!(raw[1].currency_codes.is_empty());
    }

    #[test]
    fn test_decode_skips_currency_entries_without_code() {
        let body = r#"[
            {
                "name": "Example",
                "population": 10,
                "currencies": [{"name": "Mystery money"}, {"code": "XXX"}]
            }
        ]"#;

        let dtos: Vec<CountryDto> = serde_json::from_str(body).unwrap();
        let raw = RawCountry::from(dtos.into_iter().next().unwrap());
        assert_eq!(raw.currency_codes, vec!["XXX".to_string()]);
    }
}
