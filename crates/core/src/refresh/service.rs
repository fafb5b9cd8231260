//! Refresh orchestrator.
//!
//! One refresh is a single pass through the pipeline:
//!
//! ```text
//! fetch countries ─┐
//!                  ├─► join/estimate ─► upsert ─► aggregate ─► render
//! fetch rates ─────┘
//! ```
//!
//! The two fetches run concurrently and fail the refresh together - if
//! either source is down the other's result is discarded and nothing is
//! persisted. Once `upsert_all` has succeeded the refresh has succeeded:
//! the aggregate read-back and the summary render are post-steps whose
//! failure is logged, never propagated. There are no retries; at most one
//! attempt per invocation.
//!
//! Concurrent refreshes are allowed and race benignly: row upserts and the
//! image artifact both resolve to last-write-wins.

use serde::Serialize;
use std::sync::Arc;

use crate::countries::{
    normalize, CountryRepositoryTrait, GdpMultiplier, StatusSnapshot, TopCountry,
};
use crate::errors::{Error, Result};
use crate::summary::SummaryRenderer;
use econatlas_sources::{CountrySource, RateSource};

/// Number of ranked entries handed to the renderer.
const TOP_LIMIT: i64 = 5;

/// Outcome of a successful refresh.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RefreshSummary {
    /// Number of country records written in this cycle.
    pub upserted: usize,
}

/// Coordinates the source adapters, the join engine, the repository and the
/// summary renderer. All collaborators are injected; the service holds no
/// global state.
pub struct RefreshService {
    countries: Arc<dyn CountrySource>,
    rates: Arc<dyn RateSource>,
    repository: Arc<dyn CountryRepositoryTrait>,
    multiplier: Arc<dyn GdpMultiplier>,
    renderer: SummaryRenderer,
}

impl RefreshService {
    pub fn new(
        countries: Arc<dyn CountrySource>,
        rates: Arc<dyn RateSource>,
        repository: Arc<dyn CountryRepositoryTrait>,
        multiplier: Arc<dyn GdpMultiplier>,
        renderer: SummaryRenderer,
    ) -> Self {
        Self {
            countries,
            rates,
            repository,
            multiplier,
            renderer,
        }
    }

    /// Run one refresh cycle.
    pub async fn refresh(&self) -> Result<RefreshSummary> {
        log::info!("refresh started");

        let (countries, rates) = tokio::try_join!(
            async {
                self.countries
                    .fetch_countries()
                    .await
                    .map_err(Error::from)
            },
            async { self.rates.fetch_rates().await.map_err(Error::from) },
        )?;
        log::debug!(
            "fetched {} countries and {} rates",
            countries.len(),
            rates.len()
        );

        let records = normalize(countries, &rates, self.multiplier.as_ref());

        let upserted = self.repository.upsert_all(records).await?;
        log::info!("refresh persisted {} countries", upserted);

        // The data is in; everything past this point is best-effort.
        match self.aggregate() {
            Ok((status, top)) => {
                if let Err(e) = self.renderer.render_to_cache(
                    status.total_countries,
                    &top,
                    status.last_refreshed_at,
                ) {
                    log::error!("summary rendering failed: {}", e);
                }
            }
            Err(e) => {
                log::warn!("aggregate read-back failed, skipping summary render: {}", e);
            }
        }

        Ok(RefreshSummary { upserted })
    }

    fn aggregate(&self) -> Result<(StatusSnapshot, Vec<TopCountry>)> {
        let status = self.repository.get_status()?;
        let top = self.repository.get_top_by_estimate(TOP_LIMIT)?;
        Ok((status, top))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countries::{
        CountryFilters, CountrySort, FixedMultiplier, NormalizedCountry,
    };
    use crate::errors::DatabaseError;
    use async_trait::async_trait;
    use econatlas_sources::{RateTable, RawCountry, SourceError};
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    // =========================================================================
    // Mock sources
    // =========================================================================

    struct MockCountrySource {
        countries: Vec<RawCountry>,
        fail: bool,
    }

    #[async_trait]
    impl CountrySource for MockCountrySource {
        async fn fetch_countries(&self) -> std::result::Result<Vec<RawCountry>, SourceError> {
            if self.fail {
                return Err(SourceError::Timeout {
                    provider: "RESTCOUNTRIES",
                });
            }
            Ok(self.countries.clone())
        }
    }

    struct MockRateSource {
        rates: RateTable,
        fail: bool,
    }

    #[async_trait]
    impl RateSource for MockRateSource {
        async fn fetch_rates(&self) -> std::result::Result<RateTable, SourceError> {
            if self.fail {
                return Err(SourceError::Status {
                    provider: "OPEN_ER_API",
                    status: 502,
                });
            }
            Ok(self.rates.clone())
        }
    }

    // =========================================================================
    // Mock repository
    // =========================================================================

    #[derive(Default)]
    struct MockRepository {
        stored: Arc<Mutex<Vec<NormalizedCountry>>>,
        upsert_calls: Arc<Mutex<usize>>,
        fail_on_upsert: bool,
        fail_on_status: bool,
    }

    #[async_trait]
    impl CountryRepositoryTrait for MockRepository {
        async fn upsert_all(&self, records: Vec<NormalizedCountry>) -> Result<usize> {
            *self.upsert_calls.lock().unwrap() += 1;
            if self.fail_on_upsert {
                return Err(Error::Database(DatabaseError::QueryFailed(
                    "disk full".to_string(),
                )));
            }
            let count = records.len();
            let mut stored = self.stored.lock().unwrap();
            for record in records {
                stored.retain(|existing| !existing.name.eq_ignore_ascii_case(&record.name));
                stored.push(record);
            }
            Ok(count)
        }

        fn get_all(
            &self,
            _filters: &CountryFilters,
            _sort: Option<CountrySort>,
        ) -> Result<Vec<NormalizedCountry>> {
            Ok(self.stored.lock().unwrap().clone())
        }

        fn get_by_name(&self, name: &str) -> Result<Option<NormalizedCountry>> {
            Ok(self
                .stored
                .lock()
                .unwrap()
                .iter()
                .find(|record| record.name.eq_ignore_ascii_case(name))
                .cloned())
        }

        async fn delete_by_name(&self, name: &str) -> Result<bool> {
            let mut stored = self.stored.lock().unwrap();
            let before = stored.len();
            stored.retain(|record| !record.name.eq_ignore_ascii_case(name));
            Ok(stored.len() < before)
        }

        fn get_status(&self) -> Result<StatusSnapshot> {
            if self.fail_on_status {
                return Err(Error::Database(DatabaseError::QueryFailed(
                    "status query failed".to_string(),
                )));
            }
            let stored = self.stored.lock().unwrap();
            Ok(StatusSnapshot {
                total_countries: stored.len() as i64,
                last_refreshed_at: None,
            })
        }

        fn get_top_by_estimate(&self, limit: i64) -> Result<Vec<TopCountry>> {
            let stored = self.stored.lock().unwrap();
            let mut ranked: Vec<TopCountry> = stored
                .iter()
                .filter_map(|record| {
                    record.estimated_gdp.map(|estimated_gdp| TopCountry {
                        name: record.name.clone(),
                        estimated_gdp,
                    })
                })
                .collect();
            ranked.sort_by(|a, b| b.estimated_gdp.cmp(&a.estimated_gdp));
            ranked.truncate(limit as usize);
            Ok(ranked)
        }
    }

    fn raw(name: &str, population: i64, codes: &[&str]) -> RawCountry {
        RawCountry {
            name: name.to_string(),
            capital: None,
            region: None,
            population,
            currency_codes: codes.iter().map(|c| c.to_string()).collect(),
            flag_url: None,
        }
    }

    fn service(
        countries: MockCountrySource,
        rates: MockRateSource,
        repository: Arc<MockRepository>,
        cache_dir: &std::path::Path,
    ) -> RefreshService {
        RefreshService::new(
            Arc::new(countries),
            Arc::new(rates),
            repository,
            Arc::new(FixedMultiplier(dec!(1500))),
            SummaryRenderer::new(cache_dir),
        )
    }

    #[tokio::test]
    async fn test_refresh_persists_and_renders() {
        let dir = tempdir().unwrap();
        let repository = Arc::new(MockRepository::default());
        let rates: RateTable = [("EUR".to_string(), dec!(0.92))].into_iter().collect();

        let refresh = service(
            MockCountrySource {
                countries: vec![raw("Aland", 1000, &["EUR"]), raw("Antarctica", 0, &[])],
                fail: false,
            },
            MockRateSource { rates, fail: false },
            repository.clone(),
            dir.path(),
        );

        let summary = refresh.refresh().await.unwrap();
        assert_eq!(summary.upserted, 2);

        let stored = repository.stored.lock().unwrap();
        assert_eq!(stored.len(), 2);
        let aland = stored.iter().find(|c| c.name == "Aland").unwrap();
        assert_eq!(aland.exchange_rate, Some(dec!(0.92)));
        // 1000 * 1500 / 0.92
        assert_eq!(aland.estimated_gdp, Some(dec!(1500000) / dec!(0.92)));
        drop(stored);

        assert!(dir.path().join("summary.png").exists());
    }

    #[tokio::test]
    async fn test_rates_failure_aborts_before_persisting() {
        let dir = tempdir().unwrap();
        let repository = Arc::new(MockRepository::default());

        let refresh = service(
            MockCountrySource {
                countries: vec![raw("Aland", 1000, &["EUR"])],
                fail: false,
            },
            MockRateSource {
                rates: RateTable::new(),
                fail: true,
            },
            repository.clone(),
            dir.path(),
        );

        let err = refresh.refresh().await.unwrap_err();
        assert!(matches!(err, Error::Source(_)));
        assert_eq!(*repository.upsert_calls.lock().unwrap(), 0);
        assert!(repository.stored.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_countries_failure_aborts_before_persisting() {
        let dir = tempdir().unwrap();
        let repository = Arc::new(MockRepository::default());

        let refresh = service(
            MockCountrySource {
                countries: vec![],
                fail: true,
            },
            MockRateSource {
                rates: RateTable::new(),
                fail: false,
            },
            repository.clone(),
            dir.path(),
        );

        let err = refresh.refresh().await.unwrap_err();
        assert!(matches!(err, Error::Source(_)));
        assert_eq!(*repository.upsert_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_is_a_database_error() {
        let dir = tempdir().unwrap();
        let repository = Arc::new(MockRepository {
            fail_on_upsert: true,
            ..Default::default()
        });

        let refresh = service(
            MockCountrySource {
                countries: vec![raw("Aland", 1000, &["EUR"])],
                fail: false,
            },
            MockRateSource {
                rates: RateTable::new(),
                fail: false,
            },
            repository.clone(),
            dir.path(),
        );

        let err = refresh.refresh().await.unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[tokio::test]
    async fn test_aggregate_failure_suppresses_render_but_not_success() {
        let dir = tempdir().unwrap();
        let repository = Arc::new(MockRepository {
            fail_on_status: true,
            ..Default::default()
        });

        let refresh = service(
            MockCountrySource {
                countries: vec![raw("Aland", 1000, &["EUR"])],
                fail: false,
            },
            MockRateSource {
                rates: [("EUR".to_string(), dec!(0.92))].into_iter().collect(),
                fail: false,
            },
            repository.clone(),
            dir.path(),
        );

        let summary = refresh.refresh().await.unwrap();
        assert_eq!(summary.upserted, 1);
        assert!(!dir.path().join("summary.png").exists());
    }
}
