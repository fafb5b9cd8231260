use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use econatlas_core::countries::{CountryService, UniformMultiplier};
use econatlas_core::refresh::RefreshService;
use econatlas_core::summary::SummaryRenderer;
use econatlas_sources::{
    CountrySource, OpenErApiClient, RateSource, RestCountriesClient,
};
use econatlas_storage_sqlite::countries::CountryRepository;
use econatlas_storage_sqlite::db;

pub struct AppState {
    pub country_service: Arc<CountryService>,
    pub refresh_service: Arc<RefreshService>,
    /// Well-known location of the summary image artifact.
    pub summary_path: PathBuf,
}

pub fn init_tracing() {
    let log_format = std::env::var("EA_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Wire up the pool, repositories and services.
///
/// Storage initialization is deliberately a blocking step here: migrations
/// have finished before this function returns, so the listener never accepts
/// a request against a half-initialized database.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::WriteHandle::spawn((*pool).clone());

    let repository = Arc::new(CountryRepository::new(pool.clone(), writer.clone()));
    let country_service = Arc::new(CountryService::new(repository.clone()));

    let countries_source: Arc<dyn CountrySource> = Arc::new(match &config.countries_url {
        Some(url) => RestCountriesClient::with_endpoint(url),
        None => RestCountriesClient::new(),
    });
    let rates_source: Arc<dyn RateSource> = Arc::new(match &config.rates_url {
        Some(url) => OpenErApiClient::with_endpoint(url),
        None => OpenErApiClient::new(),
    });

    let renderer = SummaryRenderer::new(config.cache_dir.clone());
    let summary_path = renderer.artifact_path();

    let refresh_service = Arc::new(RefreshService::new(
        countries_source,
        rates_source,
        repository,
        Arc::new(UniformMultiplier),
        renderer,
    ));

    Ok(Arc::new(AppState {
        country_service,
        refresh_service,
        summary_path,
    }))
}
