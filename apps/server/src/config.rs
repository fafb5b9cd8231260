//! Environment configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Runtime configuration, read once at startup.
///
/// | Variable           | Default        | Meaning                            |
/// |--------------------|----------------|------------------------------------|
/// | `EA_DB_PATH`       | `econatlas.db` | SQLite database file               |
/// | `EA_PORT`          | `3000`         | HTTP listening port                |
/// | `EA_CACHE_DIR`     | `cache`        | Directory for the summary image    |
/// | `EA_COUNTRIES_URL` | production URL | Country directory endpoint override|
/// | `EA_RATES_URL`     | production URL | Exchange rate endpoint override    |
/// | `EA_LOG_FORMAT`    | `text`         | `text` or `json` log output        |
/// | `RUST_LOG`         | `info`         | Tracing filter                     |
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub listen_addr: SocketAddr,
    pub cache_dir: PathBuf,
    /// When unset the production restcountries.com endpoint is used.
    pub countries_url: Option<String>,
    /// When unset the production open.er-api.com endpoint is used.
    pub rates_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env_or("EA_DB_PATH", "econatlas.db");
        let port = std::env::var("EA_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);
        let cache_dir = PathBuf::from(env_or("EA_CACHE_DIR", "cache"));

        Self {
            db_path,
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            cache_dir,
            countries_url: std::env::var("EA_COUNTRIES_URL").ok(),
            rates_url: std::env::var("EA_RATES_URL").ok(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
