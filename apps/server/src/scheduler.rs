//! Background scheduler for periodic refresh.
//!
//! Runs a fixed 6-hour interval refresh so the dataset stays current even
//! when nobody calls the refresh endpoint.

use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use crate::main_lib::AppState;

/// Refresh interval: 6 hours (not user-configurable to keep the two
/// upstream feeds within polite usage).
const REFRESH_INTERVAL_SECS: u64 = 6 * 60 * 60;

/// Initial delay before the first refresh (lets the server fully start).
const INITIAL_DELAY_SECS: u64 = 60;

/// Starts the background refresh scheduler.
pub fn start_refresh_scheduler(state: Arc<AppState>) {
    tokio::spawn(async move {
        info!("background refresh scheduler started (6-hour interval)");

        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        // First tick fires immediately, subsequent ticks are 6h apart.
        let mut refresh_interval = interval(Duration::from_secs(REFRESH_INTERVAL_SECS));

        loop {
            refresh_interval.tick().await;
            match state.refresh_service.refresh().await {
                Ok(summary) => {
                    info!(
                        "scheduled refresh completed: {} countries upserted",
                        summary.upserted
                    );
                }
                Err(e) => {
                    warn!("scheduled refresh failed: {}", e);
                }
            }
        }
    });
}
