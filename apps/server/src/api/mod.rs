use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::main_lib::AppState;

pub mod countries;
pub mod status;

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(countries::router())
        .merge(status::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
