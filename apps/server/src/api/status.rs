use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::error::ApiResult;
use crate::main_lib::AppState;
use econatlas_core::countries::StatusSnapshot;

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "EconAtlas country data API is running",
        "documentation": "Check README for API usage guidelines",
    }))
}

async fn get_status(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatusSnapshot>> {
    let status = state.country_service.get_status()?;
    Ok(Json(status))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/status", get(get_status))
}
