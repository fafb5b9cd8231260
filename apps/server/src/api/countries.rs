use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;
use econatlas_core::countries::{CountryFilters, CountrySort, NormalizedCountry};

#[derive(Deserialize)]
struct ListQuery {
    region: Option<String>,
    currency: Option<String>,
    sort: Option<String>,
}

#[derive(Serialize)]
struct RefreshResponse {
    message: &'static str,
    total_upserted: usize,
}

/// Run one refresh cycle. 503 when an upstream source is down, 500 for
/// anything else (see `ApiError`).
async fn refresh_countries(State(state): State<Arc<AppState>>) -> ApiResult<Json<RefreshResponse>> {
    let summary = state.refresh_service.refresh().await?;
    Ok(Json(RefreshResponse {
        message: "Countries data refreshed successfully",
        total_upserted: summary.upserted,
    }))
}

async fn list_countries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<NormalizedCountry>>> {
    // An empty query value means "no filter", same as leaving it out.
    let filters = CountryFilters {
        region: query.region.filter(|value| !value.is_empty()),
        currency: query.currency.filter(|value| !value.is_empty()),
    };
    // Unrecognized sort values are ignored rather than rejected.
    let sort = query.sort.as_deref().and_then(CountrySort::parse);
    let countries = state.country_service.get_countries(&filters, sort)?;
    Ok(Json(countries))
}

async fn get_country(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<NormalizedCountry>> {
    let country = state
        .country_service
        .get_country(&name)?
        .ok_or_else(|| ApiError::not_found("Country not found"))?;
    Ok(Json(country))
}

async fn delete_country(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if state.country_service.delete_country(&name).await? {
        Ok(Json(json!({ "message": "Country deleted successfully" })))
    } else {
        Err(ApiError::not_found("Country not found"))
    }
}

/// Stream the cached summary artifact; 404 until the first refresh has
/// rendered one.
async fn summary_image(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    match tokio::fs::read(&state.summary_path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response()),
        Err(_) => Err(ApiError::not_found("Summary image not found")),
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/countries/refresh", post(refresh_countries))
        .route("/countries", get(list_countries))
        .route("/countries/image", get(summary_image))
        .route("/countries/{name}", get(get_country).delete(delete_country))
}
