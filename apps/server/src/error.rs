//! Mapping from core errors onto the HTTP wire contract.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use econatlas_core::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Handler-level error.
///
/// Source failures are an upstream dependency problem and surface as 503
/// with the upstream detail; everything else internal surfaces as a bare
/// 500 with the cause logged, never leaked. Missing resources are ordinary
/// 404s, not error-log material.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Core(#[from] Error),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Core(Error::Source(source)) => {
                tracing::warn!("external source unavailable: {}", source);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({
                        "error": "External data source unavailable",
                        "details": source.to_string(),
                    })),
                )
                    .into_response()
            }
            ApiError::Core(err) => {
                tracing::error!("request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
