//! Error types for songhive-server
//!
//! Storage and parsing failures are never shown to clients: they are logged
//! here and replaced by the endpoint's generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Keyed lookup found nothing (404)
    #[error("{0}")]
    NotFound(String),

    /// Request is missing required data (400)
    #[error("{0}")]
    InvalidRequest(String),

    /// Resource already exists (409)
    #[error("{0}")]
    Conflict(String),

    /// Credentials rejected (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Storage or request parsing failure (500)
    #[error("{context}: {source:#}")]
    OperationFailed {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "message": msg })),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            ApiError::OperationFailed { context, source } => {
                error!("{}: {:#}", context, source);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": context }))
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Turn any failure into [`ApiError::OperationFailed`] with a client-safe message
pub trait OrFail<T> {
    fn or_fail(self, context: &str) -> ApiResult<T>;
}

impl<T, E> OrFail<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn or_fail(self, context: &str) -> ApiResult<T> {
        self.map_err(|e| ApiError::OperationFailed {
            context: context.to_string(),
            source: e.into(),
        })
    }
}
