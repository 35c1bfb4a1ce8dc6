//! Errors returned by the HTTP handlers.
//!
//! Every error renders as `{"error": {"code": ..., "message": ...}}` with the
//! matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::GelrssError;

/// Handler error.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No feed is configured under this id.
    #[error("Configuration not found for: {0}")]
    UnknownFeed(String),

    /// The feed exists but no document has been produced yet.
    #[error("No RSS content available for: {0}")]
    NoContent(String),

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnknownFeed(_) | ApiError::NoContent(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::UnknownFeed(_) => "UNKNOWN_FEED",
            ApiError::NoContent(_) => "NO_CONTENT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<GelrssError> for ApiError {
    fn from(err: GelrssError) -> Self {
        tracing::error!("Internal error: {}", err);
        ApiError::Internal(err.to_string())
    }
}
