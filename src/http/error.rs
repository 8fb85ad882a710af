//! HTTP error handling and response mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::services::refresh::RefreshError;
use crate::upstream::FetchError;

/// Application error type for HTTP handlers.
///
/// The response bodies are part of the wire contract consumed by the
/// front-end and by refresh automation, so each variant maps to a fixed
/// JSON shape.
#[derive(Debug)]
pub enum AppError {
    /// Bad or missing refresh credential
    Unauthorized,
    /// Refresh attempted inside the cooldown window
    Cooldown { next_allowed_in_ms: u64 },
    /// Upstream failure on a pass-through endpoint
    Upstream { message: &'static str },
}

impl AppError {
    /// Wrap an upstream failure with the endpoint's fixed public message,
    /// logging the detail (the caller never sees it).
    pub fn upstream(message: &'static str, err: FetchError) -> Self {
        error!(error = %err, "{message}");
        AppError::Upstream { message }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "ok": false, "error": "unauthorized" }),
            ),
            AppError::Cooldown { next_allowed_in_ms } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "ok": false,
                    "reason": "cooldown",
                    "next_allowed_in_ms": next_allowed_in_ms,
                }),
            ),
            AppError::Upstream { message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<RefreshError> for AppError {
    fn from(err: RefreshError) -> Self {
        match err {
            RefreshError::Unauthorized => AppError::Unauthorized,
            RefreshError::Cooldown { remaining_ms } => AppError::Cooldown {
                next_allowed_in_ms: remaining_ms,
            },
        }
    }
}
