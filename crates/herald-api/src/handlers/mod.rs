//! HTTP request handlers.
//!
//! Every body Herald answers with is a small JSON object: `{message}` for
//! success and `{error}` for anything else.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

pub mod health;
pub mod webhook;

pub use health::health_check;
pub use webhook::receive_webhook;

/// Body of a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable reason.
    pub error: String,
}

impl ErrorResponse {
    /// Pairs an error body with its status.
    pub fn with_status(status: StatusCode, error: impl Into<String>) -> Response {
        (status, Json(Self { error: error.into() })).into_response()
    }
}

/// Body of an accepted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// 200 response with the given message.
    pub fn ok(message: impl Into<String>) -> Response {
        (StatusCode::OK, Json(Self { message: message.into() })).into_response()
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> Response {
    warn!("Request for unknown route");
    ErrorResponse::with_status(
        StatusCode::NOT_FOUND,
        "Not found. Use POST /webhook for GitHub events or GET /health for health check.",
    )
}

/// Converts a handler panic into a generic 500.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "Handler panicked");

    ErrorResponse::with_status(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}
