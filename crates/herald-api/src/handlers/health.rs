//! Health check handler for service monitoring.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::AppState;

/// Health check response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests
    pub status: String,
    /// Timestamp when health check was performed
    pub timestamp: DateTime<Utc>,
    /// Service version information
    pub version: String,
    /// Rules in the active snapshot
    pub rules_loaded: usize,
}

/// Health check endpoint handler.
///
/// Herald has no backing store, so a responding process is a healthy one.
#[instrument(name = "health_check", skip(app_state))]
pub async fn health_check(State(app_state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let rules_loaded = app_state.rules.len().await;
    debug!(rules_loaded, "Health check completed");

    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        rules_loaded,
    };

    (StatusCode::OK, Json(response))
}
