//! GitHub webhook receiver.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use bytes::Bytes;
use herald_core::Event;
use tracing::{error, info, instrument, warn, Instrument, Span};

use super::{ErrorResponse, MessageResponse};
use crate::{source::parse_payload, AppState};

/// Header carrying the GitHub event kind.
pub const EVENT_HEADER: &str = "X-GitHub-Event";

/// Receives one GitHub event, routes it and reports how many actions were
/// delivered.
///
/// The body is validated before the kind is inspected, so a `ping` without
/// a payload is still a bad request. Once dispatch starts it runs to the
/// end even if the caller goes away.
#[instrument(name = "receive_webhook", skip_all, fields(event_kind, body_size = body.len()))]
pub async fn receive_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let Some(kind) = headers
        .get(EVENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
    else {
        warn!("Rejected webhook without event kind");
        return ErrorResponse::with_status(StatusCode::BAD_REQUEST, "Missing X-GitHub-Event header");
    };
    Span::current().record("event_kind", kind);

    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error_code = e.code(), error = %e, "Rejected webhook body");
            return ErrorResponse::with_status(StatusCode::BAD_REQUEST, "No data received");
        },
    };

    let event = Event::new(kind, payload);
    if event.is_ping() {
        info!("Ping received");
        return MessageResponse::ok("Pong!");
    }

    // The cycle runs on its own task so a dropped connection cannot cut it
    // short after some actions have been delivered.
    let rules = state.rules.snapshot().await;
    let dispatcher = Arc::clone(&state.dispatcher);
    let cycle = tokio::spawn(
        async move {
            let result = dispatcher.dispatch(&event, &rules).await;
            (event, result)
        }
        .instrument(Span::current()),
    );

    let (event, result) = match cycle.await {
        Ok(finished) => finished,
        Err(e) => {
            error!(error = %e, "Dispatch cycle aborted");
            return ErrorResponse::with_status(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        },
    };

    info!(
        action = event.action().unwrap_or_default(),
        triggered = result.triggered_count,
        failed = result.failed_count(),
        "Processed event"
    );

    MessageResponse::ok(format!("Processed event. Triggered {} actions.", result.triggered_count))
}
