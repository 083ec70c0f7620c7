//! Event source adapter.
//!
//! Normalizes the two ways an event reaches Herald, an HTTP delivery and a
//! one-shot replay of a payload file in CI, into the same [`Event`].

use std::{fs, path::Path};

use anyhow::{Context, Result};
use herald_core::{DispatchResult, Dispatcher, Event, HeraldError, RuleSet};
use serde_json::Value;
use tracing::{info, instrument};

/// Parses a raw request or file body into an event payload.
///
/// Only a non-empty JSON object counts as event data.
///
/// # Errors
///
/// Returns `MissingPayload` for an empty body and `InvalidPayload` for
/// anything that is not a non-empty JSON object.
pub fn parse_payload(body: &[u8]) -> herald_core::Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(HeraldError::MissingPayload);
    }

    let payload: Value = serde_json::from_slice(body).map_err(|e| HeraldError::invalid_payload(e.to_string()))?;

    match payload.as_object() {
        Some(map) if !map.is_empty() => Ok(payload),
        Some(_) => Err(HeraldError::invalid_payload("payload is an empty object")),
        None => Err(HeraldError::invalid_payload("payload is not a JSON object")),
    }
}

/// Builds the event to replay from the CI-provided kind and payload path.
///
/// # Errors
///
/// Fails when either input is missing, the file cannot be read, or its
/// contents are not a non-empty JSON object.
pub fn replay_event(kind: Option<&str>, path: Option<&Path>) -> Result<Event> {
    let kind = kind.map(str::trim).filter(|k| !k.is_empty()).ok_or(HeraldError::MissingEventKind)?;
    let path = path.filter(|p| !p.as_os_str().is_empty()).ok_or(HeraldError::MissingPayload)?;

    let body = fs::read(path).with_context(|| format!("Failed to read event payload {}", path.display()))?;
    let payload = parse_payload(&body).with_context(|| format!("Invalid event payload in {}", path.display()))?;

    Ok(Event::new(kind, payload))
}

/// Runs a single dispatch cycle for a replayed event.
#[instrument(name = "replay", skip_all, fields(event_kind = %event.kind()))]
pub async fn run_once(event: &Event, rules: &RuleSet, dispatcher: &Dispatcher) -> DispatchResult {
    if event.is_ping() {
        info!("Ping event replayed; nothing to route");
        return DispatchResult::default();
    }

    let result = dispatcher.dispatch(event, rules).await;
    info!(triggered = result.triggered_count, failed = result.failed_count(), "Processed replayed event");
    result
}
