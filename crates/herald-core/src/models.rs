//! Core domain models for one dispatch cycle.
//!
//! Defines the inbound [`Event`], the outbound [`Message`] with its Discord
//! style [`Embed`], and the [`DispatchResult`] summarizing what happened to
//! every action a cycle touched.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event kind GitHub sends when a webhook is first registered.
pub const PING_EVENT: &str = "ping";

/// One inbound notification from the source-control platform.
///
/// Immutable once constructed. The `action` is lifted out of the payload's
/// top-level `action` string so filters and log lines do not have to dig
/// for it.
///
/// # Example
///
/// ```
/// use herald_core::models::Event;
/// use serde_json::json;
///
/// let event = Event::new("pull_request", json!({"action": "opened"}));
/// assert_eq!(event.action(), Some("opened"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    kind: String,
    action: Option<String>,
    payload: Value,
}

impl Event {
    /// Creates an event from its kind and raw payload.
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        let action = payload.get("action").and_then(Value::as_str).map(str::to_owned);
        Self { kind: kind.into(), action, payload }
    }

    /// Event family, e.g. `pull_request` or `push`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The payload's `action` field, if any.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Raw event payload.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Whether this is a liveness ping rather than a routable event.
    pub fn is_ping(&self) -> bool {
        self.kind == PING_EVENT
    }
}

/// A rendered chat message.
///
/// At least one of `content` and `embed` must be set for the message to be
/// delivered; an empty message means "nothing to say".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Plain markdown content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Rich embed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
}

impl Message {
    /// The empty message.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A message with plain content only.
    pub fn content(content: impl Into<String>) -> Self {
        Self { content: Some(content.into()), embed: None }
    }

    /// A message with an embed only.
    pub fn embed(embed: Embed) -> Self {
        Self { content: None, embed: Some(embed) }
    }

    /// Whether there is nothing to deliver.
    pub fn is_empty(&self) -> bool {
        self.content.as_deref().map_or(true, str::is_empty) && self.embed.is_none()
    }
}

/// Rich embed in the shape Discord webhooks accept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    /// Embed title.
    pub title: String,
    /// Link the title points at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sidebar color as `0xRRGGBB`.
    pub color: u32,
    /// Name/value pairs rendered under the description.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    /// Footer line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    /// ISO 8601 timestamp shown next to the footer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// One embed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    /// Field label.
    pub name: String,
    /// Field value.
    pub value: String,
    /// Whether Discord may lay this field out side by side with others.
    pub inline: bool,
}

impl EmbedField {
    /// Creates an inline field.
    pub fn inline(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into(), inline: true }
    }

    /// Creates a full-width field.
    pub fn block(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into(), inline: false }
    }
}

/// Embed footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    /// Footer text.
    pub text: String,
}

impl EmbedFooter {
    /// Creates a footer.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Why an action produced no delivery without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The endpoint reference had no value.
    UnresolvedEndpoint,
    /// The action names a formatter that is not registered.
    UnknownFormatter,
    /// The formatter had nothing to say about this payload.
    EmptyMessage,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedEndpoint => write!(f, "unresolved_endpoint"),
            Self::UnknownFormatter => write!(f, "unknown_formatter"),
            Self::EmptyMessage => write!(f, "empty_message"),
        }
    }
}

/// What happened to a single action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Message delivered.
    Delivered,
    /// Action skipped; not an error.
    Skipped(SkipReason),
    /// Delivery attempted and failed.
    Failed(String),
}

/// Outcome of one action within a dispatch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Name of the rule that owns the action.
    pub rule: String,
    /// Endpoint reference the action targets.
    pub endpoint_ref: String,
    /// Result of running the action.
    pub status: OutcomeStatus,
}

/// Summary of one dispatch cycle.
///
/// `triggered_count` is the only externally visible result; `outcomes`
/// lists every action in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// Actions that produced a message and delivered it.
    pub triggered_count: usize,
    /// Per-action outcomes in the order they ran.
    pub outcomes: Vec<ActionOutcome>,
}

impl DispatchResult {
    /// Records an outcome, counting it if it was delivered.
    pub fn record(&mut self, outcome: ActionOutcome) {
        if outcome.status == OutcomeStatus::Delivered {
            self.triggered_count += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Number of actions whose delivery failed.
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o.status, OutcomeStatus::Failed(_))).count()
    }

    /// Number of actions skipped for the given reason.
    pub fn skipped_count(&self, reason: SkipReason) -> usize {
        self.outcomes.iter().filter(|o| o.status == OutcomeStatus::Skipped(reason)).count()
    }
}
