//! Error types and result handling for event routing.
//!
//! Defines a coded error taxonomy covering inbound validation, rule
//! configuration and outbound delivery. Codes are stable so operators can
//! grep logs for a class of failure without parsing messages.

use thiserror::Error;

/// Result type alias using `HeraldError`.
pub type Result<T> = std::result::Result<T, HeraldError>;

/// Herald error types with codes.
#[derive(Debug, Error)]
pub enum HeraldError {
    // Input Errors (E1001-E1003)
    /// Request carried no event kind header (E1001).
    #[error("[E1001] Missing event kind: X-GitHub-Event header not present")]
    MissingEventKind,

    /// Request or replay file carried no event data (E1002).
    #[error("[E1002] Missing payload: no event data received")]
    MissingPayload,

    /// Payload was present but is not usable JSON (E1003).
    #[error("[E1003] Invalid payload: {reason}")]
    InvalidPayload {
        /// Why the payload was rejected
        reason: String,
    },

    // Configuration Errors (E2001-E2004)
    /// Action names a formatter that is not registered (E2001).
    #[error("[E2001] Unknown formatter: `{id}` is not registered")]
    UnknownFormatter {
        /// The formatter identifier as written in configuration
        id: String,
    },

    /// A single rule failed validation (E2003).
    #[error("[E2003] Invalid rule `{rule}`: {reason}")]
    InvalidRule {
        /// Name of the offending rule
        rule: String,
        /// What is wrong with it
        reason: String,
    },

    /// The rule set as a whole could not be loaded (E2004).
    #[error("[E2004] Invalid rule set: {reason}")]
    InvalidRuleSet {
        /// Why loading failed
        reason: String,
    },

    // Delivery Errors (E3001-E3004)
    /// Target endpoint could not be reached (E3001).
    #[error("[E3001] Connection failed: {message}")]
    ConnectionFailed {
        /// Transport error description
        message: String,
    },

    /// Delivery exceeded the per-request timeout (E3002).
    #[error("[E3002] Delivery timeout: exceeded {timeout_ms}ms")]
    DeliveryTimeout {
        /// Timeout duration that was exceeded in milliseconds
        timeout_ms: u64,
    },

    /// HTTP 4xx from the chat endpoint (E3003).
    #[error("[E3003] HTTP client error: {status} response from endpoint")]
    HttpClientError {
        /// HTTP status code returned by the endpoint
        status: u16,
    },

    /// HTTP 5xx from the chat endpoint (E3004).
    #[error("[E3004] HTTP server error: {status} response from endpoint")]
    HttpServerError {
        /// HTTP status code returned by the endpoint
        status: u16,
    },

    /// Generic error for wrapping other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HeraldError {
    /// Creates an invalid payload error.
    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        Self::InvalidPayload { reason: reason.into() }
    }

    /// Creates an invalid rule error.
    pub fn invalid_rule(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRule { rule: rule.into(), reason: reason.into() }
    }

    /// Returns the error code (E1001-E3004).
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingEventKind => "E1001",
            Self::MissingPayload => "E1002",
            Self::InvalidPayload { .. } => "E1003",
            Self::UnknownFormatter { .. } => "E2001",
            Self::InvalidRule { .. } => "E2003",
            Self::InvalidRuleSet { .. } => "E2004",
            Self::ConnectionFailed { .. } => "E3001",
            Self::DeliveryTimeout { .. } => "E3002",
            Self::HttpClientError { .. } => "E3003",
            Self::HttpServerError { .. } => "E3004",
            Self::Other(_) => "E9999",
        }
    }
}
