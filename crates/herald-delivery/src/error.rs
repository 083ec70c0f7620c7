//! Error types for webhook delivery.
//!
//! Every failed attempt is categorized so logs can tell an unreachable
//! host from a rejected message. Conversion into [`HeraldError`] keeps the
//! coded taxonomy intact when errors cross into the dispatch coordinator.

use herald_core::HeraldError;
use thiserror::Error;

/// Result type alias for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Delivery failure kinds.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// Network-level connectivity failure.
    #[error("network connection failed: {message}")]
    NetworkError {
        /// Error message describing the network failure
        message: String,
    },

    /// HTTP request timeout exceeded.
    #[error("request timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout that was exceeded in milliseconds
        timeout_ms: u64,
    },

    /// Endpoint rejected the message (4xx, including 429).
    #[error("client error: HTTP {status_code}")]
    ClientError {
        /// HTTP status code (4xx)
        status_code: u16,
        /// Response body content
        body: String,
    },

    /// Endpoint failed while handling the message (5xx).
    #[error("server error: HTTP {status_code}")]
    ServerError {
        /// HTTP status code (5xx)
        status_code: u16,
        /// Response body content
        body: String,
    },

    /// Status outside the 2xx, 4xx and 5xx ranges.
    #[error("unexpected status: HTTP {status_code}")]
    UnexpectedStatus {
        /// HTTP status code
        status_code: u16,
    },

    /// Invalid client configuration.
    #[error("invalid delivery configuration: {message}")]
    ConfigurationError {
        /// Configuration error message
        message: String,
    },
}

impl DeliveryError {
    /// Creates a network error from a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError { message: message.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout { timeout_ms }
    }

    /// Creates a client error from an HTTP response.
    pub fn client_error(status_code: u16, body: impl Into<String>) -> Self {
        Self::ClientError { status_code, body: body.into() }
    }

    /// Creates a server error from an HTTP response.
    pub fn server_error(status_code: u16, body: impl Into<String>) -> Self {
        Self::ServerError { status_code, body: body.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError { message: message.into() }
    }
}

impl From<DeliveryError> for HeraldError {
    fn from(error: DeliveryError) -> Self {
        match error {
            DeliveryError::NetworkError { message } => Self::ConnectionFailed { message },
            DeliveryError::Timeout { timeout_ms } => Self::DeliveryTimeout { timeout_ms },
            DeliveryError::ClientError { status_code, .. } => Self::HttpClientError { status: status_code },
            DeliveryError::ServerError { status_code, .. } => Self::HttpServerError { status: status_code },
            DeliveryError::UnexpectedStatus { status_code } => Self::HttpClientError { status: status_code },
            e @ DeliveryError::ConfigurationError { .. } => Self::Other(e.into()),
        }
    }
}
