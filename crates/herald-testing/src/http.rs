//! Discord webhook stand-in for delivery tests.

use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use serde_json::Value;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Mock Discord server. Every webhook lives under `/api/webhooks/{name}`.
pub struct DiscordMock {
    server: MockServer,
}

impl DiscordMock {
    /// Starts a new mock server on a random port.
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    /// Returns the base URL of the mock server.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Path of the named webhook.
    pub fn webhook_path(name: &str) -> String {
        format!("/api/webhooks/{name}")
    }

    /// Full URL of the named webhook.
    pub fn webhook_url(&self, name: &str) -> String {
        format!("{}{}", self.server.uri(), Self::webhook_path(name))
    }

    /// Configures a webhook to return a specific response.
    pub async fn mock_endpoint(&self, endpoint: MockEndpoint) {
        let response = match endpoint.response {
            MockResponse::Success { status, body } => ResponseTemplate::new(status.as_u16()).set_body_bytes(body),
            MockResponse::Failure { status } => ResponseTemplate::new(status.as_u16()),
            MockResponse::Delayed { delay } => ResponseTemplate::new(StatusCode::NO_CONTENT.as_u16()).set_delay(delay),
        };

        Mock::given(method("POST"))
            .and(path(Self::webhook_path(&endpoint.name)))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Accepts every message posted to the named webhook.
    pub async fn accept(&self, name: &str) {
        self.mock_endpoint(MockEndpoint::success(name)).await;
    }

    /// Rejects every message posted to the named webhook with `status`.
    pub async fn reject(&self, name: &str, status: StatusCode) {
        self.mock_endpoint(MockEndpoint::failure(name, status)).await;
    }

    /// JSON bodies posted to the named webhook, in arrival order.
    pub async fn messages_for(&self, name: &str) -> Vec<Value> {
        let wanted = Self::webhook_path(name);
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == wanted)
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }

    /// Asserts that exactly n requests were received across all webhooks.
    pub async fn assert_request_count(&self, expected: usize) {
        let received = self.server.received_requests().await.unwrap_or_default().len();
        assert_eq!(received, expected, "Expected {expected} requests, received {received}");
    }
}

/// Configuration for a mock webhook.
pub struct MockEndpoint {
    /// Webhook name under `/api/webhooks/`.
    pub name: String,
    /// Response to return.
    pub response: MockResponse,
}

impl MockEndpoint {
    /// A webhook answering 204 like Discord does.
    pub fn success(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            response: MockResponse::Success { status: StatusCode::NO_CONTENT, body: Bytes::new() },
        }
    }

    /// A webhook answering with a failure status.
    pub fn failure(name: impl Into<String>, status: StatusCode) -> Self {
        Self { name: name.into(), response: MockResponse::Failure { status } }
    }

    /// A webhook that answers only after `delay`.
    pub fn delayed(name: impl Into<String>, delay: Duration) -> Self {
        Self { name: name.into(), response: MockResponse::Delayed { delay } }
    }
}

/// Types of mock responses.
pub enum MockResponse {
    /// Accept with the given status and body.
    Success {
        /// Status code
        status: StatusCode,
        /// Response body
        body: Bytes,
    },
    /// Reject with the given status.
    Failure {
        /// Status code
        status: StatusCode,
    },
    /// Accept, but only after a delay.
    Delayed {
        /// Time to wait before answering
        delay: Duration,
    },
}
