//! HTTP client for Discord webhook delivery with a configurable timeout.
//!
//! Serializes a [`Message`] into the Discord webhook body, posts it once and
//! categorizes the response. Webhook URLs embed a secret token, so they are
//! never written to logs.

use std::time::Duration;

use async_trait::async_trait;
use herald_core::{Embed, Message, MessageSink};
use reqwest::Response;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn, Instrument};

use crate::{
    error::{DeliveryError, Result},
    DEFAULT_TIMEOUT_SECONDS,
};

/// Response bodies longer than this are cut before they reach an error.
const MAX_ERROR_BODY_SIZE: usize = 1024;

/// Configuration for the delivery client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Timeout for one delivery request.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            user_agent: format!("Herald/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Body of a Discord webhook execution.
///
/// Discord accepts up to ten embeds per message; Herald sends at most one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscordPayload<'a> {
    /// Plain message content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<&'a str>,
    /// Rich embeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<[&'a Embed; 1]>,
}

impl<'a> From<&'a Message> for DiscordPayload<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            content: message.content.as_deref().filter(|c| !c.is_empty()),
            embeds: message.embed.as_ref().map(|embed| [embed]),
        }
    }
}

/// Pooled HTTP client for Discord webhooks.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    client: reqwest::Client,
    config: ClientConfig,
}

/// Response from a successful delivery.
#[derive(Debug, Clone)]
pub struct DeliveryResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Total duration of the request.
    pub duration: Duration,
}

impl DeliveryClient {
    /// Creates a new delivery client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::ConfigurationError` if the HTTP client cannot
    /// be configured with the provided settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| DeliveryError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Creates a new delivery client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Posts one message to a webhook URL.
    ///
    /// # Errors
    ///
    /// Returns categorized delivery errors:
    /// - `Timeout` when the request exceeds the configured timeout
    /// - `NetworkError` for connection and other transport failures
    /// - `ClientError` for 4xx responses, rate limiting included
    /// - `ServerError` for 5xx responses
    pub async fn deliver(&self, url: &str, message: &Message) -> Result<DeliveryResponse> {
        let start_time = std::time::Instant::now();
        let body = DiscordPayload::from(message);

        let span = info_span!(
            "discord_delivery",
            has_content = body.content.is_some(),
            has_embed = body.embeds.is_some()
        );

        async move {
            debug!("Starting delivery");

            let response = match self.client.post(url).json(&body).send().await {
                Ok(response) => response,
                Err(e) => {
                    let duration = start_time.elapsed();
                    // reqwest errors carry the URL; strip it before logging.
                    let e = e.without_url();
                    warn!(duration_ms = duration.as_millis(), error = %e, "Request failed");

                    if e.is_timeout() {
                        return Err(DeliveryError::timeout(duration_millis(self.config.timeout)));
                    }
                    if e.is_connect() {
                        return Err(DeliveryError::network(format!("connection failed: {e}")));
                    }
                    return Err(DeliveryError::network(e.to_string()));
                },
            };

            let duration = start_time.elapsed();
            let status_code = response.status().as_u16();
            debug!(status = status_code, duration_ms = duration.as_millis(), "Received response");

            match status_code {
                200..=299 => {
                    debug!("Message delivered");
                    Ok(DeliveryResponse { status_code, duration })
                },
                400..=499 => {
                    let body = read_body(response).await;
                    warn!(status = status_code, body = %body, "Client error response");
                    Err(DeliveryError::client_error(status_code, body))
                },
                500..=599 => {
                    let body = read_body(response).await;
                    warn!(status = status_code, "Server error response");
                    Err(DeliveryError::server_error(status_code, body))
                },
                _ => {
                    warn!(status = status_code, "Unexpected status code");
                    Err(DeliveryError::UnexpectedStatus { status_code })
                },
            }
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl MessageSink for DeliveryClient {
    async fn deliver(&self, endpoint: &str, message: &Message) -> herald_core::Result<()> {
        DeliveryClient::deliver(self, endpoint, message).await?;
        Ok(())
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Reads a response body for error reporting, capped in size.
async fn read_body(response: Response) -> String {
    match response.bytes().await {
        Ok(bytes) if bytes.len() > MAX_ERROR_BODY_SIZE => {
            let truncated = String::from_utf8_lossy(&bytes[..MAX_ERROR_BODY_SIZE]);
            format!("{truncated}... (truncated)")
        },
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!(error = %e.without_url(), "Failed to read response body");
            String::new()
        },
    }
}

#[cfg(test)]
mod tests {
    use herald_core::{EmbedField, EmbedFooter, HeraldError};
    use serde_json::json;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn content_message_serializes_without_embeds() {
        let message = Message::content("🔨 pushed");
        let body = serde_json::to_value(DiscordPayload::from(&message)).unwrap();
        assert_eq!(body, json!({"content": "🔨 pushed"}));
    }

    #[test]
    fn embed_message_serializes_as_single_element_list() {
        let message = Message::embed(Embed {
            title: "🚀 New Release: v1".into(),
            color: 0xf1c40f,
            fields: vec![EmbedField::inline("Tag", "v1")],
            footer: Some(EmbedFooter::new("Release Notes")),
            ..Embed::default()
        });
        let body = serde_json::to_value(DiscordPayload::from(&message)).unwrap();
        assert_eq!(
            body,
            json!({
                "embeds": [{
                    "title": "🚀 New Release: v1",
                    "color": 0xf1c40f,
                    "fields": [{"name": "Tag", "value": "v1", "inline": true}],
                    "footer": {"text": "Release Notes"}
                }]
            })
        );
    }

    #[tokio::test]
    async fn successful_delivery() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/api/webhooks/1/token"))
            .and(matchers::header("content-type", "application/json"))
            .and(matchers::body_json(json!({"content": "hello"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = DeliveryClient::with_defaults().unwrap();
        let url = format!("{}/api/webhooks/1/token", mock_server.uri());

        let response = client.deliver(&url, &Message::content("hello")).await.unwrap();
        assert_eq!(response.status_code, 204);
    }

    #[tokio::test]
    async fn client_error_keeps_response_body() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message": "Unknown Webhook"}"#))
            .mount(&mock_server)
            .await;

        let client = DeliveryClient::with_defaults().unwrap();
        let error = client.deliver(&mock_server.uri(), &Message::content("x")).await.unwrap_err();

        match error {
            DeliveryError::ClientError { status_code, body } => {
                assert_eq!(status_code, 404);
                assert!(body.contains("Unknown Webhook"));
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_categorized() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let client = DeliveryClient::with_defaults().unwrap();
        let error = client.deliver(&mock_server.uri(), &Message::content("x")).await.unwrap_err();
        assert!(matches!(error, DeliveryError::ServerError { status_code: 502, .. }));
    }

    #[tokio::test]
    async fn rate_limit_is_a_client_error() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "1.2"))
            .mount(&mock_server)
            .await;

        let client = DeliveryClient::with_defaults().unwrap();
        let error = client.deliver(&mock_server.uri(), &Message::content("x")).await.unwrap_err();
        assert!(matches!(error, DeliveryError::ClientError { status_code: 429, .. }));
        assert_eq!(HeraldError::from(error).code(), "E3003");
    }

    #[tokio::test]
    async fn sink_converts_failures_into_coded_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = DeliveryClient::with_defaults().unwrap();
        let sink: &dyn MessageSink = &client;
        let error = sink.deliver(&mock_server.uri(), &Message::content("x")).await.unwrap_err();
        assert_eq!(error.code(), "E3004");
    }

    #[test]
    fn default_timeout_is_ten_seconds() {
        assert_eq!(ClientConfig::default().timeout, Duration::from_secs(10));
        assert!(ClientConfig::default().user_agent.starts_with("Herald/"));
    }
}
