//! Integration tests for the Discord delivery client.
//!
//! Tests timeout handling, error categorization and the request body shape
//! against a mock Discord server.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use herald_core::{Embed, EmbedField, HeraldError, Message, MessageSink};
use herald_delivery::{ClientConfig, DeliveryClient, DeliveryError};
use herald_testing::{DiscordMock, MockEndpoint};
use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn delivers_content_message() {
    let discord = DiscordMock::start().await;
    discord.accept("dev").await;

    let client = DeliveryClient::with_defaults().unwrap();
    client.deliver(&discord.webhook_url("dev"), &Message::content("🔨 pushed")).await.unwrap();

    assert_eq!(discord.messages_for("dev").await, vec![json!({"content": "🔨 pushed"})]);
}

#[tokio::test]
async fn delivers_embed_as_embeds_list() {
    let discord = DiscordMock::start().await;
    discord.accept("announcements").await;

    let message = Message::embed(Embed {
        title: "🚀 New Release: v2".into(),
        color: 0xf1c40f,
        fields: vec![EmbedField::inline("Tag", "v2")],
        ..Embed::default()
    });
    let client = DeliveryClient::with_defaults().unwrap();
    client.deliver(&discord.webhook_url("announcements"), &message).await.unwrap();

    let bodies = discord.messages_for("announcements").await;
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].get("content").is_none());
    assert_eq!(bodies[0]["embeds"][0]["title"], "🚀 New Release: v2");
    assert_eq!(bodies[0]["embeds"][0]["fields"][0]["inline"], true);
}

#[tokio::test]
async fn handles_request_timeout() {
    let discord = DiscordMock::start().await;
    discord.mock_endpoint(MockEndpoint::delayed("slow", Duration::from_secs(2))).await;

    let config = ClientConfig { timeout: Duration::from_millis(200), ..ClientConfig::default() };
    let client = DeliveryClient::new(config).unwrap();

    let error = client.deliver(&discord.webhook_url("slow"), &Message::content("x")).await.unwrap_err();

    match error {
        DeliveryError::Timeout { timeout_ms } => assert_eq!(timeout_ms, 200),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn handles_connection_refused() {
    // Nothing listens on the discard port.
    let client = DeliveryClient::new(ClientConfig { timeout: Duration::from_secs(2), ..ClientConfig::default() }).unwrap();

    let error = client.deliver("http://127.0.0.1:9/api/webhooks/x", &Message::content("x")).await.unwrap_err();

    assert!(matches!(error, DeliveryError::NetworkError { .. }));
}

#[tokio::test]
async fn categorizes_status_codes() {
    let discord = DiscordMock::start().await;
    discord.reject("gone", StatusCode::NOT_FOUND).await;
    discord.reject("broken", StatusCode::BAD_GATEWAY).await;
    discord.reject("busy", StatusCode::TOO_MANY_REQUESTS).await;

    let client = DeliveryClient::with_defaults().unwrap();
    let message = Message::content("x");

    let gone = client.deliver(&discord.webhook_url("gone"), &message).await.unwrap_err();
    assert!(matches!(gone, DeliveryError::ClientError { status_code: 404, .. }));

    let broken = client.deliver(&discord.webhook_url("broken"), &message).await.unwrap_err();
    assert!(matches!(broken, DeliveryError::ServerError { status_code: 502, .. }));

    let busy = client.deliver(&discord.webhook_url("busy"), &message).await.unwrap_err();
    assert!(matches!(busy, DeliveryError::ClientError { status_code: 429, .. }));
}

#[tokio::test]
async fn sink_reports_success_and_failure() {
    let discord = DiscordMock::start().await;
    discord.accept("ok").await;
    discord.reject("bad", StatusCode::BAD_REQUEST).await;

    let client = DeliveryClient::with_defaults().unwrap();
    let sink: &dyn MessageSink = &client;

    sink.deliver(&discord.webhook_url("ok"), &Message::content("x")).await.unwrap();
    let error = sink.deliver(&discord.webhook_url("bad"), &Message::content("x")).await.unwrap_err();

    assert!(matches!(error, HeraldError::HttpClientError { status: 400 }));
    assert_eq!(error.code(), "E3003");
    discord.assert_request_count(2).await;
}
