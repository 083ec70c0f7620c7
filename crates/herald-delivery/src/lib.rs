//! Outbound delivery of rendered messages to Discord webhooks.
//!
//! [`DeliveryClient`] wraps a pooled `reqwest` client with a per-request
//! timeout and implements [`herald_core::MessageSink`], so the dispatch
//! coordinator can hand it messages without knowing about HTTP. Each call
//! is a single attempt: a transport fault, a timeout or a non-2xx status is
//! reported as a categorized [`DeliveryError`] and never retried here.
//!
//! # Example
//!
//! ```no_run
//! use herald_core::Message;
//! use herald_delivery::{ClientConfig, DeliveryClient, DeliveryError};
//!
//! # async fn example() -> std::result::Result<(), DeliveryError> {
//! let client = DeliveryClient::new(ClientConfig::default())?;
//! client.deliver("https://discord.com/api/webhooks/1/token", &Message::content("hello")).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;

pub use client::{ClientConfig, DeliveryClient, DeliveryResponse, DiscordPayload};
pub use error::{DeliveryError, Result};

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
