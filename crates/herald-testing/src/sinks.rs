//! In-memory message sinks.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use herald_core::{HeraldError, Message, MessageSink, Result};

/// One message handed to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Endpoint URL the message was addressed to.
    pub endpoint: String,
    /// The message.
    pub message: Message,
}

/// Sink that records deliveries and can be told to fail for some endpoints.
///
/// Clones share the same record, so a test can keep one handle while the
/// dispatcher owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    delivered: Arc<Mutex<Vec<Delivery>>>,
    failing: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl RecordingSink {
    /// Creates a sink that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every delivery to `endpoint` fail with a server error.
    #[must_use]
    pub fn failing_on(self, endpoint: impl Into<String>) -> Self {
        self.failing.lock().unwrap_or_else(PoisonError::into_inner).push(endpoint.into());
        self
    }

    /// Makes every delivery take `delay` before it is recorded.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Successful deliveries, in order.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.delivered.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Endpoints of successful deliveries, in order.
    pub fn endpoints(&self) -> Vec<String> {
        self.deliveries().into_iter().map(|d| d.endpoint).collect()
    }

    /// Number of successful deliveries.
    pub fn count(&self) -> usize {
        self.delivered.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn deliver(&self, endpoint: &str, message: &Message) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let fails = self.failing.lock().unwrap_or_else(PoisonError::into_inner).iter().any(|f| f == endpoint);
        if fails {
            return Err(HeraldError::HttpServerError { status: 500 });
        }
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Delivery { endpoint: endpoint.to_owned(), message: message.clone() });
        Ok(())
    }
}
