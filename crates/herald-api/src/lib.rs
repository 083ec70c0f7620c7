//! Herald HTTP API.
//!
//! Exposes `POST /webhook` and `GET /health`, loads service configuration
//! and rule files, and replays a single event from disk for CI runs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use herald_core::Dispatcher;

pub mod config;
pub mod handlers;
pub mod rules;
pub mod server;
pub mod source;

pub use config::Config;
pub use rules::{load_rules, RuleSource, RuleStore};
pub use server::{create_router, start_server};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Current rule set snapshot holder.
    pub rules: RuleStore,
    /// Routes events to chat endpoints.
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Creates application state.
    pub fn new(rules: RuleStore, dispatcher: Dispatcher) -> Self {
        Self { rules, dispatcher: Arc::new(dispatcher) }
    }
}
