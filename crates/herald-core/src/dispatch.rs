//! Dispatch coordinator.
//!
//! Runs one event through a rule set: selects matching rules, then for
//! every action resolves the endpoint, renders the message and hands it to
//! the sink. Actions run one after another in configuration order so
//! messages land in the order operators declared them. Nothing that goes
//! wrong for one action affects another; the coordinator never fails.

use std::{collections::HashMap, env, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::Result,
    format::FormatOptions,
    matcher,
    models::{ActionOutcome, DispatchResult, Event, Message, OutcomeStatus, SkipReason},
    rules::{Action, FormatterRef, Rule, RuleSet},
};

/// Delivers rendered messages to a chat endpoint.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Delivers one message to the endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns a delivery error when the endpoint cannot be reached or
    /// rejects the message.
    async fn deliver(&self, endpoint: &str, message: &Message) -> Result<()>;
}

/// Resolves an endpoint reference to a concrete URL.
pub trait EndpointResolver: Send + Sync {
    /// Returns the URL for `name`, or `None` when it is not configured.
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Resolves endpoint references through process environment variables.
///
/// Variables set to an empty or blank string count as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvResolver;

impl EndpointResolver for EnvResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.trim().is_empty())
    }
}

/// Resolves endpoint references from a fixed map.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    endpoints: HashMap<String, String>,
}

impl StaticResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an endpoint.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.endpoints.insert(name.into(), url.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticResolver {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { endpoints: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

impl EndpointResolver for StaticResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        self.endpoints.get(name).filter(|value| !value.trim().is_empty()).cloned()
    }
}

/// Routes events to sinks according to a rule set.
#[derive(Clone)]
pub struct Dispatcher {
    sink: Arc<dyn MessageSink>,
    resolver: Arc<dyn EndpointResolver>,
}

impl Dispatcher {
    /// Creates a dispatcher over a sink and an endpoint resolver.
    pub fn new(sink: Arc<dyn MessageSink>, resolver: Arc<dyn EndpointResolver>) -> Self {
        Self { sink, resolver }
    }

    /// Runs one dispatch cycle.
    ///
    /// Ping events never reach any rule. The returned count covers only
    /// actions whose message was delivered.
    #[instrument(name = "dispatch", skip_all, fields(event_kind = %event.kind(), action = ?event.action()))]
    pub async fn dispatch(&self, event: &Event, rules: &RuleSet) -> DispatchResult {
        let mut result = DispatchResult::default();

        let matched = matcher::select(rules, event);
        if matched.is_empty() {
            debug!("No rules matched");
            return result;
        }

        for rule in matched {
            debug!(rule = %rule.name, actions = rule.actions.len(), "Rule matched");
            for action in &rule.actions {
                let status = self.run_action(event, rule, action).await;
                result.record(ActionOutcome {
                    rule: rule.name.clone(),
                    endpoint_ref: action.endpoint_ref.clone(),
                    status,
                });
            }
        }

        info!(
            triggered = result.triggered_count,
            failed = result.failed_count(),
            attempted = result.outcomes.len(),
            "Dispatch complete"
        );
        result
    }

    async fn run_action(&self, event: &Event, rule: &Rule, action: &Action) -> OutcomeStatus {
        let Some(url) = self.resolver.resolve(&action.endpoint_ref) else {
            warn!(rule = %rule.name, endpoint_ref = %action.endpoint_ref, "Endpoint not configured; skipping action");
            return OutcomeStatus::Skipped(SkipReason::UnresolvedEndpoint);
        };

        let formatter = match &action.formatter {
            FormatterRef::Registered(id) => *id,
            FormatterRef::Unregistered(id) => {
                warn!(rule = %rule.name, formatter = %id, "Unknown formatter; skipping action");
                return OutcomeStatus::Skipped(SkipReason::UnknownFormatter);
            },
        };

        let options = FormatOptions { include_drafts: rule.include_drafts };
        let message = formatter.render(event.payload(), options);
        if message.is_empty() {
            debug!(rule = %rule.name, formatter = %formatter, "Formatter produced no message");
            return OutcomeStatus::Skipped(SkipReason::EmptyMessage);
        }

        match self.sink.deliver(&url, &message).await {
            Ok(()) => {
                info!(rule = %rule.name, endpoint_ref = %action.endpoint_ref, formatter = %formatter, "Message delivered");
                OutcomeStatus::Delivered
            },
            Err(e) => {
                warn!(
                    rule = %rule.name,
                    endpoint_ref = %action.endpoint_ref,
                    error_code = e.code(),
                    error = %e,
                    "Delivery failed"
                );
                OutcomeStatus::Failed(e.to_string())
            },
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}
