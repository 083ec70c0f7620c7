//! Core routing engine for Herald.
//!
//! Turns one inbound source-control event into zero or more chat messages.
//! The pipeline is leaf-first: the [`format`] registry renders payloads,
//! the [`filter`] evaluator checks rule predicates, the [`matcher`] selects
//! rules in configuration order, and the [`dispatch`] coordinator resolves
//! endpoints, formats and delivers, counting successful deliveries.
//!
//! Transport concerns stay outside this crate. Delivery is reached through
//! the [`MessageSink`] trait and endpoint lookup through
//! [`EndpointResolver`], so the whole pipeline runs in tests without
//! network or process environment.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builtin;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod format;
pub mod matcher;
pub mod models;
pub mod rules;

pub use dispatch::{Dispatcher, EndpointResolver, EnvResolver, MessageSink, StaticResolver};
pub use error::{HeraldError, Result};
pub use format::{FormatOptions, FormatterId};
pub use models::{
    ActionOutcome, DispatchResult, Embed, EmbedField, EmbedFooter, Event, Message, OutcomeStatus,
    SkipReason, PING_EVENT,
};
pub use rules::{Action, Filter, FilterSet, FormatterRef, Rule, RuleSet, WorkflowsConfig};
