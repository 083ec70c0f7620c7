//! Test infrastructure for Herald.
//!
//! Provides GitHub payload builders, in-memory message sinks and a
//! wiremock-backed stand-in for Discord so routing can be exercised end to
//! end without network access or process environment.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod fixtures;
pub mod http;
pub mod sinks;

pub use fixtures::{IssueBuilder, PullRequestBuilder, PushBuilder, ReleaseBuilder};
pub use http::{DiscordMock, MockEndpoint, MockResponse};
pub use sinks::{Delivery, RecordingSink};
