//! Formatter registry.
//!
//! Maps a closed set of [`FormatterId`]s to pure functions rendering a
//! GitHub payload into a [`Message`]. Each event family has a `detailed`
//! (embed) and a `simple` (plain content) variant so rule configuration,
//! not the formatter, decides the shape.
//!
//! Formatters never fail. Missing optional fields fall back to safe
//! defaults; a payload without the fields a message cannot exist without
//! renders as the empty message.

mod issue;
mod payload;
mod pull_request;
mod push;
mod release;

use std::{fmt, str::FromStr};

use serde_json::Value;

use crate::{
    error::{HeraldError, Result},
    models::Message,
};

/// Body length cap for issues and pull requests, in characters.
pub const ISSUE_BODY_LIMIT: usize = 500;

/// Body length cap for releases, in characters.
pub const RELEASE_BODY_LIMIT: usize = 1000;

const TRUNCATION_SUFFIX: &str = "...";

/// Per-rule rendering options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Render draft pull requests and releases instead of skipping them.
    pub include_drafts: bool,
}

/// Registered formatters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatterId {
    /// Pull request embed.
    PrDetailed,
    /// Pull request one-liner.
    PrSimple,
    /// Push summary naming the commit message.
    PushDetailed,
    /// Push one-liner with the commit count.
    PushSimple,
    /// Issue embed with labels.
    IssueDetailed,
    /// Issue one-liner.
    IssueSimple,
    /// Release embed with notes.
    ReleaseDetailed,
    /// Release announcement line.
    ReleaseSimple,
}

impl FormatterId {
    /// Every registered formatter.
    pub const ALL: [Self; 8] = [
        Self::PrDetailed,
        Self::PrSimple,
        Self::PushDetailed,
        Self::PushSimple,
        Self::IssueDetailed,
        Self::IssueSimple,
        Self::ReleaseDetailed,
        Self::ReleaseSimple,
    ];

    /// Identifier used in configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrDetailed => "pr_detailed",
            Self::PrSimple => "pr_simple",
            Self::PushDetailed => "push_detailed",
            Self::PushSimple => "push_simple",
            Self::IssueDetailed => "issue_detailed",
            Self::IssueSimple => "issue_simple",
            Self::ReleaseDetailed => "release_detailed",
            Self::ReleaseSimple => "release_simple",
        }
    }

    /// Event kind whose payload this formatter understands.
    pub const fn event_kind(self) -> &'static str {
        match self {
            Self::PrDetailed | Self::PrSimple => "pull_request",
            Self::PushDetailed | Self::PushSimple => "push",
            Self::IssueDetailed | Self::IssueSimple => "issues",
            Self::ReleaseDetailed | Self::ReleaseSimple => "release",
        }
    }

    /// Renders a payload.
    pub fn render(self, payload: &Value, options: FormatOptions) -> Message {
        match self {
            Self::PrDetailed => pull_request::detailed(payload, options),
            Self::PrSimple => pull_request::simple(payload, options),
            Self::PushDetailed => push::detailed(payload),
            Self::PushSimple => push::simple(payload),
            Self::IssueDetailed => issue::detailed(payload),
            Self::IssueSimple => issue::simple(payload),
            Self::ReleaseDetailed => release::detailed(payload, options),
            Self::ReleaseSimple => release::simple(payload, options),
        }
    }
}

impl fmt::Display for FormatterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatterId {
    type Err = HeraldError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pr_detailed" | "pull_request" => Ok(Self::PrDetailed),
            "pr_simple" => Ok(Self::PrSimple),
            "push_detailed" | "push" => Ok(Self::PushDetailed),
            "push_simple" => Ok(Self::PushSimple),
            "issue_detailed" | "issue_priority" | "issues" => Ok(Self::IssueDetailed),
            "issue_simple" => Ok(Self::IssueSimple),
            "release_detailed" | "release" => Ok(Self::ReleaseDetailed),
            "release_simple" => Ok(Self::ReleaseSimple),
            other => Err(HeraldError::UnknownFormatter { id: other.to_owned() }),
        }
    }
}

/// Renders a payload with the formatter registered under `formatter_id`.
///
/// # Errors
///
/// Returns `UnknownFormatter` when nothing is registered under the name.
pub fn format(formatter_id: &str, payload: &Value, options: FormatOptions) -> Result<Message> {
    Ok(formatter_id.parse::<FormatterId>()?.render(payload, options))
}

/// Caps free text at `limit` characters, appending `...` when cut.
pub(crate) fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{TRUNCATION_SUFFIX}", &text[..cut]),
        None => text.to_owned(),
    }
}

/// Title-cases each word the way GitHub action names read in headlines:
/// `ready_for_review` becomes `Ready_For_Review`.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_cased = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_cased = true;
        } else {
            out.push(c);
            previous_cased = false;
        }
    }
    out
}
