//! Typed views over the GitHub payload fields the formatters read.
//!
//! Every field is optional: GitHub sends `null` liberally and replayed
//! payloads may be hand-written. A payload whose present fields have the
//! wrong type does not deserialize, and the formatter renders nothing.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct Repository {
    pub full_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct User {
    pub login: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct GitRef {
    #[serde(rename = "ref")]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct Label {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct PullRequest {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub html_url: Option<String>,
    pub body: Option<String>,
    pub draft: Option<bool>,
    pub head: Option<GitRef>,
    pub base: Option<GitRef>,
    pub created_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct PullRequestEvent {
    pub action: Option<String>,
    pub pull_request: Option<PullRequest>,
    pub repository: Option<Repository>,
    pub sender: Option<User>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct Issue {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub html_url: Option<String>,
    pub body: Option<String>,
    pub labels: Option<Vec<Label>>,
    /// Present when GitHub reports a pull request through the issues API.
    pub pull_request: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct IssuesEvent {
    pub action: Option<String>,
    pub issue: Option<Issue>,
    pub repository: Option<Repository>,
    pub sender: Option<User>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct Commit {
    pub message: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct PushEvent {
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub commits: Option<Vec<Commit>>,
    pub repository: Option<Repository>,
    pub sender: Option<User>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct Release {
    pub tag_name: Option<String>,
    pub name: Option<String>,
    pub html_url: Option<String>,
    pub body: Option<String>,
    pub draft: Option<bool>,
    pub prerelease: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ReleaseEvent {
    pub release: Option<Release>,
    pub repository: Option<Repository>,
}

/// Deserializes a payload view, logging and yielding `None` on shape errors.
pub(super) fn parse<'a, T: Deserialize<'a>>(payload: &'a Value, family: &'static str) -> Option<T> {
    match T::deserialize(payload) {
        Ok(view) => Some(view),
        Err(e) => {
            debug!(family, error = %e, "Payload does not have the expected shape");
            None
        },
    }
}

/// Keeps a string only if it has visible content.
pub(super) fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

pub(super) fn repo_name(repository: Option<Repository>) -> Option<String> {
    present(repository.and_then(|r| r.full_name))
}

pub(super) fn login(user: Option<User>) -> String {
    present(user.and_then(|u| u.login)).unwrap_or_else(|| "unknown".to_owned())
}
