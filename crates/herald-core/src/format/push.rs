//! Push formatters.

use serde_json::Value;
use tracing::debug;

use super::payload::{login, parse, present, repo_name, Commit, PushEvent};
use crate::models::Message;

struct Parts {
    pusher: String,
    branch: String,
    repo: String,
    commits: Vec<Commit>,
}

fn parts(payload: &Value) -> Option<Parts> {
    let event: PushEvent = parse(payload, "push")?;
    let commits = event.commits.unwrap_or_default();
    if commits.is_empty() {
        debug!("Skipping push without commits");
        return None;
    }

    let reference = event.reference.unwrap_or_default();
    let branch = reference.strip_prefix("refs/heads/").unwrap_or(&reference).to_owned();

    Some(Parts {
        pusher: login(event.sender),
        branch,
        repo: repo_name(event.repository).unwrap_or_else(|| "unknown".to_owned()),
        commits,
    })
}

/// First line of a commit message.
fn headline(commit: &Commit) -> &str {
    commit.message.as_deref().and_then(|m| m.lines().next()).unwrap_or_default()
}

pub(super) fn detailed(payload: &Value) -> Message {
    let Some(Parts { pusher, branch, repo, commits }) = parts(payload) else {
        return Message::empty();
    };

    // GitHub lists commits oldest first.
    let Some(latest) = commits.last() else {
        return Message::empty();
    };
    let message = headline(latest);

    let content = if commits.len() == 1 {
        let url = present(latest.url.clone()).unwrap_or_default();
        format!("🔨 **{pusher}** pushed to `{branch}` in `{repo}`: [{message}]({url})")
    } else {
        format!(
            "🔨 **{pusher}** pushed {} commits to `{branch}` in `{repo}` (latest: {message})",
            commits.len()
        )
    };

    Message::content(content)
}

pub(super) fn simple(payload: &Value) -> Message {
    let Some(Parts { pusher, branch, repo, commits }) = parts(payload) else {
        return Message::empty();
    };

    let noun = if commits.len() == 1 { "commit" } else { "commits" };
    Message::content(format!(
        "🔨 **{pusher}** pushed {} {noun} to `{branch}` in `{repo}`",
        commits.len()
    ))
}
