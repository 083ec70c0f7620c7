//! GitHub payload builders for deterministic tests.
//!
//! Each builder starts from a realistic payload for its event family and
//! lets a test override only what it cares about. `build()` returns the raw
//! JSON; `event()` wraps it in an [`Event`] of the matching kind.

use herald_core::Event;
use serde_json::{json, Value};

/// Repository every fixture reports.
pub const REPOSITORY: &str = "acme/widgets";

/// Login every fixture reports as sender.
pub const SENDER: &str = "octocat";

fn repository() -> Value {
    json!({"full_name": REPOSITORY, "html_url": format!("https://github.com/{REPOSITORY}")})
}

fn sender() -> Value {
    json!({"login": SENDER})
}

fn label_objects(labels: &[String]) -> Value {
    labels.iter().map(|name| json!({"name": name})).collect()
}

/// Payload of a `ping` delivery.
pub fn ping() -> Value {
    json!({"zen": "Design for failure.", "hook_id": 1, "repository": repository()})
}

/// Builder for `pull_request` payloads.
#[derive(Debug, Clone)]
pub struct PullRequestBuilder {
    action: String,
    number: u64,
    title: String,
    body: Option<String>,
    draft: bool,
    head: String,
    base: String,
    labels: Vec<String>,
}

impl Default for PullRequestBuilder {
    fn default() -> Self {
        Self {
            action: "opened".to_owned(),
            number: 42,
            title: "Add webhook routing".to_owned(),
            body: Some("Routes events by rule.".to_owned()),
            draft: false,
            head: "feature/routing".to_owned(),
            base: "main".to_owned(),
            labels: Vec::new(),
        }
    }
}

impl PullRequestBuilder {
    /// Creates an opened, non-draft pull request against `main`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the payload action.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    /// Sets the pull request number.
    #[must_use]
    pub fn number(mut self, number: u64) -> Self {
        self.number = number;
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets or clears the body.
    #[must_use]
    pub fn body(mut self, body: Option<&str>) -> Self {
        self.body = body.map(str::to_owned);
        self
    }

    /// Marks the pull request as draft.
    #[must_use]
    pub fn draft(mut self, draft: bool) -> Self {
        self.draft = draft;
        self
    }

    /// Sets the target branch.
    #[must_use]
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Adds a label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Builds the payload.
    pub fn build(self) -> Value {
        json!({
            "action": self.action,
            "number": self.number,
            "pull_request": {
                "number": self.number,
                "title": self.title,
                "html_url": format!("https://github.com/{REPOSITORY}/pull/{}", self.number),
                "body": self.body,
                "draft": self.draft,
                "head": {"ref": self.head},
                "base": {"ref": self.base},
                "labels": label_objects(&self.labels),
                "created_at": "2024-06-01T09:30:00Z"
            },
            "repository": repository(),
            "sender": sender()
        })
    }

    /// Builds a `pull_request` event.
    pub fn event(self) -> Event {
        Event::new("pull_request", self.build())
    }
}

/// Builder for `issues` payloads.
#[derive(Debug, Clone)]
pub struct IssueBuilder {
    action: String,
    number: u64,
    title: String,
    body: Option<String>,
    labels: Vec<String>,
    is_pull_request: bool,
}

impl Default for IssueBuilder {
    fn default() -> Self {
        Self {
            action: "opened".to_owned(),
            number: 7,
            title: "Crash when config is empty".to_owned(),
            body: Some("Steps to reproduce attached.".to_owned()),
            labels: Vec::new(),
            is_pull_request: false,
        }
    }
}

impl IssueBuilder {
    /// Creates an opened issue without labels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the payload action.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets or clears the body.
    #[must_use]
    pub fn body(mut self, body: Option<&str>) -> Self {
        self.body = body.map(str::to_owned);
        self
    }

    /// Adds a label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Makes the issue a pull request seen through the issues API.
    #[must_use]
    pub fn pull_request(mut self) -> Self {
        self.is_pull_request = true;
        self
    }

    /// Builds the payload.
    pub fn build(self) -> Value {
        let mut issue = json!({
            "number": self.number,
            "title": self.title,
            "html_url": format!("https://github.com/{REPOSITORY}/issues/{}", self.number),
            "body": self.body,
            "labels": label_objects(&self.labels)
        });
        if self.is_pull_request {
            issue["pull_request"] =
                json!({"url": format!("https://api.github.com/repos/{REPOSITORY}/pulls/{}", self.number)});
        }
        json!({
            "action": self.action,
            "issue": issue,
            "repository": repository(),
            "sender": sender()
        })
    }

    /// Builds an `issues` event.
    pub fn event(self) -> Event {
        Event::new("issues", self.build())
    }
}

/// Builder for `push` payloads.
#[derive(Debug, Clone)]
pub struct PushBuilder {
    reference: String,
    commits: Vec<String>,
}

impl Default for PushBuilder {
    fn default() -> Self {
        Self { reference: "refs/heads/main".to_owned(), commits: vec!["Fix flaky test".to_owned()] }
    }
}

impl PushBuilder {
    /// Creates a one-commit push to `main`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes to the given branch.
    #[must_use]
    pub fn branch(mut self, branch: &str) -> Self {
        self.reference = format!("refs/heads/{branch}");
        self
    }

    /// Pushes a tag instead of a branch.
    #[must_use]
    pub fn tag(mut self, tag: &str) -> Self {
        self.reference = format!("refs/tags/{tag}");
        self
    }

    /// Replaces the commit list, oldest first.
    #[must_use]
    pub fn commits<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commits = messages.into_iter().map(Into::into).collect();
        self
    }

    /// Builds the payload.
    pub fn build(self) -> Value {
        let commits: Vec<Value> = self
            .commits
            .iter()
            .enumerate()
            .map(|(i, message)| {
                json!({
                    "id": format!("{i:040x}"),
                    "message": message,
                    "url": format!("https://github.com/{REPOSITORY}/commit/{i:040x}")
                })
            })
            .collect();
        json!({
            "ref": self.reference,
            "commits": commits,
            "repository": repository(),
            "sender": sender()
        })
    }

    /// Builds a `push` event.
    pub fn event(self) -> Event {
        Event::new("push", self.build())
    }
}

/// Builder for `release` payloads.
#[derive(Debug, Clone)]
pub struct ReleaseBuilder {
    tag: String,
    name: Option<String>,
    body: Option<String>,
    draft: bool,
    prerelease: bool,
    target_commitish: String,
}

impl Default for ReleaseBuilder {
    fn default() -> Self {
        Self {
            tag: "v1.0.0".to_owned(),
            name: Some("First stable".to_owned()),
            body: Some("Everything works.".to_owned()),
            draft: false,
            prerelease: false,
            target_commitish: "main".to_owned(),
        }
    }
}

impl ReleaseBuilder {
    /// Creates a published stable release.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Sets or clears the release name.
    #[must_use]
    pub fn name(mut self, name: Option<&str>) -> Self {
        self.name = name.map(str::to_owned);
        self
    }

    /// Sets or clears the release notes.
    #[must_use]
    pub fn body(mut self, body: Option<&str>) -> Self {
        self.body = body.map(str::to_owned);
        self
    }

    /// Marks the release as draft.
    #[must_use]
    pub fn draft(mut self, draft: bool) -> Self {
        self.draft = draft;
        self
    }

    /// Marks the release as prerelease.
    #[must_use]
    pub fn prerelease(mut self, prerelease: bool) -> Self {
        self.prerelease = prerelease;
        self
    }

    /// Builds the payload.
    pub fn build(self) -> Value {
        json!({
            "action": "published",
            "release": {
                "tag_name": self.tag,
                "name": self.name,
                "html_url": format!("https://github.com/{REPOSITORY}/releases/tag/{}", self.tag),
                "body": self.body,
                "draft": self.draft,
                "prerelease": self.prerelease,
                "target_commitish": self.target_commitish
            },
            "repository": repository(),
            "sender": sender()
        })
    }

    /// Builds a `release` event.
    pub fn event(self) -> Event {
        Event::new("release", self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_produce_expected_kinds() {
        assert_eq!(PullRequestBuilder::new().event().kind(), "pull_request");
        assert_eq!(IssueBuilder::new().event().kind(), "issues");
        assert_eq!(PushBuilder::new().event().kind(), "push");
        assert_eq!(ReleaseBuilder::new().event().kind(), "release");
    }

    #[test]
    fn push_commits_are_ordered_oldest_first() {
        let payload = PushBuilder::new().commits(["one", "two"]).build();
        assert_eq!(payload["commits"][1]["message"], "two");
        assert_eq!(payload["ref"], "refs/heads/main");
    }

    #[test]
    fn issue_can_masquerade_as_pull_request() {
        let payload = IssueBuilder::new().pull_request().build();
        assert!(payload["issue"]["pull_request"].is_object());
    }
}
