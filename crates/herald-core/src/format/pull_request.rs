//! Pull request formatters.

use serde_json::Value;
use tracing::{debug, warn};

use super::{
    payload::{login, parse, present, repo_name, PullRequest, PullRequestEvent},
    title_case, truncate, FormatOptions, ISSUE_BODY_LIMIT,
};
use crate::models::{Embed, EmbedField, EmbedFooter, Message};

const COLOR: u32 = 0x3498db;

fn emoji(action: &str) -> &'static str {
    match action {
        "closed" => "❌",
        "reopened" => "↩️",
        "ready_for_review" => "✅",
        _ => "🔄",
    }
}

struct Parts {
    action: String,
    pr: PullRequest,
    title: String,
    repo: String,
    author: String,
}

/// Pulls out what both variants need, or explains why there is nothing to say.
fn parts(payload: &Value, options: FormatOptions) -> Option<Parts> {
    let event: PullRequestEvent = parse(payload, "pull_request")?;
    let pr = event.pull_request.unwrap_or_default();

    if pr.draft.unwrap_or(false) && !options.include_drafts {
        debug!("Skipping draft pull request");
        return None;
    }

    let (Some(title), Some(repo)) = (present(pr.title.clone()), repo_name(event.repository)) else {
        warn!("Pull request event missing title or repository name");
        return None;
    };

    Some(Parts {
        action: present(event.action).unwrap_or_else(|| "unknown".to_owned()),
        author: login(event.sender),
        pr,
        title,
        repo,
    })
}

pub(super) fn detailed(payload: &Value, options: FormatOptions) -> Message {
    let Some(Parts { action, pr, title, repo, author }) = parts(payload, options) else {
        return Message::empty();
    };

    let head = pr.head.and_then(|r| present(r.name)).unwrap_or_else(|| "unknown".to_owned());
    let base = pr.base.and_then(|r| present(r.name)).unwrap_or_else(|| "unknown".to_owned());
    let footer = pr.number.map_or_else(|| "Pull Request".to_owned(), |n| format!("PR #{n}"));

    Message::embed(Embed {
        title: format!("{} PR {}: {title}", emoji(&action), title_case(&action)),
        url: present(pr.html_url),
        description: present(pr.body).map(|body| truncate(&body, ISSUE_BODY_LIMIT)),
        color: COLOR,
        fields: vec![
            EmbedField::inline("Repository", repo),
            EmbedField::inline("Branch", format!("`{head}` → `{base}`")),
            EmbedField::inline("Author", author),
        ],
        footer: Some(EmbedFooter::new(footer)),
        timestamp: present(pr.created_at),
    })
}

pub(super) fn simple(payload: &Value, options: FormatOptions) -> Message {
    let Some(Parts { action, pr, title, repo, author }) = parts(payload, options) else {
        return Message::empty();
    };

    let number = pr.number.map_or_else(String::new, |n| format!(" #{n}"));
    let link = match present(pr.html_url) {
        Some(url) => format!("[{title}]({url})"),
        None => title,
    };

    Message::content(format!(
        "{} **{author}** {} PR{number} in `{repo}`: {link}",
        emoji(&action),
        action.replace('_', " ")
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(action: &str, draft: bool) -> Value {
        json!({
            "action": action,
            "pull_request": {
                "number": 42,
                "title": "Add rule engine",
                "html_url": "https://github.com/acme/app/pull/42",
                "body": "Implements routing.",
                "head": {"ref": "feature"},
                "base": {"ref": "main"},
                "draft": draft,
                "created_at": "2024-05-01T12:00:00Z"
            },
            "repository": {"full_name": "acme/app"},
            "sender": {"login": "octocat"}
        })
    }

    #[test]
    fn detailed_embed_carries_title_branch_author_and_number() {
        let message = detailed(&payload("opened", false), FormatOptions::default());
        let embed = message.embed.expect("embed");

        assert_eq!(embed.title, "🔄 PR Opened: Add rule engine");
        assert_eq!(embed.url.as_deref(), Some("https://github.com/acme/app/pull/42"));
        assert_eq!(embed.description.as_deref(), Some("Implements routing."));
        assert_eq!(embed.color, 0x3498db);
        assert_eq!(embed.fields, vec![
            EmbedField::inline("Repository", "acme/app"),
            EmbedField::inline("Branch", "`feature` → `main`"),
            EmbedField::inline("Author", "octocat"),
        ]);
        assert_eq!(embed.footer, Some(EmbedFooter::new("PR #42")));
        assert_eq!(embed.timestamp.as_deref(), Some("2024-05-01T12:00:00Z"));
        assert!(message.content.is_none());
    }

    #[test]
    fn action_selects_emoji() {
        let title = |action| detailed(&payload(action, false), FormatOptions::default()).embed.unwrap().title;
        assert_eq!(title("closed"), "❌ PR Closed: Add rule engine");
        assert_eq!(title("reopened"), "↩️ PR Reopened: Add rule engine");
        assert_eq!(title("ready_for_review"), "✅ PR Ready_For_Review: Add rule engine");
        assert_eq!(title("synchronize"), "🔄 PR Synchronize: Add rule engine");
    }

    #[test]
    fn drafts_are_skipped_unless_requested() {
        assert!(detailed(&payload("opened", true), FormatOptions::default()).is_empty());
        assert!(simple(&payload("opened", true), FormatOptions::default()).is_empty());

        let included = FormatOptions { include_drafts: true };
        assert!(!detailed(&payload("opened", true), included).is_empty());
    }

    #[test]
    fn long_body_is_truncated() {
        let mut p = payload("opened", false);
        p["pull_request"]["body"] = json!("x".repeat(600));
        let description = detailed(&p, FormatOptions::default()).embed.unwrap().description.unwrap();
        assert_eq!(description.chars().count(), 503);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn optional_fields_fall_back() {
        let p = json!({
            "action": "opened",
            "pull_request": {"title": "Bare", "body": null},
            "repository": {"full_name": "acme/app"}
        });
        let embed = detailed(&p, FormatOptions::default()).embed.unwrap();
        assert_eq!(embed.description, None);
        assert_eq!(embed.fields[1].value, "`unknown` → `unknown`");
        assert_eq!(embed.fields[2].value, "unknown");
        assert_eq!(embed.footer, Some(EmbedFooter::new("Pull Request")));
    }

    #[test]
    fn missing_title_or_repository_renders_nothing() {
        let mut p = payload("opened", false);
        p["pull_request"]["title"] = json!(null);
        assert!(detailed(&p, FormatOptions::default()).is_empty());

        let mut p = payload("opened", false);
        p.as_object_mut().unwrap().remove("repository");
        assert!(detailed(&p, FormatOptions::default()).is_empty());
    }

    #[test]
    fn simple_variant_is_one_line() {
        let message = simple(&payload("ready_for_review", false), FormatOptions::default());
        assert_eq!(
            message.content.as_deref(),
            Some("✅ **octocat** ready for review PR #42 in `acme/app`: [Add rule engine](https://github.com/acme/app/pull/42)")
        );
        assert!(message.embed.is_none());
    }
}
