//! Issue formatters.

use serde_json::Value;
use tracing::{debug, warn};

use super::{
    payload::{login, parse, present, repo_name, Issue, IssuesEvent},
    title_case, truncate, ISSUE_BODY_LIMIT,
};
use crate::models::{Embed, EmbedField, EmbedFooter, Message};

const COLOR: u32 = 0xe74c3c;

fn emoji(action: &str) -> &'static str {
    match action {
        "closed" => "✅",
        "reopened" => "↩️",
        "labeled" => "🏷️",
        _ => "🚨",
    }
}

struct Parts {
    action: String,
    issue: Issue,
    title: String,
    repo: String,
    reporter: String,
}

fn parts(payload: &Value) -> Option<Parts> {
    let event: IssuesEvent = parse(payload, "issues")?;
    let issue = event.issue.unwrap_or_default();

    // GitHub reports pull request comments and labels through the issues API too.
    if issue.pull_request.is_some() {
        debug!("Skipping pull request delivered as an issue");
        return None;
    }

    let (Some(title), Some(repo)) = (present(issue.title.clone()), repo_name(event.repository)) else {
        warn!("Issue event missing title or repository name");
        return None;
    };

    Some(Parts {
        action: present(event.action).unwrap_or_else(|| "unknown".to_owned()),
        reporter: login(event.sender),
        issue,
        title,
        repo,
    })
}

pub(super) fn detailed(payload: &Value) -> Message {
    let Some(Parts { action, issue, title, repo, reporter }) = parts(payload) else {
        return Message::empty();
    };

    let labels: Vec<String> = issue
        .labels
        .unwrap_or_default()
        .into_iter()
        .filter_map(|label| present(label.name))
        .collect();

    let mut fields =
        vec![EmbedField::inline("Repository", repo), EmbedField::inline("Reporter", reporter)];
    if !labels.is_empty() {
        fields.push(EmbedField::block("Labels", labels.join(", ")));
    }

    let footer = issue.number.map_or_else(|| "Issue".to_owned(), |n| format!("Issue #{n}"));

    Message::embed(Embed {
        title: format!("{} Issue {}: {title}", emoji(&action), title_case(&action)),
        url: present(issue.html_url),
        description: present(issue.body).map(|body| truncate(&body, ISSUE_BODY_LIMIT)),
        color: COLOR,
        fields,
        footer: Some(EmbedFooter::new(footer)),
        timestamp: None,
    })
}

pub(super) fn simple(payload: &Value) -> Message {
    let Some(Parts { action, issue, title, repo, reporter }) = parts(payload) else {
        return Message::empty();
    };

    let number = issue.number.map_or_else(String::new, |n| format!(" #{n}"));
    let link = match present(issue.html_url) {
        Some(url) => format!("[{title}]({url})"),
        None => title,
    };

    Message::content(format!(
        "{} **{reporter}** {} issue{number} in `{repo}`: {link}",
        emoji(&action),
        action.replace('_', " ")
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(labels: Value) -> Value {
        json!({
            "action": "opened",
            "issue": {
                "number": 7,
                "title": "Crash on start",
                "html_url": "https://github.com/acme/app/issues/7",
                "body": "Stack trace attached.",
                "labels": labels
            },
            "repository": {"full_name": "acme/app"},
            "sender": {"login": "reporter"}
        })
    }

    #[test]
    fn detailed_embed_lists_labels() {
        let embed = detailed(&payload(json!([{"name": "bug"}, {"name": "urgent"}]))).embed.unwrap();

        assert_eq!(embed.title, "🚨 Issue Opened: Crash on start");
        assert_eq!(embed.color, 0xe74c3c);
        assert_eq!(embed.fields, vec![
            EmbedField::inline("Repository", "acme/app"),
            EmbedField::inline("Reporter", "reporter"),
            EmbedField::block("Labels", "bug, urgent"),
        ]);
        assert_eq!(embed.footer, Some(EmbedFooter::new("Issue #7")));
    }

    #[test]
    fn label_field_is_omitted_without_labels() {
        let embed = detailed(&payload(json!([]))).embed.unwrap();
        assert_eq!(embed.fields.len(), 2);

        let mut p = payload(json!(null));
        p["issue"].as_object_mut().unwrap().remove("labels");
        assert_eq!(detailed(&p).embed.unwrap().fields.len(), 2);
    }

    #[test]
    fn pull_requests_disguised_as_issues_are_ignored() {
        let mut p = payload(json!([]));
        p["issue"]["pull_request"] = json!({"url": "https://api.github.com/repos/acme/app/pulls/7"});
        assert!(detailed(&p).is_empty());
        assert!(simple(&p).is_empty());
    }

    #[test]
    fn labeled_action_uses_tag_emoji() {
        let mut p = payload(json!([{"name": "bug"}]));
        p["action"] = json!("labeled");
        assert_eq!(detailed(&p).embed.unwrap().title, "🏷️ Issue Labeled: Crash on start");
    }

    #[test]
    fn body_is_capped_at_five_hundred_characters() {
        let mut p = payload(json!([]));
        p["issue"]["body"] = json!("b".repeat(501));
        let description = detailed(&p).embed.unwrap().description.unwrap();
        assert_eq!(description, format!("{}...", "b".repeat(500)));
    }

    #[test]
    fn simple_variant_links_the_issue() {
        assert_eq!(
            simple(&payload(json!([]))).content.as_deref(),
            Some("🚨 **reporter** opened issue #7 in `acme/app`: [Crash on start](https://github.com/acme/app/issues/7)")
        );
    }
}
