//! Built-in routing used when no rules file is configured.
//!
//! Three channels: development chatter, alerts for the main branch and
//! release announcements. Each is addressed by an environment variable so
//! a deployment that leaves one unset simply drops that channel.

use crate::{
    format::FormatterId,
    rules::{Filter, Rule, RuleSet},
};

/// Variable holding the development channel webhook.
pub const DEV_ENDPOINT: &str = "DISCORD_WEBHOOK_DEV";

/// Variable holding the alerts channel webhook.
pub const ALERTS_ENDPOINT: &str = "DISCORD_WEBHOOK_ALERTS";

/// Variable holding the announcements channel webhook.
pub const ANNOUNCEMENTS_ENDPOINT: &str = "DISCORD_WEBHOOK_ANNOUNCEMENTS";

const MAIN_BRANCH: &str = "main";

/// The default rule set.
pub fn rules() -> RuleSet {
    RuleSet::new(vec![
        Rule::new("Pull requests", "pull_request").action(DEV_ENDPOINT, FormatterId::PrDetailed),
        Rule::new("Issues", "issues").action(DEV_ENDPOINT, FormatterId::IssueDetailed),
        Rule::new("Pushes to main", "push")
            .filter(Filter::BranchEquals(MAIN_BRANCH.to_owned()))
            .action(ALERTS_ENDPOINT, FormatterId::PushDetailed),
        Rule::new("Pushes to other branches", "push")
            .filter(Filter::BranchNotEquals(MAIN_BRANCH.to_owned()))
            .action(DEV_ENDPOINT, FormatterId::PushDetailed),
        Rule::new("Releases", "release")
            .filter(Filter::IsPrerelease(false))
            .action(ANNOUNCEMENTS_ENDPOINT, FormatterId::ReleaseDetailed),
        Rule::new("Pre-releases", "release")
            .filter(Filter::IsPrerelease(true))
            .action(DEV_ENDPOINT, FormatterId::ReleaseSimple),
    ])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{matcher, models::Event};

    fn endpoints(event: &Event) -> Vec<String> {
        matcher::select(&rules(), event)
            .into_iter()
            .flat_map(|rule| rule.actions.iter().map(|a| a.endpoint_ref.clone()))
            .collect()
    }

    #[test]
    fn pushes_split_on_main() {
        let main = Event::new("push", json!({"ref": "refs/heads/main", "commits": [{}]}));
        assert_eq!(endpoints(&main), vec![ALERTS_ENDPOINT]);

        let feature = Event::new("push", json!({"ref": "refs/heads/feature/x", "commits": [{}]}));
        assert_eq!(endpoints(&feature), vec![DEV_ENDPOINT]);
    }

    #[test]
    fn tag_pushes_go_to_dev() {
        let tag = Event::new("push", json!({"ref": "refs/tags/v1.0.0", "commits": [{}]}));
        assert_eq!(endpoints(&tag), vec![DEV_ENDPOINT]);
    }

    #[test]
    fn releases_split_on_prerelease_flag() {
        let stable = Event::new("release", json!({"release": {"prerelease": false}}));
        assert_eq!(endpoints(&stable), vec![ANNOUNCEMENTS_ENDPOINT]);

        let pre = Event::new("release", json!({"release": {"prerelease": true}}));
        assert_eq!(endpoints(&pre), vec![DEV_ENDPOINT]);
    }

    #[test]
    fn pull_requests_and_issues_go_to_dev() {
        assert_eq!(endpoints(&Event::new("pull_request", json!({}))), vec![DEV_ENDPOINT]);
        assert_eq!(endpoints(&Event::new("issues", json!({}))), vec![DEV_ENDPOINT]);
        assert!(endpoints(&Event::new("ping", json!({}))).is_empty());
    }
}
