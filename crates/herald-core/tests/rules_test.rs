//! Integration tests for loading persisted rule configuration.

use herald_core::{
    builtin,
    rules::{Filter, FormatterRef, WorkflowsConfig},
    FormatterId, HeraldError, RuleSet,
};
use serde_json::json;

fn load(value: serde_json::Value) -> herald_core::Result<RuleSet> {
    let config: WorkflowsConfig = serde_json::from_value(value).map_err(|e| HeraldError::InvalidRuleSet {
        reason: e.to_string(),
    })?;
    RuleSet::from_config(config)
}

#[test]
fn full_workflow_file_loads_in_order() {
    let rules = load(json!({
        "workflows": [
            {
                "name": "Main pushes",
                "event": "push",
                "filters": {"branch_equals": "main"},
                "actions": [{"webhook_env": "ALERTS", "format": "push_detailed"}]
            },
            {
                "name": "Stable releases",
                "event": "release",
                "filters": {"is_prerelease": false, "is_draft": false},
                "actions": [
                    {"webhook_env": "ANNOUNCE", "format": "release_detailed"},
                    {"webhook_env": "DEV", "format": "release_simple"}
                ]
            },
            {
                "name": "Draft PRs",
                "event": "pull_request",
                "include_drafts": true,
                "actions": [{"webhook_env": "DEV", "format": "pr_simple"}]
            }
        ]
    }))
    .unwrap();

    let names: Vec<&str> = rules.rules().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Main pushes", "Stable releases", "Draft PRs"]);
    assert_eq!(rules.rules()[1].actions.len(), 2);
    assert!(rules.rules()[2].include_drafts);
    assert!(rules.rules()[2].filters.is_empty());
    assert_eq!(
        rules.rules()[0].filters.iter().collect::<Vec<_>>(),
        vec![&Filter::BranchEquals("main".into())]
    );
}

#[test]
fn empty_label_list_is_rejected() {
    let error = load(json!({
        "workflows": [{
            "name": "labels",
            "event": "issues",
            "filters": {"labels_include_any": []},
            "actions": [{"webhook_env": "DEV", "format": "issue_detailed"}]
        }]
    }))
    .unwrap_err();
    assert_eq!(error.code(), "E2003");
}

#[test]
fn rules_without_actions_or_for_ping_are_rejected() {
    let no_actions = load(json!({"workflows": [{"name": "idle", "event": "push"}]})).unwrap_err();
    assert!(no_actions.to_string().contains("at least one action"));

    let ping = load(json!({
        "workflows": [{
            "name": "pong",
            "event": "ping",
            "actions": [{"webhook_env": "DEV", "format": "pr_simple"}]
        }]
    }))
    .unwrap_err();
    assert!(ping.to_string().contains("ping"));
}

#[test]
fn unknown_filter_key_fails_the_whole_load() {
    let error = load(json!({
        "workflows": [{
            "name": "typo",
            "event": "push",
            "filters": {"branch_equal": "main"},
            "actions": [{"webhook_env": "DEV", "format": "push_detailed"}]
        }]
    }))
    .unwrap_err();
    assert_eq!(error.code(), "E2004");
}

#[test]
fn unknown_formatter_survives_loading() {
    let rules = load(json!({
        "workflows": [{
            "name": "fancy",
            "event": "push",
            "actions": [{"webhook_env": "DEV", "format": "ascii_art"}]
        }]
    }))
    .unwrap();
    assert_eq!(rules.rules()[0].actions[0].formatter, FormatterRef::Unregistered("ascii_art".into()));
}

#[test]
fn builtin_rules_cover_every_family() {
    let rules = builtin::rules();
    assert_eq!(rules.len(), 6);
    for family in ["pull_request", "issues", "push", "release"] {
        assert!(rules.rules().iter().any(|r| r.event_kind == family), "no rule for {family}");
    }
    assert!(rules
        .rules()
        .iter()
        .flat_map(|r| &r.actions)
        .all(|a| matches!(a.formatter, FormatterRef::Registered(_))));
    assert_eq!(rules.rules()[5].actions[0].formatter, FormatterRef::Registered(FormatterId::ReleaseSimple));
}
