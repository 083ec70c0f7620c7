//! Filter evaluation against inbound events.
//!
//! Every filter reads one event-derived value and compares it with the
//! configured expectation. When the payload lacks the object a filter needs
//! (a `branch_equals` on an event without a ref, `is_prerelease` on a
//! non-release) the filter fails closed and reports no match.

use serde_json::Value;

use crate::{
    models::Event,
    rules::{Filter, FilterSet},
};

const BRANCH_PREFIX: &str = "refs/heads/";

/// Returns true when every filter in the set holds for the event.
pub fn matches(filters: &FilterSet, event: &Event) -> bool {
    filters.iter().all(|filter| filter.matches(event))
}

impl Filter {
    /// Evaluates this filter against an event.
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::ActionEquals(expected) => event.action() == Some(expected.as_str()),
            Self::IsDraft(expected) => draft_flag(event) == Some(*expected),
            Self::IsPrerelease(expected) => prerelease_flag(event) == Some(*expected),
            Self::BranchEquals(expected) => branch(event).is_some_and(|b| b == *expected),
            Self::BranchNotEquals(excluded) => branch(event).is_some_and(|b| b != *excluded),
            Self::LabelsIncludeAny(wanted) => labels(event).is_some_and(|present| {
                let wanted: Vec<String> = wanted.iter().map(|w| w.to_lowercase()).collect();
                present.iter().any(|label| wanted.contains(&label.to_lowercase()))
            }),
        }
    }
}

/// Draft flag of the release (release events) or pull request (all others).
fn draft_flag(event: &Event) -> Option<bool> {
    let subject = if event.kind() == "release" { "release" } else { "pull_request" };
    flag(event.payload().get(subject)?, "draft")
}

fn prerelease_flag(event: &Event) -> Option<bool> {
    flag(event.payload().get("release")?, "prerelease")
}

/// Reads a boolean flag from a present object; an absent flag reads false.
fn flag(object: &Value, name: &str) -> Option<bool> {
    if !object.is_object() {
        return None;
    }
    match object.get(name) {
        None | Some(Value::Null) => Some(false),
        Some(value) => value.as_bool(),
    }
}

/// Branch the event concerns.
///
/// Pushes report their ref with `refs/heads/` stripped, so a tag push reads
/// as its full `refs/tags/...` ref and differs from every branch name. Pull
/// requests report their target branch, releases the commitish they were
/// cut from.
pub(crate) fn branch(event: &Event) -> Option<String> {
    let payload = event.payload();
    match event.kind() {
        "push" | "create" | "delete" => {
            let reference = payload.get("ref")?.as_str()?;
            Some(reference.strip_prefix(BRANCH_PREFIX).unwrap_or(reference).to_owned())
        },
        "release" => payload.pointer("/release/target_commitish")?.as_str().map(str::to_owned),
        _ => payload.pointer("/pull_request/base/ref")?.as_str().map(str::to_owned),
    }
}

/// Label names on the issue or pull request.
fn labels(event: &Event) -> Option<Vec<String>> {
    let payload = event.payload();
    let subject = payload
        .get("issue")
        .filter(|v| v.is_object())
        .or_else(|| payload.get("pull_request").filter(|v| v.is_object()))?;

    let names = match subject.get("labels") {
        Some(Value::Array(labels)) => labels
            .iter()
            .filter_map(|label| match label {
                Value::String(name) => Some(name.clone()),
                other => other.get("name").and_then(Value::as_str).map(str::to_owned),
            })
            .collect(),
        _ => Vec::new(),
    };
    Some(names)
}
