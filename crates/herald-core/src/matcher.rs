//! Rule selection for an inbound event.

use crate::{
    filter,
    models::Event,
    rules::{Rule, RuleSet},
};

/// Selects the rules that apply to an event, preserving configuration order.
///
/// A rule applies when its event kind equals the event's kind and all of its
/// filters hold. Ping events never select anything.
pub fn select<'a>(rules: &'a RuleSet, event: &Event) -> Vec<&'a Rule> {
    if event.is_ping() {
        return Vec::new();
    }

    rules
        .rules()
        .iter()
        .filter(|rule| rule.event_kind == event.kind() && filter::matches(&rule.filters, event))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{format::FormatterId, rules::Filter};

    fn ruleset() -> RuleSet {
        RuleSet::new(vec![
            Rule::new("every pr", "pull_request").action("A", FormatterId::PrDetailed),
            Rule::new("opened pr", "pull_request")
                .filter(Filter::ActionEquals("opened".into()))
                .action("B", FormatterId::PrSimple),
            Rule::new("pushes", "push").action("C", FormatterId::PushDetailed),
            Rule::new("second every pr", "pull_request").action("D", FormatterId::PrSimple),
        ])
    }

    fn names(rules: &[&Rule]) -> Vec<String> {
        rules.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn selects_by_kind_and_filters_in_order() {
        let rules = ruleset();

        let opened = Event::new("pull_request", json!({"action": "opened"}));
        assert_eq!(names(&select(&rules, &opened)), ["every pr", "opened pr", "second every pr"]);

        let closed = Event::new("pull_request", json!({"action": "closed"}));
        assert_eq!(names(&select(&rules, &closed)), ["every pr", "second every pr"]);

        let push = Event::new("push", json!({"ref": "refs/heads/main"}));
        assert_eq!(names(&select(&rules, &push)), ["pushes"]);
    }

    #[test]
    fn unknown_kind_selects_nothing() {
        let event = Event::new("workflow_run", json!({"action": "completed"}));
        assert!(select(&ruleset(), &event).is_empty());
    }

    #[test]
    fn ping_never_matches_even_with_a_ping_rule() {
        let rules = RuleSet::new(vec![Rule::new("pings", "ping").action("A", FormatterId::PushSimple)]);
        assert!(select(&rules, &Event::new("ping", json!({"zen": "hi"}))).is_empty());
    }
}
