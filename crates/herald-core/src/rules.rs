//! Rule model and load-time validation.
//!
//! Persisted configuration is string keyed (`workflows` with `event`,
//! `filters` and `actions`). It is deserialized into [`WorkflowsConfig`]
//! and then validated into a [`RuleSet`], where filter keys and formatter
//! identifiers become closed enums. Unknown filter keys fail the load
//! outright; unknown formatter identifiers are reported at load time and
//! skipped per action at dispatch.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::{HeraldError, Result},
    format::FormatterId,
    models::PING_EVENT,
};

/// Persisted rule set as it appears in a rules file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowsConfig {
    /// Rules in delivery order.
    #[serde(default)]
    pub workflows: Vec<WorkflowConfig>,
}

/// One persisted rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Human-readable rule name used in logs.
    pub name: String,
    /// Event kind this rule listens to.
    pub event: String,
    /// Predicates that must all hold.
    #[serde(default)]
    pub filters: FilterConfig,
    /// Deliveries to perform when the rule matches.
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
    /// Render drafts instead of skipping them.
    #[serde(default)]
    pub include_drafts: bool,
}

/// Persisted filter map.
///
/// Unknown keys are rejected during deserialization so a typo never turns
/// into a silently ignored predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Expected payload `action`.
    #[serde(default, alias = "action", skip_serializing_if = "Option::is_none")]
    pub action_equals: Option<String>,
    /// Expected draft flag of the pull request or release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_draft: Option<bool>,
    /// Expected prerelease flag of the release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_prerelease: Option<bool>,
    /// Branch the event must concern.
    #[serde(default, alias = "branch", skip_serializing_if = "Option::is_none")]
    pub branch_equals: Option<String>,
    /// Branch the event must not concern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_not_equals: Option<String>,
    /// Labels of which at least one must be present.
    #[serde(default, alias = "labels_include", skip_serializing_if = "Option::is_none")]
    pub labels_include_any: Option<Vec<String>>,
}

/// One persisted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionConfig {
    /// Name of the variable holding the webhook URL.
    #[serde(alias = "endpoint_ref")]
    pub webhook_env: String,
    /// Formatter identifier.
    #[serde(alias = "formatter")]
    pub format: String,
}

/// A single predicate over an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Payload `action` equals the value.
    ActionEquals(String),
    /// Draft flag equals the value.
    IsDraft(bool),
    /// Prerelease flag equals the value.
    IsPrerelease(bool),
    /// Event branch equals the value.
    BranchEquals(String),
    /// Event branch exists and differs from the value.
    BranchNotEquals(String),
    /// Event labels intersect the values, ignoring case.
    LabelsIncludeAny(Vec<String>),
}

impl Filter {
    /// Configuration key this filter was declared with.
    pub fn key(&self) -> &'static str {
        match self {
            Self::ActionEquals(_) => "action_equals",
            Self::IsDraft(_) => "is_draft",
            Self::IsPrerelease(_) => "is_prerelease",
            Self::BranchEquals(_) => "branch_equals",
            Self::BranchNotEquals(_) => "branch_not_equals",
            Self::LabelsIncludeAny(_) => "labels_include_any",
        }
    }
}

/// Conjunction of filters. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet(Vec<Filter>);

impl FilterSet {
    /// Creates a filter set from individual filters.
    pub fn new(filters: Vec<Filter>) -> Self {
        Self(filters)
    }

    /// Iterates the filters.
    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.0.iter()
    }

    /// Whether no filters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn from_config(rule: &str, config: FilterConfig) -> Result<Self> {
        let mut filters = Vec::new();
        if let Some(action) = config.action_equals {
            filters.push(Filter::ActionEquals(action));
        }
        if let Some(draft) = config.is_draft {
            filters.push(Filter::IsDraft(draft));
        }
        if let Some(prerelease) = config.is_prerelease {
            filters.push(Filter::IsPrerelease(prerelease));
        }
        if let Some(branch) = config.branch_equals {
            filters.push(Filter::BranchEquals(branch));
        }
        if let Some(branch) = config.branch_not_equals {
            filters.push(Filter::BranchNotEquals(branch));
        }
        if let Some(labels) = config.labels_include_any {
            if labels.is_empty() {
                return Err(HeraldError::invalid_rule(rule, "labels_include_any must not be empty"));
            }
            filters.push(Filter::LabelsIncludeAny(labels));
        }
        Ok(Self(filters))
    }
}

impl FromIterator<Filter> for FilterSet {
    fn from_iter<I: IntoIterator<Item = Filter>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Formatter selection of an action, resolved at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatterRef {
    /// A registered formatter.
    Registered(FormatterId),
    /// An identifier with no registry entry; the action is skipped.
    Unregistered(String),
}

impl FormatterRef {
    /// Resolves a configured identifier.
    pub fn parse(id: &str) -> Self {
        FormatterId::from_str(id).map_or_else(|_| Self::Unregistered(id.to_owned()), Self::Registered)
    }
}

impl fmt::Display for FormatterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered(id) => write!(f, "{id}"),
            Self::Unregistered(id) => write!(f, "{id}"),
        }
    }
}

/// One delivery performed when a rule matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Name resolved to a webhook URL at dispatch time.
    pub endpoint_ref: String,
    /// Formatter producing the message body.
    pub formatter: FormatterRef,
}

impl Action {
    /// Creates an action with a registered formatter.
    pub fn new(endpoint_ref: impl Into<String>, formatter: FormatterId) -> Self {
        Self { endpoint_ref: endpoint_ref.into(), formatter: FormatterRef::Registered(formatter) }
    }
}

/// A validated routing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Rule name.
    pub name: String,
    /// Event kind the rule listens to.
    pub event_kind: String,
    /// Predicates that must all hold.
    pub filters: FilterSet,
    /// Deliveries in declared order.
    pub actions: Vec<Action>,
    /// Render drafts instead of skipping them.
    pub include_drafts: bool,
}

impl Rule {
    /// Creates a rule with no filters or actions.
    pub fn new(name: impl Into<String>, event_kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            event_kind: event_kind.into(),
            filters: FilterSet::default(),
            actions: Vec::new(),
            include_drafts: false,
        }
    }

    /// Adds a filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.0.push(filter);
        self
    }

    /// Adds an action.
    #[must_use]
    pub fn action(mut self, endpoint_ref: impl Into<String>, formatter: FormatterId) -> Self {
        self.actions.push(Action::new(endpoint_ref, formatter));
        self
    }

    /// Sets draft rendering.
    #[must_use]
    pub fn include_drafts(mut self, include: bool) -> Self {
        self.include_drafts = include;
        self
    }

    fn from_config(config: WorkflowConfig) -> Result<Self> {
        let name = config.name.trim().to_owned();
        if name.is_empty() {
            return Err(HeraldError::invalid_rule("<unnamed>", "name must not be empty"));
        }
        let event_kind = config.event.trim().to_owned();
        if event_kind.is_empty() {
            return Err(HeraldError::invalid_rule(&name, "event must not be empty"));
        }
        if event_kind == PING_EVENT {
            return Err(HeraldError::invalid_rule(&name, "ping events are never routed"));
        }
        if config.actions.is_empty() {
            return Err(HeraldError::invalid_rule(&name, "at least one action is required"));
        }

        let filters = FilterSet::from_config(&name, config.filters)?;

        let mut actions = Vec::with_capacity(config.actions.len());
        for action in config.actions {
            if action.webhook_env.trim().is_empty() {
                return Err(HeraldError::invalid_rule(&name, "webhook_env must not be empty"));
            }
            let formatter = FormatterRef::parse(action.format.trim());
            match &formatter {
                FormatterRef::Unregistered(id) => {
                    warn!(rule = %name, formatter = %id, "Rule references an unknown formatter; action will be skipped");
                },
                FormatterRef::Registered(id) if id.event_kind() != event_kind => {
                    warn!(
                        rule = %name,
                        formatter = %id,
                        event_kind = %event_kind,
                        "Formatter renders a different event family and will likely produce no message"
                    );
                },
                FormatterRef::Registered(_) => {},
            }
            actions.push(Action { endpoint_ref: action.webhook_env.trim().to_owned(), formatter });
        }

        Ok(Self { name, event_kind, filters, actions, include_drafts: config.include_drafts })
    }
}

/// Immutable, ordered collection of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates a rule set from already validated rules.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Validates persisted configuration into a rule set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRule` for the first rule that fails validation.
    pub fn from_config(config: WorkflowsConfig) -> Result<Self> {
        let rules = config.workflows.into_iter().map(Rule::from_config).collect::<Result<_>>()?;
        Ok(Self { rules })
    }

    /// Rules in configuration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
