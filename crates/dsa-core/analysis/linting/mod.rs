//! Consistency rules for design documents
//!
//! Node rules run once per visited node and see only that node's
//! [`NodeDigest`]; they never depend on sibling order. Summary rules run once
//! after traversal over the finished inventory counts.
//!
//! # Built-in Rules
//!
//! - `text-without-style`: text node with no resolved text style
//! - `frame-without-layout`: frame with no auto-layout mode
//! - `instance-overrides`: instance diverging from its main component
//! - `no-components`, `no-colors`, `no-text-styles`, `no-effects`: empty inventories

use super::canonical::NodeDigest;
use super::usage::AnalysisSummary;
use crate::document::NodeId;
use core::fmt;
use serde::Serialize;

pub mod rules;

pub use rules::BuiltinRules;

/// Severity level for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    /// Informational, no action required
    Info,
    /// Minor convention deviation
    Low,
    /// Should be addressed
    Medium,
    /// Breaks the design system
    High,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl core::str::FromStr for IssueSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// Kind tag of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Component structure
    Component,
    /// Style usage
    Style,
    /// Whole-selection observation
    Summary,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inconsistency {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub message: String,
    /// Originating node, absent for summary findings
    pub node_id: Option<NodeId>,
    /// Absent for summary findings
    pub severity: Option<IssueSeverity>,
    /// Id of the rule that produced this finding
    pub rule: &'static str,
}

impl Inconsistency {
    /// Finding attached to one node.
    #[must_use]
    pub fn for_node(
        rule: &'static str,
        kind: IssueKind,
        severity: IssueSeverity,
        node_id: &NodeId,
        message: String,
    ) -> Self {
        Self {
            kind,
            message,
            node_id: Some(node_id.clone()),
            severity: Some(severity),
            rule,
        }
    }

    /// Finding about the whole selection.
    #[must_use]
    pub const fn summary(rule: &'static str, message: String) -> Self {
        Self {
            kind: IssueKind::Summary,
            message,
            node_id: None,
            severity: None,
            rule,
        }
    }
}

/// Configuration for rule selection and reporting.
#[derive(Debug, Clone)]
pub struct LintConfig {
    /// Minimum severity to report; summary findings are always reported
    pub min_severity: IssueSeverity,
    /// Maximum number of findings (0 = unlimited)
    pub max_issues: usize,
    /// Enabled rule ids (empty = all enabled)
    pub enabled_rules: Vec<String>,
    /// Disabled rule ids
    pub disabled_rules: Vec<String>,
    /// Run summary rules after traversal
    pub summary_rules: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            min_severity: IssueSeverity::Info,
            max_issues: 0,
            enabled_rules: Vec::new(),
            disabled_rules: Vec::new(),
            summary_rules: true,
        }
    }
}

impl LintConfig {
    /// Set minimum severity level.
    #[must_use]
    pub const fn with_min_severity(mut self, severity: IssueSeverity) -> Self {
        self.min_severity = severity;
        self
    }

    /// Set maximum number of findings.
    #[must_use]
    pub const fn with_max_issues(mut self, max: usize) -> Self {
        self.max_issues = max;
        self
    }

    /// Restrict linting to the given rule ids.
    #[must_use]
    pub fn with_enabled_rules<I, T>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.enabled_rules = rules.into_iter().map(Into::into).collect();
        self
    }

    /// Disable the given rule ids.
    #[must_use]
    pub fn with_disabled_rules<I, T>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.disabled_rules = rules.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable summary rules.
    #[must_use]
    pub const fn with_summary_rules(mut self, enabled: bool) -> Self {
        self.summary_rules = enabled;
        self
    }

    /// Check if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        if self.disabled_rules.iter().any(|id| id == rule_id) {
            return false;
        }
        self.enabled_rules.is_empty() || self.enabled_rules.iter().any(|id| id == rule_id)
    }

    /// Check if a finding should be reported.
    #[must_use]
    pub fn should_report(&self, finding: &Inconsistency) -> bool {
        finding
            .severity
            .map_or(true, |severity| severity >= self.min_severity)
    }
}

/// Rule evaluated on every visited node.
pub trait LintRule: Send + Sync {
    /// Unique identifier for this rule.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Rule description.
    fn description(&self) -> &'static str;

    /// Severity of findings from this rule.
    fn default_severity(&self) -> IssueSeverity;

    /// Kind tag of findings from this rule.
    fn kind(&self) -> IssueKind;

    /// Check one node.
    fn check_node(&self, node: &NodeDigest<'_>) -> Option<Inconsistency>;
}

/// Rule evaluated once over the finished inventory.
pub trait SummaryRule: Send + Sync {
    /// Unique identifier for this rule.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Rule description.
    fn description(&self) -> &'static str;

    /// Check the inventory counts.
    fn check_summary(&self, summary: &AnalysisSummary) -> Option<Inconsistency>;
}

/// Collects findings for one analysis.
pub struct InconsistencyDetector {
    config: LintConfig,
    node_rules: Vec<Box<dyn LintRule>>,
    summary_rules: Vec<Box<dyn SummaryRule>>,
    findings: Vec<Inconsistency>,
}

impl fmt::Debug for InconsistencyDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InconsistencyDetector")
            .field("config", &self.config)
            .field(
                "node_rules",
                &self.node_rules.iter().map(|rule| rule.id()).collect::<Vec<_>>(),
            )
            .field(
                "summary_rules",
                &self.summary_rules.iter().map(|rule| rule.id()).collect::<Vec<_>>(),
            )
            .field("findings", &self.findings.len())
            .finish()
    }
}

impl InconsistencyDetector {
    /// Create a detector running every built-in rule enabled by `config`.
    #[must_use]
    pub fn new(config: LintConfig) -> Self {
        let node_rules = BuiltinRules::node_rules()
            .into_iter()
            .filter(|rule| config.is_rule_enabled(rule.id()))
            .collect();
        let summary_rules = if config.summary_rules {
            BuiltinRules::summary_rules()
                .into_iter()
                .filter(|rule| config.is_rule_enabled(rule.id()))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            config,
            node_rules,
            summary_rules,
            findings: Vec::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.config.max_issues > 0 && self.findings.len() >= self.config.max_issues
    }

    fn push(&mut self, finding: Inconsistency) {
        if !self.is_full() && self.config.should_report(&finding) {
            self.findings.push(finding);
        }
    }

    /// Run node rules against one node.
    pub fn check_node(&mut self, node: &NodeDigest<'_>) {
        if self.is_full() {
            return;
        }
        let found: Vec<_> = self
            .node_rules
            .iter()
            .filter_map(|rule| rule.check_node(node))
            .collect();
        for finding in found {
            self.push(finding);
        }
    }

    /// Run summary rules once traversal is complete.
    pub fn check_summary(&mut self, summary: &AnalysisSummary) {
        let found: Vec<_> = self
            .summary_rules
            .iter()
            .filter_map(|rule| rule.check_summary(summary))
            .collect();
        for finding in found {
            self.push(finding);
        }
    }

    /// Findings collected so far.
    #[must_use]
    pub fn findings(&self) -> &[Inconsistency] {
        &self.findings
    }

    /// Close the detector and return its findings in emission order.
    #[must_use]
    pub fn finish(self) -> Vec<Inconsistency> {
        self.findings
    }
}
