//! Instances that diverge from their main component.

use crate::{
    analysis::{
        canonical::NodeDigest,
        linting::{Inconsistency, IssueKind, IssueSeverity, LintRule},
    },
    document::NodeKind,
};

/// Rule for reporting instances carrying overrides.
///
/// Overrides are often intentional, so findings are informational.
pub struct InstanceOverrideRule;

impl LintRule for InstanceOverrideRule {
    fn id(&self) -> &'static str {
        "instance-overrides"
    }

    fn name(&self) -> &'static str {
        "Instance Overrides"
    }

    fn description(&self) -> &'static str {
        "Reports instances with properties overridden from their main component"
    }

    fn default_severity(&self) -> IssueSeverity {
        IssueSeverity::Info
    }

    fn kind(&self) -> IssueKind {
        IssueKind::Style
    }

    fn check_node(&self, node: &NodeDigest<'_>) -> Option<Inconsistency> {
        let target = node.node;
        if target.kind != NodeKind::Instance {
            return None;
        }
        let instance = target.instance.as_ref()?;
        let count = instance.overrides.len();
        if count == 0 {
            return None;
        }

        let message = match &instance.main_component {
            Some(main) => format!(
                "Instance \"{}\" has {count} overrides from main component \"{}\"",
                target.name, main.name
            ),
            None => format!("Instance \"{}\" has {count} overrides", target.name),
        };

        Some(Inconsistency::for_node(
            self.id(),
            self.kind(),
            self.default_severity(),
            &target.id,
            message,
        ))
    }
}
