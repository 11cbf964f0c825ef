//! Built-in consistency rules
//!
//! Each rule lives in its own module. Node rules implement [`LintRule`],
//! post-traversal rules implement [`SummaryRule`].
//!
//! # Example
//!
//! ```rust
//! use dsa_core::analysis::linting::rules::BuiltinRules;
//!
//! for id in BuiltinRules::all_rule_ids() {
//!     println!("{id}");
//! }
//! ```

use super::{LintRule, SummaryRule};

pub mod frame_layout;
pub mod instance_override;
pub mod summary;
pub mod text_style;

pub use frame_layout::FrameWithoutLayoutRule;
pub use instance_override::InstanceOverrideRule;
pub use summary::{EmptyInventoryRule, Inventory};
pub use text_style::TextWithoutStyleRule;

/// Built-in rule registry.
///
/// # Rule List
///
/// - `TextWithoutStyleRule`: text nodes with unset or mixed text styles
/// - `FrameWithoutLayoutRule`: frames with no auto-layout mode
/// - `InstanceOverrideRule`: instances with overrides from their main component
/// - `EmptyInventoryRule`: one per inventory, fires when nothing was found
pub struct BuiltinRules;

impl BuiltinRules {
    /// Rules evaluated on every node, in evaluation order.
    #[must_use]
    pub fn node_rules() -> Vec<Box<dyn LintRule>> {
        vec![
            Box::new(TextWithoutStyleRule),
            Box::new(FrameWithoutLayoutRule),
            Box::new(InstanceOverrideRule),
        ]
    }

    /// Rules evaluated once after traversal, in evaluation order.
    #[must_use]
    pub fn summary_rules() -> Vec<Box<dyn SummaryRule>> {
        Inventory::ALL
            .into_iter()
            .map(|inventory| Box::new(EmptyInventoryRule::new(inventory)) as Box<dyn SummaryRule>)
            .collect()
    }

    /// Get node rule by ID.
    #[must_use]
    pub fn rule_by_id(id: &str) -> Option<Box<dyn LintRule>> {
        Self::node_rules().into_iter().find(|rule| rule.id() == id)
    }

    /// Get all rule IDs, node rules first.
    #[must_use]
    pub fn all_rule_ids() -> Vec<&'static str> {
        Self::node_rules()
            .iter()
            .map(|rule| rule.id())
            .chain(Self::summary_rules().iter().map(|rule| rule.id()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_rules_have_unique_ids() {
        let mut ids = Vec::new();
        for id in BuiltinRules::all_rule_ids() {
            assert!(!ids.contains(&id), "Duplicate rule ID: {id}");
            ids.push(id);
        }
        assert_eq!(ids.len(), 7);
    }

    #[test]
    fn rule_by_id_works() {
        let rule = BuiltinRules::rule_by_id("frame-without-layout");
        assert_eq!(rule.map(|r| r.id()), Some("frame-without-layout"));
        assert!(BuiltinRules::rule_by_id("no-colors").is_none());
    }
}
