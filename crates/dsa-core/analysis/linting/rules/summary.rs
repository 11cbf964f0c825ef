//! Post-traversal checks for empty inventories.

use crate::analysis::{
    linting::{Inconsistency, SummaryRule},
    usage::AnalysisSummary,
};

/// One inventory of the usage index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inventory {
    Components,
    Colors,
    TextStyles,
    Effects,
}

impl Inventory {
    /// Every inventory in report order.
    pub const ALL: [Self; 4] = [Self::Components, Self::Colors, Self::TextStyles, Self::Effects];

    const fn label(self) -> &'static str {
        match self {
            Self::Components => "components",
            Self::Colors => "colors",
            Self::TextStyles => "text styles",
            Self::Effects => "effects",
        }
    }

    const fn count(self, summary: &AnalysisSummary) -> usize {
        match self {
            Self::Components => summary.components,
            Self::Colors => summary.colors,
            Self::TextStyles => summary.text_styles,
            Self::Effects => summary.effects,
        }
    }
}

/// Rule that fires when an inventory ended up empty.
#[derive(Debug, Clone, Copy)]
pub struct EmptyInventoryRule {
    inventory: Inventory,
}

impl EmptyInventoryRule {
    /// Create the rule for one inventory.
    #[must_use]
    pub const fn new(inventory: Inventory) -> Self {
        Self { inventory }
    }
}

impl SummaryRule for EmptyInventoryRule {
    fn id(&self) -> &'static str {
        match self.inventory {
            Inventory::Components => "no-components",
            Inventory::Colors => "no-colors",
            Inventory::TextStyles => "no-text-styles",
            Inventory::Effects => "no-effects",
        }
    }

    fn name(&self) -> &'static str {
        match self.inventory {
            Inventory::Components => "No Components",
            Inventory::Colors => "No Colors",
            Inventory::TextStyles => "No Text Styles",
            Inventory::Effects => "No Effects",
        }
    }

    fn description(&self) -> &'static str {
        "Reports an inventory that is empty for the whole selection"
    }

    fn check_summary(&self, summary: &AnalysisSummary) -> Option<Inconsistency> {
        (self.inventory.count(summary) == 0).then(|| {
            Inconsistency::summary(
                self.id(),
                format!("No {} found in selection", self.inventory.label()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::linting::IssueKind;

    #[test]
    fn fires_only_for_empty_inventory() {
        let summary = AnalysisSummary {
            components: 0,
            colors: 3,
            text_styles: 0,
            effects: 1,
        };

        let messages: Vec<_> = Inventory::ALL
            .into_iter()
            .filter_map(|inventory| EmptyInventoryRule::new(inventory).check_summary(&summary))
            .map(|finding| {
                assert_eq!(finding.kind, IssueKind::Summary);
                assert!(finding.node_id.is_none() && finding.severity.is_none());
                finding.message
            })
            .collect();

        assert_eq!(
            messages,
            ["No components found in selection", "No text styles found in selection"]
        );
    }
}
