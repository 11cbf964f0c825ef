//! Text nodes without a single shared text style.

use crate::{
    analysis::{
        canonical::NodeDigest,
        linting::{Inconsistency, IssueKind, IssueSeverity, LintRule},
    },
    document::NodeKind,
};

/// Rule for detecting text that does not use exactly one shared text style.
///
/// Unset and mixed style references both fire, as does a style id the host
/// can no longer resolve.
pub struct TextWithoutStyleRule;

impl LintRule for TextWithoutStyleRule {
    fn id(&self) -> &'static str {
        "text-without-style"
    }

    fn name(&self) -> &'static str {
        "Text Without Style"
    }

    fn description(&self) -> &'static str {
        "Detects text layers that do not use a shared text style"
    }

    fn default_severity(&self) -> IssueSeverity {
        IssueSeverity::Medium
    }

    fn kind(&self) -> IssueKind {
        IssueKind::Style
    }

    fn check_node(&self, node: &NodeDigest<'_>) -> Option<Inconsistency> {
        if node.node.kind != NodeKind::Text || node.text_style.is_some() {
            return None;
        }

        Some(Inconsistency::for_node(
            self.id(),
            self.kind(),
            self.default_severity(),
            &node.node.id,
            "Text without consistent style".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MemoryDocument, Node, TextStyleRef};

    fn check(host: &MemoryDocument, node: &Node) -> Option<Inconsistency> {
        TextWithoutStyleRule.check_node(&NodeDigest::from_node(node, host, false).unwrap())
    }

    #[test]
    fn rule_metadata_correct() {
        let rule = TextWithoutStyleRule;
        assert_eq!(rule.id(), "text-without-style");
        assert_eq!(rule.default_severity(), IssueSeverity::Medium);
        assert_eq!(rule.kind(), IssueKind::Style);
    }

    #[test]
    fn unset_and_mixed_styles_fire() {
        let host = MemoryDocument::default();
        let unset = Node::new("1", "t", NodeKind::Text);
        let mixed = Node::new("2", "t", NodeKind::Text).with_text_style(TextStyleRef::Mixed);

        let finding = check(&host, &unset).unwrap();
        assert_eq!(finding.message, "Text without consistent style");
        assert_eq!(finding.severity, Some(IssueSeverity::Medium));
        assert!(check(&host, &mixed).is_some());
    }

    #[test]
    fn styled_text_and_other_kinds_pass() {
        let host = MemoryDocument::default().with_style("S:1", "Body");
        let styled = Node::new("1", "t", NodeKind::Text)
            .with_text_style(TextStyleRef::Style("S:1".to_string()));
        assert!(check(&host, &styled).is_none());
        assert!(check(&host, &Node::new("2", "r", NodeKind::Rectangle)).is_none());
    }
}
