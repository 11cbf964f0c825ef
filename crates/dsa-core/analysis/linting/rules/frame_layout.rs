//! Frames that do not use auto-layout.

use crate::{
    analysis::{
        canonical::NodeDigest,
        linting::{Inconsistency, IssueKind, IssueSeverity, LintRule},
    },
    document::{LayoutMode, NodeKind},
};

/// Rule for detecting frames positioned without an auto-layout mode.
pub struct FrameWithoutLayoutRule;

impl LintRule for FrameWithoutLayoutRule {
    fn id(&self) -> &'static str {
        "frame-without-layout"
    }

    fn name(&self) -> &'static str {
        "Frame Without Layout"
    }

    fn description(&self) -> &'static str {
        "Detects frames that do not use auto-layout"
    }

    fn default_severity(&self) -> IssueSeverity {
        IssueSeverity::Low
    }

    fn kind(&self) -> IssueKind {
        IssueKind::Component
    }

    fn check_node(&self, node: &NodeDigest<'_>) -> Option<Inconsistency> {
        if node.node.kind != NodeKind::Frame || node.node.layout() != Some(LayoutMode::None) {
            return None;
        }

        Some(Inconsistency::for_node(
            self.id(),
            self.kind(),
            self.default_severity(),
            &node.node.id,
            "Frame without layout mode".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MemoryDocument, Node};

    fn check(node: &Node) -> Option<Inconsistency> {
        let host = MemoryDocument::default();
        FrameWithoutLayoutRule.check_node(&NodeDigest::from_node(node, &host, false).unwrap())
    }

    #[test]
    fn unset_layout_fires_once() {
        let finding = check(&Node::new("1:1", "Card", NodeKind::Frame)).unwrap();
        assert_eq!(finding.kind, IssueKind::Component);
        assert_eq!(finding.severity, Some(IssueSeverity::Low));
        assert_eq!(finding.node_id.as_ref().map(|id| id.as_str()), Some("1:1"));

        let explicit_none = Node::new("1:2", "Card", NodeKind::Frame).with_layout(LayoutMode::None);
        assert!(check(&explicit_none).is_some());
    }

    #[test]
    fn auto_layout_and_non_frames_pass() {
        assert!(check(&Node::new("1", "Row", NodeKind::Frame).with_layout(LayoutMode::Horizontal)).is_none());
        assert!(check(&Node::new("2", "Button", NodeKind::Component)).is_none());
        assert!(check(&Node::new("3", "Group", NodeKind::Group)).is_none());
    }
}
