//! Depth-first node traversal
//!
//! [`NodeWalker`] yields every node reachable from a set of roots in
//! pre-order, children in stored order. It keeps an explicit work stack, so
//! depth is bounded by memory rather than the call stack, and a set of
//! visited ids, so a node reachable from two selected roots is yielded once.

use crate::document::{Node, NodeId};
use crate::utils::{create_hash_set, Result};
use ahash::RandomState;
use std::collections::HashSet;
use tracing::warn;

/// Pre-order iterator over node trees.
///
/// # Example
///
/// ```rust
/// use dsa_core::analysis::NodeWalker;
/// use dsa_core::document::{Node, NodeKind};
///
/// let frame = Node::new("1", "Frame", NodeKind::Frame)
///     .with_child(Node::new("2", "Text", NodeKind::Text));
/// let roots = vec![frame.clone(), frame];
///
/// let ids: Vec<_> = NodeWalker::new(&roots).map(|n| n.id.as_str()).collect();
/// assert_eq!(ids, ["1", "2"]);
/// ```
#[derive(Debug)]
pub struct NodeWalker<'a> {
    stack: Vec<&'a Node>,
    visited: HashSet<&'a NodeId, RandomState>,
}

impl<'a> NodeWalker<'a> {
    /// Start a traversal over `roots` in the given order.
    #[must_use]
    pub fn new(roots: &'a [Node]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
            visited: create_hash_set(),
        }
    }

    /// Number of distinct nodes yielded so far.
    #[must_use]
    pub fn visited(&self) -> usize {
        self.visited.len()
    }
}

impl<'a> Iterator for NodeWalker<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if !self.visited.insert(&node.id) {
                continue;
            }
            self.stack.extend(node.children.iter().rev());
            return Some(node);
        }
        None
    }
}

/// Outcome counters of a traversal with a fallible visitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Distinct nodes visited
    pub visited: usize,
    /// Nodes whose visitor returned an error
    pub failed: usize,
}

/// Successful visitor outputs of a traversal, see [`NodeWalker::visits`].
///
/// A node whose visitor fails is logged, counted in [`WalkStats::failed`],
/// and skipped; traversal continues with the next node.
#[derive(Debug)]
pub struct Visits<'a, F> {
    walker: NodeWalker<'a>,
    visit: F,
    stats: WalkStats,
}

impl<F> Visits<'_, F> {
    /// Counters so far.
    #[must_use]
    pub const fn stats(&self) -> WalkStats {
        self.stats
    }
}

impl<'a, T, F> Iterator for Visits<'a, F>
where
    F: FnMut(&'a Node) -> Result<T>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        for node in self.walker.by_ref() {
            self.stats.visited += 1;
            match (self.visit)(node) {
                Ok(output) => return Some(output),
                Err(err) => {
                    self.stats.failed += 1;
                    warn!(node_id = %node.id, error = %err, "skipping node");
                }
            }
        }
        None
    }
}

impl<'a> NodeWalker<'a> {
    /// Map every node through `visit`, yielding only successful outputs.
    pub fn visits<T, F>(self, visit: F) -> Visits<'a, F>
    where
        F: FnMut(&'a Node) -> Result<T>,
    {
        Visits {
            walker: self,
            visit,
            stats: WalkStats::default(),
        }
    }
}

/// Visit every node once, logging and skipping nodes whose visitor fails.
pub fn walk<'a, F>(roots: &'a [Node], visit: F) -> WalkStats
where
    F: FnMut(&'a Node) -> Result<()>,
{
    let mut visits = NodeWalker::new(roots).visits(visit);
    visits.by_ref().for_each(drop);
    visits.stats()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeKind;
    use crate::utils::CoreError;

    fn tree() -> Node {
        Node::new("a", "A", NodeKind::Frame)
            .with_child(
                Node::new("b", "B", NodeKind::Group)
                    .with_child(Node::new("c", "C", NodeKind::Rectangle)),
            )
            .with_child(Node::new("d", "D", NodeKind::Text))
    }

    fn ids(roots: &[Node]) -> Vec<&str> {
        NodeWalker::new(roots).map(|node| node.id.as_str()).collect()
    }

    #[test]
    fn pre_order_in_stored_order() {
        assert_eq!(ids(&[tree()]), ["a", "b", "c", "d"]);
    }

    #[test]
    fn shared_nodes_visited_once() {
        let root = tree();
        let nested = root.children[0].clone();
        assert_eq!(ids(&[nested.clone(), root.clone()]), ["b", "c", "a", "d"]);
        assert_eq!(ids(&[root, nested]), ["a", "b", "c", "d"]);
    }

    #[test]
    fn deep_chains_do_not_overflow() {
        let mut node = Node::new("leaf", "leaf", NodeKind::Rectangle);
        for depth in 0..100_000 {
            node = Node::new(format!("n{depth}"), "n", NodeKind::Group).with_child(node);
        }
        let roots = [node];
        let mut walker = NodeWalker::new(&roots);
        assert_eq!(walker.by_ref().count(), 100_001);
        assert_eq!(walker.visited(), 100_001);

        // Dropping a 100k-deep tree recursively would overflow the test thread.
        let [root] = roots;
        let mut pending = vec![root];
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }

    #[test]
    fn failing_node_does_not_stop_walk() {
        let mut seen = Vec::new();
        let stats = walk(&[tree()], |node| {
            seen.push(node.id.as_str().to_string());
            if node.id.as_str() == "b" {
                return Err(CoreError::node_processing(&node.id, "bad paint"));
            }
            Ok(())
        });

        assert_eq!(seen, ["a", "b", "c", "d"]);
        assert_eq!(stats, WalkStats { visited: 4, failed: 1 });
    }

    #[test]
    fn visits_yield_successful_outputs_in_order() {
        let roots = [tree()];
        let mut visits = NodeWalker::new(&roots).visits(|node| match node.kind {
            NodeKind::Group => Err(CoreError::node_processing(&node.id, "bad paint")),
            _ => Ok(node.name.as_str()),
        });

        assert_eq!(visits.by_ref().collect::<Vec<_>>(), ["A", "C", "D"]);
        assert_eq!(visits.stats(), WalkStats { visited: 4, failed: 1 });
    }
}
