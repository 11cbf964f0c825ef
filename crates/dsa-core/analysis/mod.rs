//! Design system analysis over a node selection
//!
//! One analysis is a single pre-order pass of the [`NodeWalker`] over the
//! selection. Each node is canonicalized into a [`NodeDigest`], checked by
//! the [`InconsistencyDetector`], and folded into the [`UsageAggregator`].
//! Variable lookups are the only async step; they go through a per-request
//! [`VariableCache`] either once per node or in one pass after traversal.
//!
//! A failing node is logged and skipped. Anything else that fails returns an
//! error instead of a partial result.
//!
//! # Example
//!
//! ```rust
//! use dsa_core::analysis::{AnalysisConfig, DesignAnalysis};
//! use dsa_core::document::{LayoutMode, MemoryDocument, MemoryVariableStore, Node, NodeKind, Paint};
//! use dsa_core::utils::Rgb;
//!
//! # let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # runtime.block_on(async {
//! let card = Node::new("1:1", "Card", NodeKind::Frame)
//!     .with_layout(LayoutMode::Vertical)
//!     .with_fills(vec![Paint::solid(Rgb::new(1.0, 0.0, 0.0))]);
//! let host = MemoryDocument::new(vec![card]);
//! let store = MemoryVariableStore::new();
//!
//! let result = DesignAnalysis::new(AnalysisConfig::default())
//!     .run(&host, &store)
//!     .await?;
//! assert_eq!(result.styles.colors[0].hex, "#ff0000");
//! # Ok::<(), dsa_core::CoreError>(())
//! # }).unwrap();
//! ```

use crate::document::{DocumentHost, Node, NodeKind, VariableId, VariableStore};
use crate::utils::{CoreError, Result};
use crate::variables::VariableCache;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub mod canonical;
pub mod linting;
pub mod usage;
pub mod walker;

pub use canonical::{ColorSighting, NodeDigest};
pub use linting::{
    Inconsistency, InconsistencyDetector, IssueKind, IssueSeverity, LintConfig, LintRule,
    SummaryRule,
};
pub use usage::{
    AnalysisSummary, ColorKind, ColorUsage, ComponentRecord, ComponentUsage, StyleInventory,
    UsageAggregator, UsageIndex,
};
pub use walker::{walk, NodeWalker, Visits, WalkStats};

/// Which node kinds are recorded as components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ComponentPolicy {
    /// `COMPONENT` and `INSTANCE`
    #[default]
    Minimal,
    /// Adds `COMPONENT_SET` and `FRAME`, and records override counts on instances
    Extended,
}

impl ComponentPolicy {
    /// Whether nodes of `kind` are recorded.
    #[must_use]
    pub const fn records(self, kind: NodeKind) -> bool {
        match self {
            Self::Minimal => matches!(kind, NodeKind::Component | NodeKind::Instance),
            Self::Extended => matches!(
                kind,
                NodeKind::Component | NodeKind::Instance | NodeKind::ComponentSet | NodeKind::Frame
            ),
        }
    }
}

/// When bound variables are looked up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResolutionPolicy {
    /// Await lookups for each node before moving to the next
    #[default]
    Inline,
    /// Collect ids during traversal and resolve them in one pass afterwards
    Deferred,
}

/// Configuration for analysis runs.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Node kinds recorded as components
    pub component_policy: ComponentPolicy,

    /// Variable lookup timing
    pub resolution: ResolutionPolicy,

    /// Count solid strokes like solid fills
    pub include_strokes: bool,

    /// Check the abort flag every N visited nodes (0 = never)
    pub checkpoint_interval: usize,

    /// Rule selection and reporting
    pub lint: LintConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            component_policy: ComponentPolicy::Minimal,
            resolution: ResolutionPolicy::Inline,
            include_strokes: false,
            checkpoint_interval: 1024,
            lint: LintConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Set component policy.
    #[must_use]
    pub const fn with_component_policy(mut self, policy: ComponentPolicy) -> Self {
        self.component_policy = policy;
        self
    }

    /// Set variable resolution timing.
    #[must_use]
    pub const fn with_resolution(mut self, resolution: ResolutionPolicy) -> Self {
        self.resolution = resolution;
        self
    }

    /// Count strokes into the color index.
    #[must_use]
    pub const fn with_strokes(mut self, enabled: bool) -> Self {
        self.include_strokes = enabled;
        self
    }

    /// Set abort checkpoint interval.
    #[must_use]
    pub const fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    /// Set lint configuration.
    #[must_use]
    pub fn with_lint(mut self, lint: LintConfig) -> Self {
        self.lint = lint;
        self
    }
}

/// Shared flag for cooperative cancellation.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    /// Create an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Clear a previous request.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Complete result of one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub components: Vec<ComponentRecord>,
    /// Instance count per main component name
    pub component_usage: ComponentUsage,
    pub styles: StyleInventory,
    pub inconsistencies: Vec<Inconsistency>,
}

/// Analysis driver.
#[derive(Debug, Clone, Default)]
pub struct DesignAnalysis {
    config: AnalysisConfig,
    abort: Option<AbortFlag>,
}

impl DesignAnalysis {
    /// Create a driver with the given configuration.
    #[must_use]
    pub const fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            abort: None,
        }
    }

    /// Observe `flag` at every checkpoint.
    #[must_use]
    pub fn with_abort(mut self, flag: AbortFlag) -> Self {
        self.abort = Some(flag);
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze the host's current selection.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptySelection`] when nothing is selected and
    /// [`CoreError::Cancelled`] when the abort flag is observed.
    pub async fn run<H, S>(&self, host: &H, store: &S) -> Result<AnalysisResult>
    where
        H: DocumentHost + ?Sized,
        S: VariableStore + ?Sized,
    {
        let roots = host.selection();
        self.run_on(host, store, &roots).await
    }

    /// Analyze explicit roots.
    ///
    /// # Errors
    ///
    /// See [`DesignAnalysis::run`].
    pub async fn run_on<H, S>(&self, host: &H, store: &S, roots: &[Node]) -> Result<AnalysisResult>
    where
        H: DocumentHost + ?Sized,
        S: VariableStore + ?Sized,
    {
        if roots.is_empty() {
            return Err(CoreError::EmptySelection);
        }
        debug!(roots = roots.len(), policy = ?self.config.component_policy, "starting analysis");

        let mut cache = VariableCache::new();
        let mut aggregator = UsageAggregator::new(self.config.component_policy);
        let mut detector = InconsistencyDetector::new(self.config.lint.clone());
        let mut pending: Vec<VariableId> = Vec::new();
        let mut checked = 0usize;

        let mut digests = NodeWalker::new(roots).visits(|node| {
            trace!(node_id = %node.id, kind = %node.kind, "visiting node");
            NodeDigest::from_node(node, host, self.config.include_strokes)
        });
        while let Some(digest) = digests.next() {
            self.checkpoint(digests.stats().visited, &mut checked)?;

            match self.config.resolution {
                ResolutionPolicy::Inline => cache.resolve(store, digest.bound_variables()).await,
                ResolutionPolicy::Deferred => pending.extend(digest.bound_variables().cloned()),
            }

            detector.check_node(&digest);
            aggregator.record(&digest);
        }
        let WalkStats { visited, failed } = digests.stats();

        if self.config.resolution == ResolutionPolicy::Deferred {
            cache.resolve(store, pending.iter()).await;
        }

        let usage = aggregator.finish(&cache);
        detector.check_summary(&usage.summary());
        let inconsistencies = detector.finish();

        debug!(
            visited,
            failed,
            components = usage.components.len(),
            colors = usage.styles.colors.len(),
            variables = cache.len(),
            findings = inconsistencies.len(),
            "analysis finished"
        );

        Ok(AnalysisResult {
            components: usage.components,
            component_usage: usage.component_usage,
            styles: usage.styles,
            inconsistencies,
        })
    }

    /// Check the abort flag once per `checkpoint_interval` visited nodes.
    fn checkpoint(&self, visited: usize, checked: &mut usize) -> Result<()> {
        let interval = self.config.checkpoint_interval;
        if interval == 0 || visited / interval == *checked / interval {
            return Ok(());
        }
        *checked = visited;
        match &self.abort {
            Some(flag) if flag.is_aborted() => {
                debug!(visited, "analysis cancelled");
                Err(CoreError::Cancelled { visited })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MemoryDocument, MemoryVariableStore, Paint};
    use crate::utils::Rgb;

    #[test]
    fn component_policies() {
        assert!(ComponentPolicy::Minimal.records(NodeKind::Instance));
        assert!(!ComponentPolicy::Minimal.records(NodeKind::Frame));
        assert!(ComponentPolicy::Extended.records(NodeKind::ComponentSet));
        assert!(!ComponentPolicy::Extended.records(NodeKind::Text));
    }

    #[test]
    fn config_builders() {
        let config = AnalysisConfig::default()
            .with_component_policy(ComponentPolicy::Extended)
            .with_resolution(ResolutionPolicy::Deferred)
            .with_strokes(true)
            .with_checkpoint_interval(8);
        assert_eq!(config.component_policy, ComponentPolicy::Extended);
        assert_eq!(config.resolution, ResolutionPolicy::Deferred);
        assert!(config.include_strokes);
        assert_eq!(config.checkpoint_interval, 8);
    }

    #[tokio::test]
    async fn empty_selection_is_an_error() {
        let host = MemoryDocument::default();
        let store = MemoryVariableStore::new();
        let err = DesignAnalysis::default().run(&host, &store).await.unwrap_err();
        assert_eq!(err, CoreError::EmptySelection);
    }

    #[tokio::test]
    async fn abort_flag_is_observed_at_checkpoints() {
        let mut root = Node::new("root", "root", NodeKind::Group);
        for i in 0..10 {
            root = root.with_child(Node::new(format!("c{i}"), "c", NodeKind::Rectangle));
        }
        let host = MemoryDocument::new(vec![root]);
        let store = MemoryVariableStore::new();
        let flag = AbortFlag::new();
        flag.abort();

        let analysis = DesignAnalysis::new(AnalysisConfig::default().with_checkpoint_interval(4))
            .with_abort(flag.clone());
        let err = analysis.run(&host, &store).await.unwrap_err();
        assert_eq!(err, CoreError::Cancelled { visited: 4 });

        flag.reset();
        assert!(analysis.run(&host, &store).await.is_ok());
    }

    #[tokio::test]
    async fn skipped_nodes_count_toward_checkpoints() {
        let root = Node::new("root", "root", NodeKind::Group)
            .with_child(
                Node::new("bad", "bad", NodeKind::Rectangle)
                    .with_fills(vec![Paint::solid(Rgb::new(f64::NAN, 0.0, 0.0))]),
            )
            .with_child(Node::new("c1", "c", NodeKind::Rectangle))
            .with_child(Node::new("c2", "c", NodeKind::Rectangle));
        let host = MemoryDocument::new(vec![root]);
        let store = MemoryVariableStore::new();
        let flag = AbortFlag::new();
        flag.abort();

        let analysis = DesignAnalysis::new(AnalysisConfig::default().with_checkpoint_interval(2))
            .with_abort(flag);
        let err = analysis.run(&host, &store).await.unwrap_err();
        assert_eq!(err, CoreError::Cancelled { visited: 3 });
    }

    #[tokio::test]
    async fn failing_node_contributes_nothing() {
        let bad = Node::new("bad", "bad", NodeKind::Frame)
            .with_fills(vec![Paint::solid(Rgb::new(f64::NAN, 0.0, 0.0))]);
        let good = Node::new("good", "good", NodeKind::Rectangle)
            .with_fills(vec![Paint::solid(Rgb::new(0.0, 0.0, 1.0))]);
        let host = MemoryDocument::new(vec![bad.with_child(good)]);
        let store = MemoryVariableStore::new();

        let result = DesignAnalysis::default().run(&host, &store).await.unwrap();
        assert_eq!(result.styles.colors.len(), 1);
        assert_eq!(result.styles.colors[0].hex, "#0000ff");
        assert!(result
            .inconsistencies
            .iter()
            .all(|finding| finding.node_id.as_ref().map(|id| id.as_str()) != Some("bad")));
    }
}
