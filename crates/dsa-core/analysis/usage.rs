//! Usage index of colors, text styles, effects, and components
//!
//! Entries are created on first sighting and only updated afterwards, and
//! every collection keeps first-sighting order so results are reproducible
//! for a fixed tree. Variable names are attached at [`UsageAggregator::finish`]
//! from the per-request [`VariableCache`].

use super::canonical::{ColorSighting, NodeDigest};
use super::ComponentPolicy;
use crate::document::{NodeId, NodeKind, VariableId};
use crate::utils::{create_hash_map, create_hash_set};
use crate::variables::VariableCache;
use ahash::RandomState;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Whether a color entry is a solid hex or a gradient descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorKind {
    Solid,
    Gradient,
}

/// Usage of one canonical color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorUsage {
    /// `#rrggbb` for solids, the gradient descriptor for gradients
    pub hex: String,
    pub kind: ColorKind,
    pub direct_uses: usize,
    pub variable_uses: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_id: Option<VariableId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_collection: Option<String>,
}

impl ColorUsage {
    fn new(hex: String, kind: ColorKind) -> Self {
        Self {
            hex,
            kind,
            direct_uses: 0,
            variable_uses: 0,
            variable_id: None,
            variable_key: None,
            variable_name: None,
            variable_collection: None,
        }
    }

    /// Total sightings of this color.
    #[must_use]
    pub const fn total_uses(&self) -> usize {
        self.direct_uses + self.variable_uses
    }
}

/// One recorded component-like node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Main component name, instances under the extended policy only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_component: Option<String>,
    /// Override count, instances under the extended policy only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<usize>,
}

/// Style part of an analysis result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleInventory {
    pub colors: Vec<ColorUsage>,
    pub text_styles: Vec<String>,
    pub effects: Vec<String>,
}

/// Instance counts per main component name, in first-sighting order.
///
/// Serializes as a JSON object keyed by component name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentUsage {
    counts: Vec<(String, usize)>,
}

impl ComponentUsage {
    /// Instances of the main component named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(component, _)| component == name)
            .map(|&(_, count)| count)
    }

    /// Names and counts in first-sighting order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl Serialize for ComponentUsage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (name, count) in &self.counts {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

/// Entry counts consumed by summary rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisSummary {
    pub components: usize,
    pub colors: usize,
    pub text_styles: usize,
    pub effects: usize,
}

/// Finished usage index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageIndex {
    pub components: Vec<ComponentRecord>,
    pub component_usage: ComponentUsage,
    pub styles: StyleInventory,
}

impl UsageIndex {
    /// Entry counts per inventory.
    #[must_use]
    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            components: self.components.len(),
            colors: self.styles.colors.len(),
            text_styles: self.styles.text_styles.len(),
            effects: self.styles.effects.len(),
        }
    }
}

#[derive(Debug)]
struct ColorEntry {
    usage: ColorUsage,
    bindings: Vec<VariableId>,
}

/// Insertion-ordered set of descriptor strings.
#[derive(Debug, Default)]
struct OrderedSet {
    items: Vec<String>,
    seen: HashSet<String, RandomState>,
}

impl OrderedSet {
    fn insert(&mut self, item: &str) {
        if !self.seen.contains(item) {
            self.seen.insert(item.to_string());
            self.items.push(item.to_string());
        }
    }
}

/// Running usage index for one analysis.
#[derive(Debug)]
pub struct UsageAggregator {
    policy: ComponentPolicy,
    colors: Vec<ColorEntry>,
    color_index: HashMap<String, usize, RandomState>,
    text_styles: OrderedSet,
    effects: OrderedSet,
    components: Vec<ComponentRecord>,
    component_ids: HashSet<NodeId, RandomState>,
    instance_counts: Vec<(String, usize)>,
    instance_index: HashMap<String, usize, RandomState>,
}

impl UsageAggregator {
    /// Create an empty index.
    #[must_use]
    pub fn new(policy: ComponentPolicy) -> Self {
        Self {
            policy,
            colors: Vec::new(),
            color_index: create_hash_map(),
            text_styles: OrderedSet::default(),
            effects: OrderedSet::default(),
            components: Vec::new(),
            component_ids: create_hash_set(),
            instance_counts: Vec::new(),
            instance_index: create_hash_map(),
        }
    }

    /// Fold one node into the index.
    pub fn record(&mut self, digest: &NodeDigest<'_>) {
        for sighting in &digest.colors {
            match sighting {
                ColorSighting::Direct { hex } => {
                    self.color_entry(hex, ColorKind::Solid).usage.direct_uses += 1;
                }
                ColorSighting::Bound { hex, variable } => {
                    let entry = self.color_entry(hex, ColorKind::Solid);
                    entry.usage.variable_uses += 1;
                    if entry.bindings.last() != Some(variable) {
                        entry.bindings.push(variable.clone());
                    }
                }
                ColorSighting::Gradient { descriptor } => {
                    self.color_entry(descriptor, ColorKind::Gradient).usage.direct_uses += 1;
                }
            }
        }

        for effect in &digest.effects {
            self.effects.insert(effect);
        }
        if let Some(style) = &digest.text_style {
            self.text_styles.insert(style);
        }

        self.record_component(digest);
    }

    fn color_entry(&mut self, key: &str, kind: ColorKind) -> &mut ColorEntry {
        let index = if let Some(&index) = self.color_index.get(key) {
            index
        } else {
            let index = self.colors.len();
            self.colors.push(ColorEntry {
                usage: ColorUsage::new(key.to_string(), kind),
                bindings: Vec::new(),
            });
            self.color_index.insert(key.to_string(), index);
            index
        };
        &mut self.colors[index]
    }

    fn record_component(&mut self, digest: &NodeDigest<'_>) {
        let node = digest.node;
        if let Some(main) = node.main_component() {
            self.count_instance(&main.name);
        }
        if !self.policy.records(node.kind) || self.component_ids.contains(&node.id) {
            return;
        }

        let instance = match (self.policy, node.kind) {
            (ComponentPolicy::Extended, NodeKind::Instance) => node.instance.as_ref(),
            _ => None,
        };

        self.component_ids.insert(node.id.clone());
        self.components.push(ComponentRecord {
            id: node.id.clone(),
            name: node.name.clone(),
            kind: node.kind,
            main_component: instance
                .and_then(|info| info.main_component.as_ref())
                .map(|main| main.name.clone()),
            overrides: instance.map(|info| info.overrides.len()),
        });
    }

    fn count_instance(&mut self, name: &str) {
        if let Some(&index) = self.instance_index.get(name) {
            self.instance_counts[index].1 += 1;
        } else {
            self.instance_index.insert(name.to_string(), self.instance_counts.len());
            self.instance_counts.push((name.to_string(), 1));
        }
    }

    /// Variables bound anywhere in the index.
    pub fn bound_variables(&self) -> impl Iterator<Item = &VariableId> {
        self.colors.iter().flat_map(|entry| entry.bindings.iter())
    }

    /// Close the index, attaching variable details from `cache`.
    ///
    /// When several variables bind the same color, the last one in traversal
    /// order that resolves is recorded.
    #[must_use]
    pub fn finish(self, cache: &VariableCache) -> UsageIndex {
        let colors = self
            .colors
            .into_iter()
            .map(|entry| {
                let mut usage = entry.usage;
                if let Some(variable) = entry.bindings.iter().rev().find_map(|id| cache.get(id)) {
                    usage.variable_id = Some(variable.id.clone());
                    usage.variable_key = Some(variable.key.clone());
                    usage.variable_name = Some(variable.name.clone());
                    usage.variable_collection = Some(variable.collection.clone());
                }
                usage
            })
            .collect();

        UsageIndex {
            components: self.components,
            component_usage: ComponentUsage {
                counts: self.instance_counts,
            },
            styles: StyleInventory {
                colors,
                text_styles: self.text_styles.items,
                effects: self.effects.items,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        InstanceInfo, InstanceOverride, MainComponentRef, MemoryDocument, Node, Paint, SolidPaint,
        VariableRef,
    };
    use crate::utils::Rgb;
    use pretty_assertions::assert_eq;

    fn record_all(aggregator: &mut UsageAggregator, nodes: &[Node]) {
        let host = MemoryDocument::default();
        for node in nodes {
            aggregator.record(&NodeDigest::from_node(node, &host, false).unwrap());
        }
    }

    fn red() -> Rgb {
        Rgb::new(1.0, 0.0, 0.0)
    }

    #[test]
    fn merges_direct_and_bound_sightings() {
        let nodes = [
            Node::new("1", "a", NodeKind::Rectangle).with_fills(vec![Paint::solid(red()), Paint::solid(red())]),
            Node::new("2", "b", NodeKind::Rectangle)
                .with_fills(vec![Paint::Solid(SolidPaint::new(red()).bound_to("V:1"))]),
        ];
        let mut aggregator = UsageAggregator::new(ComponentPolicy::Minimal);
        record_all(&mut aggregator, &nodes);

        let mut cache = VariableCache::new();
        cache.insert(
            VariableId::new("V:1"),
            Some(VariableRef {
                id: VariableId::new("V:1"),
                key: "k1".to_string(),
                name: "Red/500".to_string(),
                collection: "Brand".to_string(),
                is_remote: false,
                library_name: None,
            }),
        );

        let index = aggregator.finish(&cache);
        assert_eq!(index.styles.colors.len(), 1);
        let usage = &index.styles.colors[0];
        assert_eq!((usage.direct_uses, usage.variable_uses), (2, 1));
        assert_eq!(usage.variable_name.as_deref(), Some("Red/500"));
        assert_eq!(usage.variable_collection.as_deref(), Some("Brand"));
    }

    #[test]
    fn unresolved_binding_still_counts_as_variable_use() {
        let nodes = [Node::new("1", "a", NodeKind::Rectangle)
            .with_fills(vec![Paint::Solid(SolidPaint::new(red()).bound_to("V:gone"))])];
        let mut aggregator = UsageAggregator::new(ComponentPolicy::Minimal);
        record_all(&mut aggregator, &nodes);

        let usage = aggregator.finish(&VariableCache::new()).styles.colors.remove(0);
        assert_eq!((usage.direct_uses, usage.variable_uses), (0, 1));
        assert_eq!(usage.variable_id, None);
    }

    #[test]
    fn styles_and_effects_keep_first_sighting_order() {
        let mut aggregator = UsageAggregator::new(ComponentPolicy::Minimal);
        let host = MemoryDocument::default();
        let node = Node::new("1", "a", NodeKind::Rectangle);
        let mut digest = NodeDigest::from_node(&node, &host, false).unwrap();
        digest.effects = vec!["LAYER_BLUR: 2px".to_string(), "DROP_SHADOW: #000000 @ 25%".to_string()];
        digest.text_style = Some("Body".to_string());
        aggregator.record(&digest);
        digest.effects.reverse();
        aggregator.record(&digest);

        let index = aggregator.finish(&VariableCache::new());
        assert_eq!(index.styles.effects, ["LAYER_BLUR: 2px", "DROP_SHADOW: #000000 @ 25%"]);
        assert_eq!(index.styles.text_styles, ["Body"]);
    }

    #[test]
    fn component_policy_controls_recorded_kinds() {
        let instance = Node::new("3", "Button", NodeKind::Instance).with_instance(InstanceInfo {
            main_component: Some(MainComponentRef {
                id: NodeId::from("1"),
                name: "Button/Primary".to_string(),
            }),
            overrides: vec![InstanceOverride {
                id: NodeId::from("3;1"),
                overridden_fields: vec!["fills".to_string()],
            }],
        });
        let nodes = [
            Node::new("1", "Button/Primary", NodeKind::Component),
            Node::new("2", "Card", NodeKind::Frame),
            instance,
            Node::new("1", "Button/Primary", NodeKind::Component),
        ];

        let mut minimal = UsageAggregator::new(ComponentPolicy::Minimal);
        record_all(&mut minimal, &nodes);
        let minimal = minimal.finish(&VariableCache::new());
        assert_eq!(minimal.components.len(), 2);
        assert_eq!(minimal.components[1].overrides, None);

        let mut extended = UsageAggregator::new(ComponentPolicy::Extended);
        record_all(&mut extended, &nodes);
        let extended = extended.finish(&VariableCache::new());
        assert_eq!(extended.components.len(), 3);
        assert_eq!(extended.components[2].main_component.as_deref(), Some("Button/Primary"));
        assert_eq!(extended.components[2].overrides, Some(1));
        assert_eq!(extended.summary().components, 3);
    }

    #[test]
    fn instances_are_counted_per_main_component() {
        let instance = |id: &str, main: &str| {
            Node::new(id, "Instance", NodeKind::Instance).with_instance(InstanceInfo {
                main_component: Some(MainComponentRef {
                    id: NodeId::from(format!("main:{main}")),
                    name: main.to_string(),
                }),
                overrides: Vec::new(),
            })
        };
        let nodes = [
            instance("1", "Button"),
            instance("2", "Avatar"),
            instance("3", "Button"),
            Node::new("4", "Loose", NodeKind::Instance),
        ];

        let mut aggregator = UsageAggregator::new(ComponentPolicy::Minimal);
        record_all(&mut aggregator, &nodes);
        let usage = aggregator.finish(&VariableCache::new()).component_usage;

        assert_eq!(usage.iter().collect::<Vec<_>>(), [("Button", 2), ("Avatar", 1)]);
        assert_eq!(
            serde_json::to_string(&usage).unwrap(),
            r#"{"Button":2,"Avatar":1}"#
        );
    }
}
