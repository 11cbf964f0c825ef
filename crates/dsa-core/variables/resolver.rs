//! Color-to-variable workflows
//!
//! - [`VariableResolver::find_by_color`] searches local collections for color
//!   variables whose default-mode value matches a hex within tolerance.
//! - [`VariableResolver::create_for_color`] creates a new color variable,
//!   choosing a collection and remembering the choice.
//! - [`VariableResolver::bind_color`] rebinds every solid fill with exactly
//!   that hex to a variable, importing it from a library when needed.
//!
//! Binding resolves the variable once before touching the document, so a
//! failed import leaves every node unchanged.

use super::cache::collection_name;
use crate::analysis::walk;
use crate::document::{
    DocumentHost, Node, NodeId, Paint, PaintSlot, PreferenceStore, ResolvedType, Variable,
    VariableCollection, VariableRef, VariableStore, VariableValue,
};
use crate::utils::{
    colors_match, hex_to_rgb, normalize_hex, rgb_to_hex, CoreError, Result, COLOR_TOLERANCE,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Configuration for variable creation and matching.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Collection created when the document has none
    pub default_collection_name: String,

    /// Prefix of generated variable names, followed by a 1-based index
    pub variable_name_prefix: String,

    /// Preference key holding the last used collection name
    pub last_used_collection_key: String,

    /// Per-channel tolerance when matching variable values
    pub tolerance: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_collection_name: "Colors".to_string(),
            variable_name_prefix: "color-".to_string(),
            last_used_collection_key: "lastUsedCollection".to_string(),
            tolerance: COLOR_TOLERANCE,
        }
    }
}

impl ResolverConfig {
    /// Set matching tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the name of the collection created on demand.
    #[must_use]
    pub fn with_default_collection_name(mut self, name: impl Into<String>) -> Self {
        self.default_collection_name = name.into();
        self
    }

    /// Set the generated variable name prefix.
    #[must_use]
    pub fn with_variable_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.variable_name_prefix = prefix.into();
        self
    }
}

/// Outcome of a bind operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindReport {
    /// Variable the fills now reference
    pub variable: VariableRef,
    /// Distinct nodes walked
    pub nodes_visited: usize,
    /// Nodes whose fills were written
    pub nodes_updated: usize,
    /// Fills rebound across all written nodes
    pub fills_rebound: usize,
    /// Nodes the host refused to write
    pub failed_nodes: Vec<NodeId>,
}

/// Variable workflows over a store and a preference store.
#[derive(Debug)]
pub struct VariableResolver<'a, S: ?Sized, P: ?Sized> {
    store: &'a S,
    prefs: &'a P,
    config: ResolverConfig,
}

impl<'a, S, P> VariableResolver<'a, S, P>
where
    S: VariableStore + ?Sized,
    P: PreferenceStore + ?Sized,
{
    /// Create a resolver with default configuration.
    pub fn new(store: &'a S, prefs: &'a P) -> Self {
        Self {
            store,
            prefs,
            config: ResolverConfig::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Color variables whose default-mode value matches `hex`.
    ///
    /// An empty result means no variable matched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHex`] for malformed input and propagates
    /// store failures.
    pub async fn find_by_color(&self, hex: &str) -> Result<Vec<VariableRef>> {
        let target = hex_to_rgb(hex)?;
        let mut matches = Vec::new();

        for collection in self.store.collections().await? {
            let Some(mode) = collection.default_mode() else {
                continue;
            };
            for id in &collection.variable_ids {
                let Some(variable) = self.store.variable(id).await? else {
                    continue;
                };
                if variable.resolved_type != ResolvedType::Color {
                    continue;
                }
                let value = variable
                    .value_for_mode(&mode.mode_id)
                    .and_then(VariableValue::as_color);
                if let Some(value) = value {
                    if value.is_finite() && colors_match(value.rgb(), target, self.config.tolerance) {
                        matches.push(VariableRef::from_variable(&variable, collection.name.as_str()));
                    }
                }
            }
        }

        debug!(hex, matches = matches.len(), "searched variables by color");
        Ok(matches)
    }

    /// Create a color variable valued `hex`.
    ///
    /// With no collections a default one is created; with exactly one it is
    /// used; with several, `preferred` wins if it names one, then the
    /// remembered collection, then the first. The choice is remembered.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHex`] for malformed input and propagates
    /// store failures.
    pub async fn create_for_color(&self, hex: &str, preferred: Option<&str>) -> Result<VariableRef> {
        let rgb = hex_to_rgb(hex)?;
        let mut collections = self.store.collections().await?;

        let collection = match collections.len() {
            0 => {
                info!(name = %self.config.default_collection_name, "creating default collection");
                self.store
                    .create_collection(&self.config.default_collection_name)
                    .await?
            }
            1 => collections.remove(0),
            _ => self.choose_collection(collections, preferred).await,
        };

        let mode_id = collection
            .default_mode()
            .map(|mode| mode.mode_id.clone())
            .ok_or_else(|| CoreError::store(format!("Collection {} has no modes", collection.name)))?;

        let name = format!(
            "{}{}",
            self.config.variable_name_prefix,
            collection.variable_ids.len() + 1
        );
        let variable = self
            .store
            .create_variable(&name, &collection.id, ResolvedType::Color)
            .await?;
        self.store
            .set_value(&variable.id, &mode_id, VariableValue::Color(rgb.with_alpha(1.0)))
            .await?;

        info!(variable = %variable.name, collection = %collection.name, hex, "created color variable");
        Ok(VariableRef::from_variable(&variable, collection.name))
    }

    async fn choose_collection(
        &self,
        mut collections: Vec<VariableCollection>,
        preferred: Option<&str>,
    ) -> VariableCollection {
        let key = &self.config.last_used_collection_key;
        let position = |name: &str| collections.iter().position(|c| c.name == name);

        let mut index = preferred.and_then(position);
        if index.is_none() {
            match self.prefs.get(key).await {
                Ok(remembered) => index = remembered.as_deref().and_then(position),
                Err(err) => warn!(error = %err, "could not read last used collection"),
            }
        }

        let collection = collections.swap_remove(index.unwrap_or(0));
        if let Err(err) = self.prefs.set(key, &collection.name).await {
            warn!(error = %err, "could not remember last used collection");
        }
        collection
    }

    /// Rebind every solid fill with exactly `hex` under `roots` to the
    /// variable with `key`.
    ///
    /// Fills already bound to that variable and all other fills are left
    /// as they are. Only nodes with at least one rebound fill are written.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptySelection`] for no roots,
    /// [`CoreError::InvalidHex`] for malformed input, and
    /// [`CoreError::VariableImportFailed`] when the key resolves to nothing;
    /// in every error case the document is untouched.
    pub async fn bind_color<H>(
        &self,
        host: &mut H,
        roots: &[Node],
        hex: &str,
        key: &str,
    ) -> Result<BindReport>
    where
        H: DocumentHost + ?Sized,
    {
        if roots.is_empty() {
            return Err(CoreError::EmptySelection);
        }
        let target = normalize_hex(hex)?;
        let variable = self.resolve_key(key).await?;
        let collection = collection_name(self.store, &variable.variable_collection_id).await?;

        let mut rewrites: Vec<(NodeId, Vec<Paint>, usize)> = Vec::new();
        let stats = {
            let reader: &H = host;
            walk(roots, |node| {
                let mut rebound = 0;
                let fills: Vec<Paint> = node
                    .fill_paints()
                    .iter()
                    .map(|paint| match paint {
                        Paint::Solid(solid)
                            if solid.color.is_finite()
                                && rgb_to_hex(solid.color) == target
                                && solid.bound_color() != Some(&variable.id) =>
                        {
                            rebound += 1;
                            Paint::Solid(reader.bind_paint_variable(solid, PaintSlot::Color, &variable))
                        }
                        other => other.clone(),
                    })
                    .collect();
                if rebound > 0 {
                    rewrites.push((node.id.clone(), fills, rebound));
                }
                Ok(())
            })
        };

        let mut report = BindReport {
            variable: VariableRef::from_variable(&variable, collection),
            nodes_visited: stats.visited,
            nodes_updated: 0,
            fills_rebound: 0,
            failed_nodes: Vec::new(),
        };

        for (node_id, fills, rebound) in rewrites {
            match host.set_fills(&node_id, fills) {
                Ok(()) => {
                    report.nodes_updated += 1;
                    report.fills_rebound += rebound;
                }
                Err(err) => {
                    warn!(node_id = %node_id, error = %err, "could not rebind fills");
                    report.failed_nodes.push(node_id);
                }
            }
        }

        info!(
            variable = %report.variable.name,
            hex = %target,
            nodes = report.nodes_updated,
            fills = report.fills_rebound,
            failed = report.failed_nodes.len(),
            "bound color to variable"
        );
        Ok(report)
    }

    async fn resolve_key(&self, key: &str) -> Result<Variable> {
        if let Some(local) = self.store.local_variable_by_key(key).await? {
            return Ok(local);
        }

        match self.store.import_by_key(key).await {
            Ok(variable) => {
                info!(key, variable = %variable.name, "imported library variable");
                Ok(variable)
            }
            Err(err) => Err(CoreError::VariableImportFailed {
                key: key.to_string(),
                reason: err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        MemoryDocument, MemoryPreferences, MemoryVariableStore, NodeKind, SolidPaint, VariableId,
        VariableMode,
    };
    use crate::utils::{Rgb, Rgba};
    use std::collections::BTreeMap;

    fn collection(id: &str, name: &str) -> VariableCollection {
        VariableCollection {
            id: id.to_string(),
            name: name.to_string(),
            modes: vec![VariableMode {
                mode_id: format!("{id}:m"),
                name: "Light".to_string(),
            }],
            variable_ids: Vec::new(),
            remote: false,
        }
    }

    fn color_variable(id: &str, collection: &VariableCollection, value: Rgba) -> Variable {
        let mut values_by_mode = BTreeMap::new();
        values_by_mode.insert(collection.modes[0].mode_id.clone(), VariableValue::Color(value));
        Variable {
            id: VariableId::new(id),
            key: format!("key-{id}"),
            name: format!("Color/{id}"),
            resolved_type: ResolvedType::Color,
            variable_collection_id: collection.id.clone(),
            values_by_mode,
            remote: false,
        }
    }

    #[tokio::test]
    async fn find_skips_non_color_and_alias_values() {
        let store = MemoryVariableStore::new();
        let brand = collection("C:1", "Brand");
        store.insert_collection(brand.clone());
        store.insert_variable(color_variable("V:1", &brand, Rgb::new(1.0, 0.0, 0.0).with_alpha(1.0)));

        let mut spacing = color_variable("V:2", &brand, Rgb::new(1.0, 0.0, 0.0).with_alpha(1.0));
        spacing.resolved_type = ResolvedType::Float;
        store.insert_variable(spacing);

        let mut alias = color_variable("V:3", &brand, Rgb::new(0.0, 0.0, 0.0).with_alpha(1.0));
        alias.values_by_mode.insert(
            "C:1:m".to_string(),
            VariableValue::Alias(crate::document::VariableAlias::new("V:1")),
        );
        store.insert_variable(alias);

        let prefs = MemoryPreferences::new();
        let found = VariableResolver::new(&store, &prefs).find_by_color("#FF0000").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Color/V:1");
        assert_eq!(found[0].collection, "Brand");
    }

    #[tokio::test]
    async fn find_rejects_bad_hex() {
        let store = MemoryVariableStore::new();
        let prefs = MemoryPreferences::new();
        let err = VariableResolver::new(&store, &prefs).find_by_color("red").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidHex(_)));
    }

    #[tokio::test]
    async fn find_matches_within_channel_tolerance() {
        let store = MemoryVariableStore::new();
        let brand = collection("C:1", "Brand");
        store.insert_collection(brand.clone());
        store.insert_variable(color_variable("V:near", &brand, Rgb::new(0.9995, 0.0, 0.0).with_alpha(1.0)));
        store.insert_variable(color_variable("V:off", &brand, Rgb::new(0.998, 0.0, 0.0).with_alpha(1.0)));
        store.insert_variable(color_variable("V:far", &brand, Rgb::new(0.9, 0.0, 0.0).with_alpha(1.0)));
        let prefs = MemoryPreferences::new();

        let found = VariableResolver::new(&store, &prefs).find_by_color("#FF0000").await.unwrap();
        let names: Vec<_> = found.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["Color/V:near"]);

        let loose = VariableResolver::new(&store, &prefs)
            .with_config(ResolverConfig::default().with_tolerance(0.0025))
            .find_by_color("#FF0000")
            .await
            .unwrap();
        let names: Vec<_> = loose.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["Color/V:near", "Color/V:off"]);
    }

    #[tokio::test]
    async fn find_rejects_distant_colors_at_default_tolerance() {
        let store = MemoryVariableStore::new();
        let brand = collection("C:1", "Brand");
        store.insert_collection(brand.clone());
        store.insert_variable(color_variable("V:off", &brand, Rgb::new(0.998, 0.0, 0.0).with_alpha(1.0)));
        store.insert_variable(color_variable("V:far", &brand, Rgb::new(0.9, 0.0, 0.0).with_alpha(1.0)));
        let prefs = MemoryPreferences::new();

        let found = VariableResolver::new(&store, &prefs).find_by_color("#FF0000").await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn create_makes_default_collection_when_none_exist() {
        let store = MemoryVariableStore::new();
        let prefs = MemoryPreferences::new();
        let created = VariableResolver::new(&store, &prefs)
            .create_for_color("#00ff00", None)
            .await
            .unwrap();

        assert_eq!(created.collection, "Colors");
        assert_eq!(created.name, "color-1");
        let snapshot = store.snapshot();
        let mode = &snapshot.collections[0].modes[0].mode_id;
        assert_eq!(
            snapshot.variables[0].value_for_mode(mode),
            Some(&VariableValue::Color(Rgb::new(0.0, 1.0, 0.0).with_alpha(1.0)))
        );
        assert!(prefs.entries().is_empty());
    }

    #[tokio::test]
    async fn create_numbers_after_existing_variables() {
        let store = MemoryVariableStore::new();
        let brand = collection("C:1", "Brand");
        store.insert_collection(brand.clone());
        store.insert_variable(color_variable("V:1", &brand, Rgb::new(0.0, 0.0, 0.0).with_alpha(1.0)));

        let prefs = MemoryPreferences::new();
        let created = VariableResolver::new(&store, &prefs)
            .create_for_color("#123456", None)
            .await
            .unwrap();
        assert_eq!(created.name, "color-2");
        assert_eq!(created.collection, "Brand");
    }

    #[tokio::test]
    async fn create_prefers_explicit_then_remembered_collection() {
        let store = MemoryVariableStore::new();
        store.insert_collection(collection("C:1", "Brand"));
        store.insert_collection(collection("C:2", "Product"));
        let prefs = MemoryPreferences::new();
        let resolver = VariableResolver::new(&store, &prefs);

        let first = resolver.create_for_color("#111111", None).await.unwrap();
        assert_eq!(first.collection, "Brand");

        let second = resolver.create_for_color("#222222", Some("Product")).await.unwrap();
        assert_eq!(second.collection, "Product");

        let third = resolver.create_for_color("#333333", Some("Missing")).await.unwrap();
        assert_eq!(third.collection, "Product");
        assert_eq!(third.name, "color-2");
        assert_eq!(
            prefs.get("lastUsedCollection").await.unwrap().as_deref(),
            Some("Product")
        );
    }

    #[tokio::test]
    async fn create_fails_for_collection_without_modes() {
        let store = MemoryVariableStore::new();
        let mut empty = collection("C:1", "Empty");
        empty.modes.clear();
        store.insert_collection(empty);
        let prefs = MemoryPreferences::new();

        let err = VariableResolver::new(&store, &prefs)
            .create_for_color("#000000", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::VariableStore(_)));
        assert!(store.snapshot().variables.is_empty());
    }

    #[tokio::test]
    async fn bind_skips_fills_already_bound_to_target() {
        let store = MemoryVariableStore::new();
        let brand = collection("C:1", "Brand");
        store.insert_collection(brand.clone());
        store.insert_variable(color_variable("V:1", &brand, Rgb::new(1.0, 0.0, 0.0).with_alpha(1.0)));
        let prefs = MemoryPreferences::new();

        let red = Rgb::new(1.0, 0.0, 0.0);
        let node = Node::new("1", "r", NodeKind::Rectangle)
            .with_fills(vec![Paint::Solid(SolidPaint::new(red).bound_to("V:1"))]);
        let mut doc = MemoryDocument::new(vec![node]);
        let roots = doc.selection();

        let report = VariableResolver::new(&store, &prefs)
            .bind_color(&mut doc, &roots, "#ff0000", "key-V:1")
            .await
            .unwrap();
        assert_eq!(report.nodes_visited, 1);
        assert_eq!(report.nodes_updated, 0);
        assert_eq!(report.variable.collection, "Brand");
    }

    #[tokio::test]
    async fn bind_requires_roots() {
        let store = MemoryVariableStore::new();
        let prefs = MemoryPreferences::new();
        let mut doc = MemoryDocument::default();
        let err = VariableResolver::new(&store, &prefs)
            .bind_color(&mut doc, &[], "#ff0000", "k")
            .await
            .unwrap_err();
        assert_eq!(err, CoreError::EmptySelection);
    }
}
