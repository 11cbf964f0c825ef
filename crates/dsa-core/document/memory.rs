//! In-memory host implementations
//!
//! Used by the CLI (documents loaded from JSON fixtures) and by tests.

use super::host::{DocumentHost, PreferenceStore, VariableStore};
use super::node::{Node, NodeCapabilities, NodeId};
use super::paint::Paint;
use super::variable::{
    ResolvedType, StyleInfo, Variable, VariableCollection, VariableId, VariableMode, VariableValue,
};
use crate::utils::{create_hash_map, CoreError, Result};
use ahash::RandomState;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Document tree held in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryDocument {
    /// Top-level nodes of the page
    #[serde(default)]
    pub children: Vec<Node>,
    /// Selected node ids, in selection order
    #[serde(default)]
    pub selection: Vec<NodeId>,
    /// Shared text styles by id
    #[serde(default)]
    pub styles: BTreeMap<String, StyleInfo>,
}

impl MemoryDocument {
    /// Create a document whose top-level nodes are all selected.
    #[must_use]
    pub fn new(children: Vec<Node>) -> Self {
        let selection = children.iter().map(|node| node.id.clone()).collect();
        Self {
            children,
            selection,
            styles: BTreeMap::new(),
        }
    }

    /// Replace the selection.
    #[must_use]
    pub fn with_selection<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        self.selection = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Register a shared text style.
    #[must_use]
    pub fn with_style(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.styles.insert(id.into(), StyleInfo { name: name.into() });
        self
    }

    /// Find a node anywhere in the document.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        let mut stack: Vec<&Node> = self.children.iter().collect();
        while let Some(node) = stack.pop() {
            if node.id == *id {
                return Some(node);
            }
            stack.extend(node.children.iter());
        }
        None
    }

    fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        let mut stack: Vec<&mut Node> = self.children.iter_mut().collect();
        while let Some(node) = stack.pop() {
            if node.id == *id {
                return Some(node);
            }
            stack.extend(node.children.iter_mut());
        }
        None
    }
}

impl DocumentHost for MemoryDocument {
    fn selection(&self) -> Vec<Node> {
        self.selection
            .iter()
            .filter_map(|id| {
                let node = self.node(id).cloned();
                if node.is_none() {
                    tracing::debug!(node_id = %id, "selected node not found in document");
                }
                node
            })
            .collect()
    }

    fn style_by_id(&self, id: &str) -> Option<StyleInfo> {
        self.styles.get(id).cloned()
    }

    fn set_fills(&mut self, id: &NodeId, fills: Vec<Paint>) -> Result<()> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| CoreError::host(format!("Node {id} not found")))?;

        if node.locked {
            return Err(CoreError::host(format!("Node {id} is locked")));
        }
        if !node.capabilities().contains(NodeCapabilities::FILLS) {
            return Err(CoreError::host(format!("{} nodes have no fills", node.kind)));
        }

        node.fills = Some(fills);
        Ok(())
    }
}

/// Serializable contents of a [`MemoryVariableStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableSnapshot {
    /// Local collections
    #[serde(default)]
    pub collections: Vec<VariableCollection>,
    /// Local and already imported variables
    #[serde(default)]
    pub variables: Vec<Variable>,
    /// Collections of enabled libraries
    #[serde(default)]
    pub library_collections: Vec<VariableCollection>,
    /// Variables available for import
    #[serde(default)]
    pub library: Vec<Variable>,
}

#[derive(Debug, Default)]
struct StoreState {
    snapshot: VariableSnapshot,
    next_id: u64,
}

impl StoreState {
    fn fresh_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_id += 1;
            let id = format!("{prefix}:{}", self.next_id);
            let taken = self.snapshot.collections.iter().any(|c| c.id == id)
                || self.snapshot.variables.iter().any(|v| v.id.as_str() == id);
            if !taken {
                return id;
            }
        }
    }

    fn fresh_key(&mut self) -> String {
        loop {
            let key = format!("local-{}", self.next_id);
            let taken = self.snapshot.variables.iter().any(|v| v.key == key)
                || self.snapshot.library.iter().any(|v| v.key == key);
            if !taken {
                return key;
            }
            self.next_id += 1;
        }
    }

    fn variable_mut(&mut self, id: &VariableId) -> Option<&mut Variable> {
        self.snapshot.variables.iter_mut().find(|v| v.id == *id)
    }
}

/// Variable store held in memory.
#[derive(Debug, Default)]
pub struct MemoryVariableStore {
    state: RwLock<StoreState>,
}

impl MemoryVariableStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from saved contents.
    #[must_use]
    pub fn from_snapshot(snapshot: VariableSnapshot) -> Self {
        Self {
            state: RwLock::new(StoreState {
                snapshot,
                next_id: 0,
            }),
        }
    }

    /// Copy out the current contents.
    #[must_use]
    pub fn snapshot(&self) -> VariableSnapshot {
        self.state.read().snapshot.clone()
    }

    /// Add a local collection.
    pub fn insert_collection(&self, collection: VariableCollection) {
        self.state.write().snapshot.collections.push(collection);
    }

    /// Add a local variable and register it with its collection.
    pub fn insert_variable(&self, variable: Variable) {
        let mut state = self.state.write();
        if let Some(collection) = state
            .snapshot
            .collections
            .iter_mut()
            .find(|c| c.id == variable.variable_collection_id)
        {
            collection.variable_ids.push(variable.id.clone());
        }
        state.snapshot.variables.push(variable);
    }

    /// Publish a variable in a library so it can be imported by key.
    pub fn publish(&self, collection: VariableCollection, variable: Variable) {
        let mut state = self.state.write();
        if !state
            .snapshot
            .library_collections
            .iter()
            .any(|c| c.id == collection.id)
        {
            state.snapshot.library_collections.push(collection);
        }
        state.snapshot.library.push(variable);
    }
}

#[async_trait]
impl VariableStore for MemoryVariableStore {
    async fn collections(&self) -> Result<Vec<VariableCollection>> {
        Ok(self.state.read().snapshot.collections.clone())
    }

    async fn collection(&self, id: &str) -> Result<Option<VariableCollection>> {
        let state = self.state.read();
        Ok(state
            .snapshot
            .collections
            .iter()
            .chain(state.snapshot.library_collections.iter())
            .find(|c| c.id == id)
            .cloned())
    }

    async fn variable(&self, id: &VariableId) -> Result<Option<Variable>> {
        Ok(self
            .state
            .read()
            .snapshot
            .variables
            .iter()
            .find(|v| v.id == *id)
            .cloned())
    }

    async fn local_variable_by_key(&self, key: &str) -> Result<Option<Variable>> {
        Ok(self
            .state
            .read()
            .snapshot
            .variables
            .iter()
            .find(|v| !v.remote && v.resolved_type == ResolvedType::Color && v.key == key)
            .cloned())
    }

    async fn create_collection(&self, name: &str) -> Result<VariableCollection> {
        let mut state = self.state.write();
        let id = state.fresh_id("VariableCollectionId");
        let collection = VariableCollection {
            modes: vec![VariableMode {
                mode_id: format!("{id}:mode"),
                name: "Mode 1".to_string(),
            }],
            id,
            name: name.to_string(),
            variable_ids: Vec::new(),
            remote: false,
        };
        state.snapshot.collections.push(collection.clone());
        Ok(collection)
    }

    async fn create_variable(
        &self,
        name: &str,
        collection_id: &str,
        resolved_type: ResolvedType,
    ) -> Result<Variable> {
        let mut state = self.state.write();
        if !state.snapshot.collections.iter().any(|c| c.id == collection_id) {
            return Err(CoreError::store(format!(
                "Collection {collection_id} not found"
            )));
        }

        let id = VariableId::new(state.fresh_id("VariableID"));
        let variable = Variable {
            key: state.fresh_key(),
            id: id.clone(),
            name: name.to_string(),
            resolved_type,
            variable_collection_id: collection_id.to_string(),
            values_by_mode: BTreeMap::new(),
            remote: false,
        };

        if let Some(collection) = state
            .snapshot
            .collections
            .iter_mut()
            .find(|c| c.id == collection_id)
        {
            collection.variable_ids.push(id);
        }
        state.snapshot.variables.push(variable.clone());
        Ok(variable)
    }

    async fn set_value(&self, id: &VariableId, mode_id: &str, value: VariableValue) -> Result<()> {
        let mut state = self.state.write();
        let variable = state
            .variable_mut(id)
            .ok_or_else(|| CoreError::store(format!("Variable {id} not found")))?;
        variable.values_by_mode.insert(mode_id.to_string(), value);
        Ok(())
    }

    async fn import_by_key(&self, key: &str) -> Result<Variable> {
        let mut state = self.state.write();
        if let Some(imported) = state
            .snapshot
            .variables
            .iter()
            .find(|v| v.remote && v.key == key)
        {
            return Ok(imported.clone());
        }

        let mut variable = state
            .snapshot
            .library
            .iter()
            .find(|v| v.key == key)
            .cloned()
            .ok_or_else(|| CoreError::store(format!("No library variable with key {key}")))?;
        variable.remote = true;
        state.snapshot.variables.push(variable.clone());
        Ok(variable)
    }
}

/// Preference store held in memory.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String, RandomState>>,
}

impl MemoryPreferences {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Mutex::new(create_hash_map()),
        }
    }

    /// Create a store pre-filled with values.
    #[must_use]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let store = Self::new();
        store.values.lock().extend(entries);
        store
    }

    /// Copy out all values in key order.
    #[must_use]
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.values
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
