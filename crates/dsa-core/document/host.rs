//! Capability traits implemented by a document host
//!
//! The analyzer never talks to a concrete editor. It reads the selection and
//! writes fills through [`DocumentHost`], reads and creates variables through
//! [`VariableStore`], and remembers small per-user settings through
//! [`PreferenceStore`]. The store traits are async because real hosts answer
//! them over a message channel.

use super::node::{Node, NodeId};
use super::paint::{Paint, PaintSlot, SolidPaint};
use super::variable::{
    ResolvedType, StyleInfo, Variable, VariableAlias, VariableCollection, VariableId, VariableValue,
};
use crate::utils::Result;
use async_trait::async_trait;

/// Read access to the selection plus fill writes.
pub trait DocumentHost {
    /// Current selection roots in selection order.
    fn selection(&self) -> Vec<Node>;

    /// Look up a shared text style by id.
    fn style_by_id(&self, id: &str) -> Option<StyleInfo>;

    /// Replace the fill list of a node.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Host`] if the node is missing or refuses
    /// the write.
    fn set_fills(&mut self, node: &NodeId, fills: Vec<Paint>) -> Result<()>;

    /// Produce a copy of `paint` with `slot` bound to `variable`.
    fn bind_paint_variable(&self, paint: &SolidPaint, slot: PaintSlot, variable: &Variable) -> SolidPaint {
        let mut bound = paint.clone();
        match slot {
            PaintSlot::Color => bound.bound_variables.color = Some(VariableAlias::new(variable.id.clone())),
        }
        bound
    }
}

/// Variable and collection storage.
#[async_trait]
pub trait VariableStore: Send + Sync {
    /// Local collections in document order.
    async fn collections(&self) -> Result<Vec<VariableCollection>>;

    /// Look up any collection by id, including library collections.
    async fn collection(&self, id: &str) -> Result<Option<VariableCollection>>;

    /// Look up a variable by id, local or already imported.
    async fn variable(&self, id: &VariableId) -> Result<Option<Variable>>;

    /// Look up a local color variable by key.
    async fn local_variable_by_key(&self, key: &str) -> Result<Option<Variable>>;

    /// Create a collection with a single default mode.
    async fn create_collection(&self, name: &str) -> Result<VariableCollection>;

    /// Create a variable in a collection.
    async fn create_variable(
        &self,
        name: &str,
        collection_id: &str,
        resolved_type: ResolvedType,
    ) -> Result<Variable>;

    /// Set the value of a variable for one mode.
    async fn set_value(&self, variable: &VariableId, mode_id: &str, value: VariableValue) -> Result<()>;

    /// Import a library variable by key.
    async fn import_by_key(&self, key: &str) -> Result<Variable>;
}

/// Per-user key/value settings.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Read a value.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
