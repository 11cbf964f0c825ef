//! Variables, collections, and the references emitted in results

use crate::utils::Rgba;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque variable identifier assigned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(String);

impl VariableId {
    /// Wrap a host identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariableId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for VariableId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Reference from a paint or value to a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableAlias {
    /// Always `VARIABLE_ALIAS` on the wire
    #[serde(rename = "type", default = "alias_tag")]
    pub tag: String,
    /// Target variable
    pub id: VariableId,
}

fn alias_tag() -> String {
    "VARIABLE_ALIAS".to_string()
}

impl VariableAlias {
    /// Create an alias pointing at `id`.
    #[must_use]
    pub fn new(id: impl Into<VariableId>) -> Self {
        Self {
            tag: alias_tag(),
            id: id.into(),
        }
    }
}

/// Type a variable resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolvedType {
    Boolean,
    Float,
    String,
    Color,
}

/// Value of a variable in one mode.
///
/// Untagged on the wire; an object with `r`, `g`, `b` is a color and an
/// object with `id` is an alias to another variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Color(Rgba),
    Alias(VariableAlias),
    Boolean(bool),
    Float(f64),
    String(String),
}

impl VariableValue {
    /// Color payload if this value is a literal color.
    #[must_use]
    pub const fn as_color(&self) -> Option<Rgba> {
        match self {
            Self::Color(color) => Some(*color),
            _ => None,
        }
    }
}

/// A design variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: VariableId,
    /// Stable key used to import the variable from a library
    pub key: String,
    pub name: String,
    pub resolved_type: ResolvedType,
    pub variable_collection_id: String,
    /// Values keyed by mode id
    #[serde(default)]
    pub values_by_mode: BTreeMap<String, VariableValue>,
    /// Whether the variable comes from a library rather than this document
    #[serde(default)]
    pub remote: bool,
}

impl Variable {
    /// Value for `mode_id`, if set.
    #[must_use]
    pub fn value_for_mode(&self, mode_id: &str) -> Option<&VariableValue> {
        self.values_by_mode.get(mode_id)
    }
}

/// One mode of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableMode {
    pub mode_id: String,
    pub name: String,
}

/// Named group of variables sharing a set of modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableCollection {
    pub id: String,
    pub name: String,
    /// Ordered modes; the first one is the default mode
    #[serde(default)]
    pub modes: Vec<VariableMode>,
    #[serde(default)]
    pub variable_ids: Vec<VariableId>,
    #[serde(default)]
    pub remote: bool,
}

impl VariableCollection {
    /// First mode of the collection.
    #[must_use]
    pub fn default_mode(&self) -> Option<&VariableMode> {
        self.modes.first()
    }
}

/// Variable summary returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableRef {
    pub id: VariableId,
    pub key: String,
    pub name: String,
    /// Name of the owning collection
    pub collection: String,
    pub is_remote: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_name: Option<String>,
}

impl VariableRef {
    /// Build a reference from a variable and the name of its collection.
    #[must_use]
    pub fn from_variable(variable: &Variable, collection: impl Into<String>) -> Self {
        let collection = collection.into();
        let library_name = variable.remote.then(|| collection.clone());
        Self {
            id: variable.id.clone(),
            key: variable.key.clone(),
            name: variable.name.clone(),
            collection,
            is_remote: variable.remote,
            library_name,
        }
    }
}

/// Named shared style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleInfo {
    pub name: String,
}
