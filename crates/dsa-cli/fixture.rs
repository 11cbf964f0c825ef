//! On-disk document fixtures
//!
//! A fixture is one JSON file holding the document tree, the variable store
//! contents, and stored preferences. Commands that change the document or the
//! store can write the updated state back.

use anyhow::{Context, Result};
use dsa_core::document::{MemoryDocument, MemoryPreferences, MemoryVariableStore, VariableSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Serialized document, variables, and preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    #[serde(default)]
    pub document: MemoryDocument,
    #[serde(default)]
    pub variables: VariableSnapshot,
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,
}

impl Fixture {
    /// Read a fixture from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse fixture {}", path.display()))
    }

    /// Write the fixture to `path` as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("Failed to write fixture {}", path.display()))
    }

    /// Split into in-memory host and stores.
    pub fn into_parts(self) -> (MemoryDocument, MemoryVariableStore, MemoryPreferences) {
        (
            self.document,
            MemoryVariableStore::from_snapshot(self.variables),
            MemoryPreferences::from_entries(self.preferences),
        )
    }

    /// Collect state back from host and stores.
    pub fn from_parts(
        document: MemoryDocument,
        store: &MemoryVariableStore,
        prefs: &MemoryPreferences,
    ) -> Self {
        Self {
            document,
            variables: store.snapshot(),
            preferences: prefs.entries(),
        }
    }
}
