//! Per-request variable lookup cache
//!
//! Created fresh for every analysis and dropped with it. Store failures are
//! logged and remembered as misses so one broken variable never fails the
//! analysis or gets retried for every fill that references it.

use crate::document::{VariableId, VariableRef, VariableStore};
use crate::utils::{create_hash_map, Result};
use ahash::RandomState;
use std::collections::HashMap;
use tracing::{trace, warn};

/// Name of a collection, falling back to its id when the store has no record.
pub(crate) async fn collection_name<S>(store: &S, id: &str) -> Result<String>
where
    S: VariableStore + ?Sized,
{
    Ok(store
        .collection(id)
        .await?
        .map_or_else(|| id.to_string(), |collection| collection.name))
}

/// Variable references resolved during one request.
#[derive(Debug)]
pub struct VariableCache {
    variables: HashMap<VariableId, Option<VariableRef>, RandomState>,
    collections: HashMap<String, String, RandomState>,
}

impl Default for VariableCache {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            variables: create_hash_map(),
            collections: create_hash_map(),
        }
    }

    /// Cached reference for `id`, `None` if unresolved or missing.
    #[must_use]
    pub fn get(&self, id: &VariableId) -> Option<&VariableRef> {
        self.variables.get(id).and_then(Option::as_ref)
    }

    /// Whether `id` has been looked up already.
    #[must_use]
    pub fn contains(&self, id: &VariableId) -> bool {
        self.variables.contains_key(id)
    }

    /// Number of ids looked up so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether nothing has been looked up yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Record a lookup result directly.
    pub fn insert(&mut self, id: VariableId, reference: Option<VariableRef>) {
        self.variables.insert(id, reference);
    }

    /// Look up every id not seen before.
    pub async fn resolve<'i, S, I>(&mut self, store: &S, ids: I)
    where
        S: VariableStore + ?Sized,
        I: IntoIterator<Item = &'i VariableId>,
    {
        for id in ids {
            if self.contains(id) {
                continue;
            }
            let reference = match self.lookup(store, id).await {
                Ok(reference) => reference,
                Err(err) => {
                    warn!(variable_id = %id, error = %err, "variable lookup failed");
                    None
                }
            };
            trace!(variable_id = %id, found = reference.is_some(), "resolved variable");
            self.variables.insert(id.clone(), reference);
        }
    }

    async fn lookup<S>(&mut self, store: &S, id: &VariableId) -> Result<Option<VariableRef>>
    where
        S: VariableStore + ?Sized,
    {
        let Some(variable) = store.variable(id).await? else {
            return Ok(None);
        };

        let collection = if let Some(name) = self.collections.get(&variable.variable_collection_id) {
            name.clone()
        } else {
            let name = collection_name(store, &variable.variable_collection_id).await?;
            self.collections
                .insert(variable.variable_collection_id.clone(), name.clone());
            name
        };

        Ok(Some(VariableRef::from_variable(&variable, collection)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        MemoryVariableStore, ResolvedType, Variable, VariableCollection, VariableValue,
    };
    use crate::utils::CoreError;
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    fn store() -> MemoryVariableStore {
        let store = MemoryVariableStore::new();
        store.insert_collection(VariableCollection {
            id: "C:1".to_string(),
            name: "Brand".to_string(),
            modes: Vec::new(),
            variable_ids: Vec::new(),
            remote: false,
        });
        store.insert_variable(Variable {
            id: VariableId::new("V:1"),
            key: "red".to_string(),
            name: "Red/500".to_string(),
            resolved_type: ResolvedType::Color,
            variable_collection_id: "C:1".to_string(),
            values_by_mode: BTreeMap::new(),
            remote: false,
        });
        store
    }

    #[tokio::test]
    async fn resolves_and_remembers_misses() {
        let store = store();
        let mut cache = VariableCache::new();
        let ids = [VariableId::new("V:1"), VariableId::new("V:missing")];
        cache.resolve(&store, ids.iter()).await;

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&ids[0]).map(|v| v.collection.as_str()), Some("Brand"));
        assert!(cache.contains(&ids[1]));
        assert!(cache.get(&ids[1]).is_none());
    }

    struct BrokenStore;

    #[async_trait]
    impl VariableStore for BrokenStore {
        async fn collections(&self) -> Result<Vec<VariableCollection>> {
            Err(CoreError::store("offline"))
        }
        async fn collection(&self, _id: &str) -> Result<Option<VariableCollection>> {
            Err(CoreError::store("offline"))
        }
        async fn variable(&self, _id: &VariableId) -> Result<Option<Variable>> {
            Err(CoreError::store("offline"))
        }
        async fn local_variable_by_key(&self, _key: &str) -> Result<Option<Variable>> {
            Err(CoreError::store("offline"))
        }
        async fn create_collection(&self, _name: &str) -> Result<VariableCollection> {
            Err(CoreError::store("offline"))
        }
        async fn create_variable(
            &self,
            _name: &str,
            _collection_id: &str,
            _resolved_type: ResolvedType,
        ) -> Result<Variable> {
            Err(CoreError::store("offline"))
        }
        async fn set_value(&self, _id: &VariableId, _mode: &str, _value: VariableValue) -> Result<()> {
            Err(CoreError::store("offline"))
        }
        async fn import_by_key(&self, _key: &str) -> Result<Variable> {
            Err(CoreError::store("offline"))
        }
    }

    #[tokio::test]
    async fn store_failures_become_misses() {
        let mut cache = VariableCache::new();
        let id = VariableId::new("V:1");
        cache.resolve(&BrokenStore, [&id]).await;
        assert!(cache.contains(&id));
        assert!(cache.get(&id).is_none());
    }

    #[tokio::test]
    async fn missing_collection_falls_back_to_id() {
        let store = MemoryVariableStore::new();
        store.insert_variable(Variable {
            id: VariableId::new("V:9"),
            key: "orphan".to_string(),
            name: "Orphan".to_string(),
            resolved_type: ResolvedType::Color,
            variable_collection_id: "C:gone".to_string(),
            values_by_mode: BTreeMap::new(),
            remote: false,
        });

        let mut cache = VariableCache::new();
        let id = VariableId::new("V:9");
        cache.resolve(&store, [&id]).await;
        assert_eq!(cache.get(&id).map(|v| v.collection.as_str()), Some("C:gone"));
    }
}
