//! Hash container helpers
//!
//! Provides ahash-backed maps and sets for the per-request indexes (color
//! keys, visited node ids, cached variables). Iteration order of these
//! containers is never observable in results: every index that feeds a
//! result also keeps an insertion-ordered `Vec`.

use ahash::RandomState;
use std::collections::{HashMap, HashSet};

/// Create a new `HashMap` with the ahash hasher.
///
/// # Example
///
/// ```rust
/// use dsa_core::utils::hashers::create_hash_map;
///
/// let mut map = create_hash_map::<String, usize>();
/// map.insert("#ff0000".to_string(), 0);
/// ```
#[must_use]
pub fn create_hash_map<K, V>() -> HashMap<K, V, RandomState> {
    HashMap::with_hasher(RandomState::new())
}

/// Create a new `HashSet` with the ahash hasher.
#[must_use]
pub fn create_hash_set<T>() -> HashSet<T, RandomState> {
    HashSet::with_hasher(RandomState::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_map_creation() {
        let mut map = create_hash_map::<&str, i32>();
        map.insert("a", 1);
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn hash_set_deduplicates() {
        let mut set = create_hash_set::<&str>();
        assert!(set.insert("1:2"));
        assert!(!set.insert("1:2"));
        assert_eq!(set.len(), 1);
    }
}
