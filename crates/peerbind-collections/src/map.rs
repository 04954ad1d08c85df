//! Associative map
//!
//! Keys are compared by `Eq` and hashed with `FxHash`. A key maps to at
//! most one value; iteration order is unspecified and may change after any
//! structural mutation.

use crate::list::List;
use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::Hash;

/// Key/value association with at most one value per key
#[derive(Clone)]
pub struct Map<K, V> {
    entries: FxHashMap<K, V>,
}

impl<K: Eq + Hash, V> Map<K, V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Build a map from explicit `(key, value)` pairs
    ///
    /// When a key repeats, the last pair wins.
    pub fn from_tuple<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    /// Get the value bound to `key`
    pub fn at(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Get a mutable reference to the value bound to `key`
    pub fn at_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    /// Check if `key` is bound
    pub fn has_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Bind `key` to `value`, returning the value it replaced
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Unbind `key`; missing keys are a no-op
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }

    /// Remove every binding
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of live keys
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map has no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    /// Iterate over values in unspecified order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }
}

impl<K: Eq + Hash + Clone, V> Map<K, V> {
    /// Snapshot of the current keys, in unspecified order
    pub fn key_list(&self) -> List<K> {
        self.entries.keys().cloned().collect()
    }
}

impl<V> Map<usize, V> {
    /// Build a map keyed by position: the first value is bound to `1`
    pub fn from_array<I>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        values
            .into_iter()
            .enumerate()
            .map(|(offset, value)| (offset + 1, value))
            .collect()
    }
}

impl<K: Eq + Hash, V> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V: PartialEq> PartialEq for Map<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq + Hash, V: Eq> Eq for Map<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Map<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for Map<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_tuple(iter)
    }
}

impl<K: Eq + Hash, V> Extend<(K, V)> for Map<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl<K, V> IntoIterator for Map<K, V> {
    type Item = (K, V);
    type IntoIter = std::collections::hash_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_creation() {
        let map: Map<String, i32> = Map::new();
        assert_eq!(map.count(), 0);
        assert!(map.is_empty());
    }

    #[test]
    fn test_map_set_and_at() {
        let mut map = Map::new();
        assert_eq!(map.set("width", 640), None);
        assert_eq!(map.set("width", 800), Some(640));
        assert_eq!(map.at(&"width"), Some(&800));
        assert!(map.has_key(&"width"));
        assert_eq!(map.at(&"height"), None);
        assert_eq!(map.count(), 1);
    }

    #[test]
    fn test_map_remove_missing_is_noop() {
        let mut map = Map::from_tuple(vec![("a", 1)]);
        assert_eq!(map.remove(&"b"), None);
        assert_eq!(map.count(), 1);
        assert_eq!(map.remove(&"a"), Some(1));
        assert!(!map.has_key(&"a"));
    }

    #[test]
    fn test_map_from_array_keys_are_positions() {
        let map = Map::from_array(vec!["red", "green", "blue"]);
        assert_eq!(map.count(), 3);
        assert_eq!(map.at(&1), Some(&"red"));
        assert_eq!(map.at(&3), Some(&"blue"));
        assert_eq!(map.at(&0), None);
    }

    #[test]
    fn test_map_from_tuple_last_pair_wins() {
        let map = Map::from_tuple(vec![("k", 1), ("k", 2)]);
        assert_eq!(map.count(), 1);
        assert_eq!(map.at(&"k"), Some(&2));
    }

    #[test]
    fn test_map_key_list_snapshot() {
        let mut map = Map::from_tuple(vec![(1, 'a'), (2, 'b'), (3, 'c')]);
        let mut keys = map.key_list();
        map.clear();

        keys.sort();
        assert_eq!(keys.as_slice(), &[1, 2, 3]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_map_iter() {
        let map = Map::from_tuple(vec![("b", 2), ("a", 1)]);
        let mut pairs: Vec<(&str, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        pairs.sort();
        assert_eq!(pairs, vec![("a", 1), ("b", 2)]);
        assert_eq!(Map::<&str, i32>::new().iter().count(), 0);
    }

    #[test]
    fn test_map_values() {
        let mut map = Map::from_array(vec!['z', 'x', 'y']);
        map.remove(&2);
        let mut values: Vec<char> = map.values().copied().collect();
        values.sort();
        assert_eq!(values, vec!['y', 'z']);
    }
}
