//! Role-keyed state maps.

use std::collections::HashMap;
use std::fmt;

use contracts::RoleName;
use parking_lot::RwLock;

/// Concurrent map from role to a cloneable value
///
/// Entries are created on first write and never removed. Values are handed
/// out by clone, so heavyweight state should be stored behind an `Arc`.
pub struct RoleMap<V> {
    entries: RwLock<HashMap<RoleName, V>>,
}

impl<V> Default for RoleMap<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> fmt::Debug for RoleMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleMap")
            .field("roles", &self.entries.read().len())
            .finish()
    }
}

impl<V: Clone> RoleMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing value for `role`, or the one produced by `make` after
    /// inserting it
    pub fn get_or_insert_with(&self, role: &str, make: impl FnOnce() -> V) -> V {
        if let Some(value) = self.entries.read().get(role) {
            return value.clone();
        }

        // Another writer may have won the race between the two locks
        self.entries
            .write()
            .entry(RoleName::new(role))
            .or_insert_with(make)
            .clone()
    }

    /// Last write wins
    pub fn insert(&self, role: &str, value: V) {
        let mut entries = self.entries.write();
        match entries.get_mut(role) {
            Some(slot) => *slot = value,
            None => {
                entries.insert(RoleName::new(role), value);
            }
        }
    }

    pub fn get(&self, role: &str) -> Option<V> {
        self.entries.read().get(role).cloned()
    }

    pub fn contains(&self, role: &str) -> bool {
        self.entries.read().contains_key(role)
    }

    /// Tracked roles, ascending
    pub fn sorted_keys(&self) -> Vec<RoleName> {
        let mut keys: Vec<RoleName> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_get_or_insert_creates_once() {
        let map: RoleMap<Arc<i32>> = RoleMap::new();

        let first = map.get_or_insert_with("mid", || Arc::new(1));
        let second = map.get_or_insert_with("mid", || Arc::new(2));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, 1);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_insert_last_write_wins() {
        let map = RoleMap::new();
        map.insert("sub1", 3_i64);
        map.insert("sub1", 7_i64);

        assert_eq!(map.get("sub1"), Some(7));
        assert_eq!(map.get("Sub1"), None);
    }

    #[test]
    fn test_sorted_keys() {
        let map = RoleMap::new();
        for role in ["sub2", "mid", "Sub0", "sub1"] {
            map.insert(role, ());
        }

        let keys: Vec<String> = map
            .sorted_keys()
            .iter()
            .map(|k| k.as_str().to_string())
            .collect();
        assert_eq!(keys, vec!["Sub0", "mid", "sub1", "sub2"]);
    }
}
