use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::KVError;
use crate::traits::KVStore;

/// MemoryStore is a KVStore held entirely in a `BTreeMap`.
///
/// Used by tests and by short-lived tools that do not need persistence.
/// BTreeMap ordering gives the same sorted prefix scans as `RedbStore`.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KVStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }

    fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError> {
        let mut map = self.entries.write().unwrap();
        for (key, value) in entries {
            map.insert((*key).to_string(), value.to_vec());
        }
        Ok(())
    }

    fn batch_delete(&self, keys: &[&str]) -> Result<(), KVError> {
        let mut map = self.entries.write().unwrap();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }

    fn apply(&self, deletes: &[&str], sets: &[(&str, &[u8])]) -> Result<(), KVError> {
        let mut map = self.entries.write().unwrap();
        for key in deletes {
            map.remove(*key);
        }
        for (key, value) in sets {
            map.insert((*key).to_string(), value.to_vec());
        }
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let map = self.entries.read().unwrap();
        Ok(map
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_overwrite() {
        let store = MemoryStore::new();
        store.set("posts/p1/likes", b"1").unwrap();
        store.set("posts/p1/likes", b"2").unwrap();
        assert_eq!(store.get("posts/p1/likes").unwrap(), Some(b"2".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn scan_is_sorted_and_bounded() {
        let store = MemoryStore::new();
        store
            .batch_set(&[("items/c", b"3"), ("items/a", b"1"), ("itemsx/b", b"2")])
            .unwrap();
        let keys: Vec<String> = store.scan("items/").unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["items/a", "items/c"]);
    }

    #[test]
    fn apply_deletes_before_setting() {
        let store = MemoryStore::new();
        store.batch_set(&[("a/b", b"1"), ("a/c", b"2")]).unwrap();
        store.apply(&["a/b", "a/c"], &[("a/b", b"3")]).unwrap();
        assert_eq!(store.scan("a/").unwrap(), vec![("a/b".to_string(), b"3".to_vec())]);
    }

    #[test]
    fn batch_delete_ignores_missing() {
        let store = MemoryStore::new();
        store.set("a", b"1").unwrap();
        store.batch_delete(&["a", "b"]).unwrap();
        assert!(store.is_empty());
    }
}
