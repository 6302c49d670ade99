use crate::error::KVError;

/// KVStore is a flat, ordered key-value storage interface.
///
/// Keys are `/`-separated paths such as `posts/p1/likes`. The realtime tree
/// stores one JSON leaf per key, so prefix scans are how subtrees are read.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, overwriting any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Set many pairs in one write transaction.
    fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError>;

    /// Delete many keys in one write transaction.
    fn batch_delete(&self, keys: &[&str]) -> Result<(), KVError>;

    /// Delete `deletes`, then set `sets`, in one write transaction.
    ///
    /// Readers see either the state before the call or the state after it.
    fn apply(&self, deletes: &[&str], sets: &[(&str, &[u8])]) -> Result<(), KVError>;

    /// Scan all keys starting with `prefix`. Returns (key, value) pairs sorted by key.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;
}
