use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use lavender_core::merge_patch;
use lavender_kv::{KVStore, MemoryStore};
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::DbError;
use crate::listener::{ChildAdded, ChildEvent};
use crate::path;
use crate::traits::RealtimeDb;
use crate::trie::PatternTrie;

#[derive(Clone)]
struct Listener {
    id: u64,
    tx: mpsc::UnboundedSender<ChildEvent>,
}

/// TreeDb is a [`RealtimeDb`] that keeps a JSON tree in a flat [`KVStore`].
///
/// Every scalar leaf lives under its full path as one KV entry
/// (`posts/p1/likes` → `5`), so a subtree read is a prefix scan and
/// a subtree delete is a batch delete.
///
/// Each write call lands in the KV store as one `apply`, and reads take the
/// shared side of the lock writers hold exclusively, so a reader never sees
/// a write half done. Child-added listeners are routed through a pattern
/// trie: observing `a/b` registers `a/b/+`, and a write that creates
/// `a/b/c` where nothing existed before fires it.
pub struct TreeDb<S: KVStore> {
    kv: S,
    listeners: Arc<PatternTrie<Listener>>,
    next_listener: AtomicU64,
    lock: RwLock<()>,
}

impl TreeDb<MemoryStore> {
    /// A TreeDb over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl<S: KVStore> TreeDb<S> {
    pub fn new(kv: S) -> Self {
        Self {
            kv,
            listeners: Arc::new(PatternTrie::new()),
            next_listener: AtomicU64::new(1),
            lock: RwLock::new(()),
        }
    }

    /// The backing KV store.
    pub fn kv(&self) -> &S {
        &self.kv
    }

    fn read_tree(&self, at: &str) -> Result<Option<Value>, DbError> {
        if let Some(bytes) = self.kv.get(at)? {
            return decode(at, &bytes).map(Some);
        }

        let prefix = format!("{}/", at);
        let entries = self.kv.scan(&prefix)?;
        if entries.is_empty() {
            return Ok(None);
        }

        let mut root = Value::Object(Map::new());
        for (key, bytes) in entries {
            let leaf = decode(&key, &bytes)?;
            let nested = key[prefix.len()..].rsplit('/').fold(leaf, |acc, segment| {
                let mut wrapper = Map::new();
                wrapper.insert(segment.to_string(), acc);
                Value::Object(wrapper)
            });
            merge_patch(&mut root, &nested);
        }
        Ok(Some(root))
    }

    fn exists(&self, at: &str) -> Result<bool, DbError> {
        Ok(self.kv.get(at)?.is_some() || !self.kv.scan(&format!("{}/", at))?.is_empty())
    }

    /// Apply a list of subtree replacements as one KV write, then fire
    /// child-added listeners for children that did not exist before.
    fn apply(&self, writes: Vec<(String, Value)>) -> Result<(), DbError> {
        let mut planned = Vec::with_capacity(writes.len());
        for (at, value) in &writes {
            path::validate(at)?;
            let mut leaves = Vec::new();
            flatten(at, value, &mut leaves)?;
            planned.push((at.as_str(), leaves));
        }

        let _guard = self.lock.write().unwrap();

        let mut fresh = Vec::new();
        for (at, value) in &writes {
            for topic in candidate_topics(at, value) {
                if fresh.contains(&topic) || self.listeners.matches(&topic).is_empty() {
                    continue;
                }
                if !self.exists(&topic)? {
                    fresh.push(topic);
                }
            }
        }

        // Targets of one call are disjoint, so every delete can precede every set.
        let mut doomed: Vec<String> = Vec::new();
        for (at, _) in &planned {
            for prefix in path::proper_prefixes(at) {
                if self.kv.get(prefix)?.is_some() {
                    doomed.push(prefix.to_string());
                }
            }
            doomed.push(at.to_string());
            doomed.extend(
                self.kv
                    .scan(&format!("{}/", at))?
                    .into_iter()
                    .map(|(key, _)| key),
            );
        }
        let deletes: Vec<&str> = doomed.iter().map(String::as_str).collect();
        let sets: Vec<(&str, &[u8])> = planned
            .iter()
            .flat_map(|(_, leaves)| leaves.iter())
            .map(|(key, bytes)| (key.as_str(), bytes.as_slice()))
            .collect();
        self.kv.apply(&deletes, &sets)?;
        debug!("TreeDb: wrote {} subtree(s), {} leaves", planned.len(), sets.len());

        for topic in fresh {
            let Some(value) = self.read_tree(&topic)? else {
                continue;
            };
            let Some((_, key)) = path::split_last(&topic) else {
                continue;
            };
            let event = ChildEvent {
                key: key.to_string(),
                value,
            };
            for listener in self.listeners.matches(&topic) {
                // A closed receiver is a listener being dropped; its detach removes it.
                let _ = listener.tx.send(event.clone());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<S: KVStore + 'static> RealtimeDb for TreeDb<S> {
    async fn update(&self, at: &str, fields: Map<String, Value>) -> Result<(), DbError> {
        path::validate(at)?;
        if let Some(bad) = fields.keys().find(|k| !path::is_valid_segment(k)) {
            return Err(DbError::InvalidPath(path::child(at, bad)));
        }
        let writes = fields
            .into_iter()
            .map(|(key, value)| (path::child(at, &key), value))
            .collect();
        self.apply(writes)
    }

    async fn set_value(&self, at: &str, value: Value) -> Result<(), DbError> {
        self.apply(vec![(at.to_string(), value)])
    }

    async fn remove_value(&self, at: &str) -> Result<(), DbError> {
        self.apply(vec![(at.to_string(), Value::Null)])
    }

    async fn read_once(&self, at: &str) -> Result<Option<Value>, DbError> {
        path::validate(at)?;
        let _guard = self.lock.read().unwrap();
        self.read_tree(at)
    }

    fn observe_child_added(&self, at: &str) -> Result<ChildAdded, DbError> {
        path::validate(at)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        let pattern = format!("{}/+", at);

        {
            // Snapshot and registration happen with writers excluded so no
            // child is delivered twice or missed.
            let _guard = self.lock.read().unwrap();
            if let Some(Value::Object(children)) = self.read_tree(at)? {
                for (key, value) in children {
                    let _ = tx.send(ChildEvent { key, value });
                }
            }
            self.listeners.insert(&pattern, Listener { id, tx });
        }
        debug!("TreeDb: listener {} observing {}", id, at);

        let registry = Arc::downgrade(&self.listeners);
        Ok(ChildAdded::new(rx, move || {
            if let Some(trie) = registry.upgrade() {
                trie.remove(&pattern, |l| l.id == id);
            }
        }))
    }

    fn child_by_auto_id(&self, at: &str) -> Result<String, DbError> {
        path::validate(at)?;
        Ok(path::child(at, &path::push_id()))
    }
}

fn decode(at: &str, bytes: &[u8]) -> Result<Value, DbError> {
    serde_json::from_slice(bytes).map_err(|e| DbError::Corrupt {
        path: at.to_string(),
        reason: e.to_string(),
    })
}

/// Flatten a JSON value into (leaf path, encoded scalar) pairs.
/// Arrays are stored as objects keyed by index; empty containers vanish.
fn flatten(at: &str, value: &Value, out: &mut Vec<(String, Vec<u8>)>) -> Result<(), DbError> {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                if !path::is_valid_segment(key) {
                    return Err(DbError::InvalidPath(path::child(at, key)));
                }
                flatten(&path::child(at, key), child, out)?;
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                flatten(&path::child(at, &i.to_string()), child, out)?;
            }
        }
        scalar => {
            let bytes = serde_json::to_vec(scalar).map_err(|e| DbError::Corrupt {
                path: at.to_string(),
                reason: e.to_string(),
            })?;
            out.push((at.to_string(), bytes));
        }
    }
    Ok(())
}

/// Child topics (`parent/child`) a write at `at` might create.
fn candidate_topics(at: &str, value: &Value) -> Vec<String> {
    if value.is_null() {
        return Vec::new();
    }
    let mut topics: Vec<String> = path::proper_prefixes(at)
        .skip(1)
        .map(str::to_string)
        .collect();
    if at.contains('/') {
        topics.push(at.to_string());
    }
    match value {
        Value::Object(map) => topics.extend(map.keys().map(|k| path::child(at, k))),
        Value::Array(items) => topics.extend((0..items.len()).map(|i| path::child(at, &i.to_string()))),
        _ => {}
    }
    topics
}
