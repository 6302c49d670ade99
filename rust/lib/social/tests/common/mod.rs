#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use lavender_core::{SignedIn, SignedOut};
use lavender_kv::MemoryStore;
use lavender_realtime::{ChildAdded, DbError, RealtimeDb, TreeDb};
use lavender_social::{InteractionLedger, Post, StorePaths};
use serde_json::{Map, Value};

/// One call made against the database, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Update(String),
    Set(String, Value),
    Remove(String),
    Read(String),
    AutoId(String),
    Observe(String),
}

/// A [`TreeDb`] that records every call and can fail or stall writes
/// under chosen path prefixes.
pub struct RecordingDb {
    inner: TreeDb<MemoryStore>,
    ops: Mutex<Vec<Op>>,
    failing_writes: Mutex<Vec<String>>,
    failing_reads: Mutex<Vec<String>>,
    stalled_writes: Mutex<Vec<String>>,
}

fn under(path: &str, prefixes: &Mutex<Vec<String>>) -> bool {
    prefixes
        .lock()
        .unwrap()
        .iter()
        .any(|p| path == p || path.starts_with(&format!("{}/", p)))
}

impl RecordingDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: TreeDb::in_memory(),
            ops: Mutex::new(Vec::new()),
            failing_writes: Mutex::new(Vec::new()),
            failing_reads: Mutex::new(Vec::new()),
            stalled_writes: Mutex::new(Vec::new()),
        })
    }

    pub fn fail_writes(&self, prefix: &str) {
        self.failing_writes.lock().unwrap().push(prefix.to_string());
    }

    pub fn fail_reads(&self, prefix: &str) {
        self.failing_reads.lock().unwrap().push(prefix.to_string());
    }

    pub fn stall_writes(&self, prefix: &str) {
        self.stalled_writes.lock().unwrap().push(prefix.to_string());
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().unwrap().clear();
    }

    pub fn removed(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Remove(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn sets(&self) -> Vec<(String, Value)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Set(path, value) => Some((path, value)),
                _ => None,
            })
            .collect()
    }

    /// Read without recording.
    pub async fn get(&self, path: &str) -> Option<Value> {
        self.inner.read_once(path).await.unwrap()
    }

    /// Write without recording.
    pub async fn seed(&self, path: &str, value: Value) {
        self.inner.set_value(path, value).await.unwrap();
    }

    fn record(&self, op: Op) {
        self.ops.lock().unwrap().push(op);
    }

    async fn check_write(&self, path: &str) -> Result<(), DbError> {
        if under(path, &self.stalled_writes) {
            std::future::pending::<()>().await;
        }
        if under(path, &self.failing_writes) {
            return Err(DbError::PermissionDenied(path.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RealtimeDb for RecordingDb {
    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), DbError> {
        self.record(Op::Update(path.to_string()));
        // A field write is denied when the field path is.
        for key in fields.keys() {
            self.check_write(&format!("{}/{}", path, key)).await?;
        }
        self.check_write(path).await?;
        self.inner.update(path, fields).await
    }

    async fn set_value(&self, path: &str, value: Value) -> Result<(), DbError> {
        self.record(Op::Set(path.to_string(), value.clone()));
        self.check_write(path).await?;
        self.inner.set_value(path, value).await
    }

    async fn remove_value(&self, path: &str) -> Result<(), DbError> {
        self.record(Op::Remove(path.to_string()));
        self.check_write(path).await?;
        self.inner.remove_value(path).await
    }

    async fn read_once(&self, path: &str) -> Result<Option<Value>, DbError> {
        self.record(Op::Read(path.to_string()));
        if under(path, &self.failing_reads) {
            return Err(DbError::PermissionDenied(path.to_string()));
        }
        self.inner.read_once(path).await
    }

    fn observe_child_added(&self, path: &str) -> Result<ChildAdded, DbError> {
        self.record(Op::Observe(path.to_string()));
        self.inner.observe_child_added(path)
    }

    fn child_by_auto_id(&self, path: &str) -> Result<String, DbError> {
        self.record(Op::AutoId(path.to_string()));
        self.inner.child_by_auto_id(path)
    }
}

pub fn make_post(id: &str, owner: &str, caption: &str, likes: u64) -> Post {
    let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    Post::new(id, owner, caption, &format!("post_images/{}.jpg", id), created_at, likes).unwrap()
}

/// Store `post` under `posts/{id}`.
pub async fn seed_post(db: &RecordingDb, post: &Post) {
    db.seed(&format!("posts/{}", post.id()), post.to_record()).await;
}

pub fn ledger_for(db: &Arc<RecordingDb>, uid: &str) -> InteractionLedger {
    InteractionLedger::new(db.clone(), Arc::new(SignedIn(uid.to_string())), StorePaths::default())
}

pub fn signed_out_ledger(db: &Arc<RecordingDb>) -> InteractionLedger {
    InteractionLedger::new(db.clone(), Arc::new(SignedOut), StorePaths::default())
}
