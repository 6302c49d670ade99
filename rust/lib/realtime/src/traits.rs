use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::DbError;
use crate::listener::ChildAdded;

/// The hosted realtime database as seen by the client.
///
/// Every operation completes asynchronously with an explicit `Result`.
/// Implementations give no ordering guarantee between calls that are in
/// flight at the same time, and no transaction spans two calls.
#[async_trait]
pub trait RealtimeDb: Send + Sync {
    /// Merge `fields` into the node at `path`. Each field replaces the
    /// child it names; other children are left alone. A `null` field
    /// removes that child.
    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), DbError>;

    /// Replace the node at `path`. `Value::Null` removes it.
    async fn set_value(&self, path: &str, value: Value) -> Result<(), DbError>;

    /// Remove the node at `path` and everything under it.
    async fn remove_value(&self, path: &str) -> Result<(), DbError>;

    /// Read the node at `path` once. `None` when nothing is stored there.
    async fn read_once(&self, path: &str) -> Result<Option<Value>, DbError>;

    /// Listen for children of `path`: every existing child first, then
    /// each new one as it appears.
    fn observe_child_added(&self, path: &str) -> Result<ChildAdded, DbError>;

    /// Allocate `{path}/{uniqueKey}` without writing anything.
    fn child_by_auto_id(&self, path: &str) -> Result<String, DbError>;
}
