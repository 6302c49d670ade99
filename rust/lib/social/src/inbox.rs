use std::sync::Arc;

use lavender_realtime::{ChildAdded, ChildEvent, DbError, RealtimeDb};
use serde_json::{Map, Value};
use tracing::warn;

use crate::model::Notification;
use crate::paths::StorePaths;

/// Read side of a user's notification feed.
pub struct NotificationInbox {
    db: Arc<dyn RealtimeDb>,
    paths: StorePaths,
}

impl NotificationInbox {
    pub fn new(db: Arc<dyn RealtimeDb>, paths: StorePaths) -> Self {
        Self { db, paths }
    }

    /// Follow `uid`'s feed: every stored notification, then new ones as
    /// they arrive.
    pub fn watch(&self, uid: &str) -> Result<NotificationFeed, DbError> {
        let events = self.db.observe_child_added(&self.paths.notifications(uid))?;
        Ok(NotificationFeed { events })
    }

    /// Flag one notification as seen.
    pub async fn mark_checked(&self, uid: &str, notification_id: &str) -> Result<(), DbError> {
        let mut fields = Map::new();
        fields.insert("checked".to_string(), Value::from(1));
        self.db
            .update(&self.paths.notification(uid, notification_id), fields)
            .await
    }
}

/// Decoded child-added stream of one feed. Records that do not decode
/// are logged and skipped.
pub struct NotificationFeed {
    events: ChildAdded,
}

impl NotificationFeed {
    /// Wait for the next notification and its id.
    pub async fn next(&mut self) -> Option<(String, Notification)> {
        loop {
            let event = self.events.next().await?;
            if let Some(decoded) = decode(event) {
                return Some(decoded);
            }
        }
    }

    /// Every notification already delivered and not yet taken.
    pub fn ready(&mut self) -> Vec<(String, Notification)> {
        self.events.drain_ready().into_iter().filter_map(decode).collect()
    }
}

fn decode(event: ChildEvent) -> Option<(String, Notification)> {
    match serde_json::from_value(event.value) {
        Ok(notification) => Some((event.key, notification)),
        Err(e) => {
            warn!("skipping notification {}: {}", event.key, e);
            None
        }
    }
}
