use std::sync::Arc;

use lavender_core::{Session, now_unix_secs};
use lavender_realtime::{DbError, RealtimeDb};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::gate::PostGates;
use crate::model::{LIKE_MARKER, Notification, Post};
use crate::paths::StorePaths;

/// Why a like transition changed nothing, or stopped short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// No signed-in user.
    SignedOut,
    /// The viewer already has a `user-likes` entry for this post.
    AlreadyLiked,
    /// Unlike on a post whose counter is already 0.
    CounterAtZero,
    /// Reading the viewer's `user-likes` entry failed; nothing was written.
    LookupFailed(DbError),
    /// The `post-likes` write failed; the counter was left alone.
    IndexWriteFailed(DbError),
}

/// Result of [`InteractionLedger::set_like_state`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeOutcome {
    /// The counter moved; `likes` is its new value.
    Applied { likes: u64 },
    Skipped(Skip),
}

impl LikeOutcome {
    /// The updated count, when one was delivered.
    pub fn likes(&self) -> Option<u64> {
        match self {
            LikeOutcome::Applied { likes } => Some(*likes),
            LikeOutcome::Skipped(_) => None,
        }
    }
}

/// Applies like and unlike transitions across the five projections of a
/// like: the actor's `user-likes` entry, the post's `post-likes` entry,
/// the stored counter, the owner's notification and the `Post` itself.
///
/// Transitions on one post id are serialized; the database calls inside
/// a transition are not. The store never sees a negative counter.
pub struct InteractionLedger {
    db: Arc<dyn RealtimeDb>,
    session: Arc<dyn Session>,
    paths: StorePaths,
    gates: PostGates,
}

impl InteractionLedger {
    pub fn new(db: Arc<dyn RealtimeDb>, session: Arc<dyn Session>, paths: StorePaths) -> Self {
        Self {
            db,
            session,
            paths,
            gates: PostGates::new(),
        }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// Like (`add_like`) or unlike `post` as the signed-in user.
    ///
    /// `on_count` receives the updated counter once the local post has
    /// moved and before the counter is persisted. It is not called when
    /// the transition is skipped. The returned outcome carries the same
    /// count, or the reason nothing was delivered.
    pub async fn set_like_state<F>(&self, post: &mut Post, add_like: bool, on_count: F) -> LikeOutcome
    where
        F: FnOnce(u64) + Send,
    {
        let Some(actor) = self.session.current_uid() else {
            debug!("like on {} ignored: signed out", post.id());
            return LikeOutcome::Skipped(Skip::SignedOut);
        };

        let _gate = self.gates.enter(post.id()).await;
        if add_like {
            self.add_like(&actor, post, on_count).await
        } else {
            self.remove_like(&actor, post, on_count).await
        }
    }

    async fn add_like<F>(&self, actor: &str, post: &mut Post, on_count: F) -> LikeOutcome
    where
        F: FnOnce(u64) + Send,
    {
        let user_entry = self.paths.user_like(actor, post.id());
        match self.db.read_once(&user_entry).await {
            Ok(Some(_)) => {
                debug!("{} already likes {}", actor, post.id());
                post.liked = true;
                return LikeOutcome::Skipped(Skip::AlreadyLiked);
            }
            Ok(None) => {}
            Err(e) => warn!("like guard read failed for {}: {}", user_entry, e),
        }

        let marker = if actor == post.owner_uid() {
            Value::from(LIKE_MARKER)
        } else {
            match self.send_like_notification(actor, post).await {
                Some(id) => Value::String(id),
                None => Value::from(LIKE_MARKER),
            }
        };

        let user_index = self.paths.user_likes(actor);
        let post_index = self.paths.post_likes(post.id());
        let (user_res, post_res) = tokio::join!(
            self.db.update(&user_index, single(post.id(), marker)),
            self.db.update(&post_index, single(actor, Value::from(LIKE_MARKER))),
        );

        if let Err(e) = user_res {
            warn!("failed to record like in {}: {}", user_index, e);
        }
        if let Err(e) = post_res {
            warn!("failed to record like in {}: {}", post_index, e);
            return LikeOutcome::Skipped(Skip::IndexWriteFailed(e));
        }

        post.likes += 1;
        post.liked = true;
        on_count(post.likes);
        self.persist_count(post).await;
        debug!("{} liked {} ({} likes)", actor, post.id(), post.likes);
        LikeOutcome::Applied { likes: post.likes }
    }

    async fn remove_like<F>(&self, actor: &str, post: &mut Post, on_count: F) -> LikeOutcome
    where
        F: FnOnce(u64) + Send,
    {
        let user_entry = self.paths.user_like(actor, post.id());
        let stored = match self.db.read_once(&user_entry).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("unlike lookup failed for {}: {}", user_entry, e);
                return LikeOutcome::Skipped(Skip::LookupFailed(e));
            }
        };
        let notification = stored
            .as_ref()
            .and_then(Value::as_str)
            .map(|id| self.paths.notification(post.owner_uid(), id));
        let post_entry = self.paths.post_like(post.id(), actor);

        let drop_user = async {
            if let Err(e) = self.db.remove_value(&user_entry).await {
                warn!("failed to remove {}: {}", user_entry, e);
            }
        };
        let drop_notification = async {
            if let Some(path) = &notification {
                if let Err(e) = self.db.remove_value(path).await {
                    warn!("failed to remove {}: {}", path, e);
                }
            }
        };
        let drop_post = async move {
            if let Err(e) = self.db.remove_value(&post_entry).await {
                warn!("failed to remove {}: {}", post_entry, e);
                return LikeOutcome::Skipped(Skip::IndexWriteFailed(e));
            }
            if post.likes == 0 {
                debug!("unlike on {} ignored: counter at zero", post.id());
                return LikeOutcome::Skipped(Skip::CounterAtZero);
            }
            post.likes -= 1;
            post.liked = false;
            on_count(post.likes);
            self.persist_count(post).await;
            debug!("{} unliked {} ({} likes)", actor, post.id(), post.likes);
            LikeOutcome::Applied { likes: post.likes }
        };

        let ((), outcome, ()) = tokio::join!(drop_user, drop_post, drop_notification);
        outcome
    }

    /// Allocate and write a like notification in the owner's feed.
    ///
    /// Returns the allocated id even when the write fails, so the index
    /// entry still points at it; None only when no id could be allocated.
    async fn send_like_notification(&self, actor: &str, post: &Post) -> Option<String> {
        let feed = self.paths.notifications(post.owner_uid());
        let path = match self.db.child_by_auto_id(&feed) {
            Ok(path) => path,
            Err(e) => {
                warn!("failed to allocate notification under {}: {}", feed, e);
                return None;
            }
        };
        let (_, id) = lavender_realtime::path::split_last(&path)?;
        let id = id.to_string();

        let record = Notification::like(actor, post.id(), now_unix_secs());
        let fields = match serde_json::to_value(&record) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        };
        if let Err(e) = self.db.update(&path, fields).await {
            warn!("failed to write notification {}: {}", path, e);
        }
        Some(id)
    }

    async fn persist_count(&self, post: &Post) {
        let path = self.paths.post_like_count(post.id());
        if let Err(e) = self.db.set_value(&path, Value::from(post.likes)).await {
            warn!("failed to persist like count {}: {}", path, e);
        }
    }

    /// Reload `post.liked` from the signed-in user's `user-likes` entry.
    /// Signed out always reads as not liked.
    pub async fn refresh_liked(&self, post: &mut Post) -> Result<bool, DbError> {
        let liked = match self.session.current_uid() {
            Some(actor) => self
                .db
                .read_once(&self.paths.user_like(&actor, post.id()))
                .await?
                .is_some(),
            None => false,
        };
        post.liked = liked;
        Ok(liked)
    }

    /// Uids with an entry in `post-likes/{post_id}`, sorted.
    pub async fn likers(&self, post_id: &str) -> Result<Vec<String>, DbError> {
        let likers = match self.db.read_once(&self.paths.post_likes(post_id)).await? {
            Some(Value::Object(entries)) => entries.into_iter().map(|(uid, _)| uid).collect(),
            _ => Vec::new(),
        };
        Ok(likers)
    }
}

fn single(key: &str, value: Value) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(key.to_string(), value);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_likes() {
        assert_eq!(LikeOutcome::Applied { likes: 4 }.likes(), Some(4));
        assert_eq!(LikeOutcome::Skipped(Skip::SignedOut).likes(), None);
    }

    #[test]
    fn single_field_map() {
        let fields = single("p1", Value::from(LIKE_MARKER));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["p1"], Value::from(1));
    }
}
