use std::sync::Arc;

use futures_util::future::join_all;
use lavender_blob::{BlobStore, media_key};
use lavender_core::Session;
use lavender_realtime::RealtimeDb;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::hashtag::hashtags;
use crate::model::Post;
use crate::paths::StorePaths;

/// Removes a post and everything that points at it.
///
/// Best effort: each removal is independent and a failure is logged
/// without stopping the rest. Nothing is rolled back.
pub struct CascadingDeletion {
    db: Arc<dyn RealtimeDb>,
    blobs: Arc<dyn BlobStore>,
    session: Arc<dyn Session>,
    paths: StorePaths,
}

impl CascadingDeletion {
    pub fn new(
        db: Arc<dyn RealtimeDb>,
        blobs: Arc<dyn BlobStore>,
        session: Arc<dyn Session>,
        paths: StorePaths,
    ) -> Self {
        Self {
            db,
            blobs,
            session,
            paths,
        }
    }

    /// Delete `post` on behalf of the signed-in user.
    ///
    /// Removes the image, follower feed entries, the actor's own feed and
    /// post entries, every like with its notification, hashtag entries,
    /// comments and the post record. Does nothing when signed out.
    pub async fn delete_post(&self, post: &Post) {
        let Some(actor) = self.session.current_uid() else {
            debug!("delete of {} ignored: signed out", post.id());
            return;
        };
        let post_id = post.id();

        self.delete_media(post);

        let mut targets = self.follower_feed_entries(&actor, post_id).await;
        targets.push(self.paths.feed_entry(&actor, post_id));
        targets.push(self.paths.user_post(&actor, post_id));
        targets.extend(
            hashtags(post.caption())
                .iter()
                .map(|tag| self.paths.hashtag_entry(tag, post_id)),
        );
        targets.push(self.paths.comments(post_id));
        targets.push(self.paths.post(post_id));

        tokio::join!(
            join_all(targets.iter().map(|path| self.remove(path))),
            self.revoke_likes(post),
        );
        info!("deleted post {} for {}", post_id, actor);
    }

    fn delete_media(&self, post: &Post) {
        let key = match media_key(post.image_url()) {
            Ok(key) => key,
            Err(e) => {
                warn!("post {}: cannot resolve image {}: {}", post.id(), post.image_url(), e);
                return;
            }
        };
        if let Err(e) = self.blobs.delete(&key) {
            warn!("post {}: failed to delete image {}: {}", post.id(), key, e);
        }
    }

    /// Feed entries of everyone following `actor`, from one snapshot of
    /// the follower set.
    async fn follower_feed_entries(&self, actor: &str, post_id: &str) -> Vec<String> {
        let followers = self.paths.followers(actor);
        match self.db.read_once(&followers).await {
            Ok(Some(Value::Object(entries))) => entries
                .keys()
                .map(|uid| self.paths.feed_entry(uid, post_id))
                .collect(),
            Ok(_) => Vec::new(),
            Err(e) => {
                warn!("failed to read {}: {}", followers, e);
                Vec::new()
            }
        }
    }

    /// Remove every like of `post`: each liker's notification and
    /// `user-likes` entry, then the whole `post-likes` subtree.
    async fn revoke_likes(&self, post: &Post) {
        let index = self.paths.post_likes(post.id());
        let likers: Vec<String> = match self.db.read_once(&index).await {
            Ok(Some(Value::Object(entries))) => entries.into_iter().map(|(uid, _)| uid).collect(),
            Ok(_) => Vec::new(),
            Err(e) => {
                warn!("failed to read {}: {}", index, e);
                Vec::new()
            }
        };

        join_all(likers.iter().map(|uid| self.revoke_like(post, uid))).await;
        self.remove(&index).await;
    }

    async fn revoke_like(&self, post: &Post, liker: &str) {
        let entry = self.paths.user_like(liker, post.id());
        match self.db.read_once(&entry).await {
            Ok(Some(Value::String(id))) => {
                self.remove(&self.paths.notification(post.owner_uid(), &id)).await;
            }
            Ok(_) => {}
            Err(e) => warn!("failed to read {}: {}", entry, e),
        }
        self.remove(&entry).await;
    }

    async fn remove(&self, path: &str) {
        if let Err(e) = self.db.remove_value(path).await {
            warn!("failed to remove {}: {}", path, e);
        }
    }
}
