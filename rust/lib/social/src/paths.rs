use lavender_core::ServiceError;
use lavender_realtime::path;
use serde::{Deserialize, Serialize};

/// Root paths of every tree the social layer reads or writes.
///
/// Injected into the ledger and the deletion service instead of living in
/// process-wide constants, so tests and deployments can relocate them.
/// Deserializes from a `[paths]` TOML table; missing keys keep defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorePaths {
    /// `posts/{postId}` → post record.
    pub posts: String,
    /// `user-likes/{uid}/{postId}` → notification id or marker.
    pub user_likes: String,
    /// `post-likes/{postId}/{uid}` → marker.
    pub post_likes: String,
    /// `notifications/{ownerUid}/{notificationId}` → notification record.
    pub notifications: String,
    /// `user-followers/{uid}/{followerUid}` → marker.
    pub user_followers: String,
    /// `user-feed/{uid}/{postId}` → marker.
    pub user_feed: String,
    /// `user-posts/{uid}/{postId}` → marker.
    pub user_posts: String,
    /// `hashtag-post/{tag}/{postId}` → marker.
    pub hashtag_posts: String,
    /// `comments/{postId}/{commentId}` → comment record.
    pub comments: String,
}

impl Default for StorePaths {
    fn default() -> Self {
        Self {
            posts: "posts".into(),
            user_likes: "user-likes".into(),
            post_likes: "post-likes".into(),
            notifications: "notifications".into(),
            user_followers: "user-followers".into(),
            user_feed: "user-feed".into(),
            user_posts: "user-posts".into(),
            hashtag_posts: "hashtag-post".into(),
            comments: "comments".into(),
        }
    }
}

impl StorePaths {
    /// Reject roots that are not valid tree paths.
    pub fn validate(&self) -> Result<(), ServiceError> {
        let roots = [
            ("posts", &self.posts),
            ("user-likes", &self.user_likes),
            ("post-likes", &self.post_likes),
            ("notifications", &self.notifications),
            ("user-followers", &self.user_followers),
            ("user-feed", &self.user_feed),
            ("user-posts", &self.user_posts),
            ("hashtag-post", &self.hashtag_posts),
            ("comments", &self.comments),
        ];
        for (name, root) in roots {
            path::validate(root)
                .map_err(|e| ServiceError::Validation(format!("paths.{}: {}", name, e)))?;
        }
        Ok(())
    }

    pub fn post(&self, post_id: &str) -> String {
        path::child(&self.posts, post_id)
    }

    /// The stored like counter of a post.
    pub fn post_like_count(&self, post_id: &str) -> String {
        path::child(&self.post(post_id), "likes")
    }

    pub fn user_likes(&self, uid: &str) -> String {
        path::child(&self.user_likes, uid)
    }

    pub fn user_like(&self, uid: &str, post_id: &str) -> String {
        path::child(&self.user_likes(uid), post_id)
    }

    pub fn post_likes(&self, post_id: &str) -> String {
        path::child(&self.post_likes, post_id)
    }

    pub fn post_like(&self, post_id: &str, uid: &str) -> String {
        path::child(&self.post_likes(post_id), uid)
    }

    pub fn notifications(&self, uid: &str) -> String {
        path::child(&self.notifications, uid)
    }

    pub fn notification(&self, uid: &str, notification_id: &str) -> String {
        path::child(&self.notifications(uid), notification_id)
    }

    pub fn followers(&self, uid: &str) -> String {
        path::child(&self.user_followers, uid)
    }

    pub fn feed_entry(&self, uid: &str, post_id: &str) -> String {
        path::child(&path::child(&self.user_feed, uid), post_id)
    }

    pub fn user_post(&self, uid: &str, post_id: &str) -> String {
        path::child(&path::child(&self.user_posts, uid), post_id)
    }

    pub fn hashtag_entry(&self, tag: &str, post_id: &str) -> String {
        path::child(&path::child(&self.hashtag_posts, tag), post_id)
    }

    pub fn comments(&self, post_id: &str) -> String {
        path::child(&self.comments, post_id)
    }
}
