pub mod inbox;
pub mod post;
pub mod tree;

use std::sync::Arc;

use anyhow::Result;
use lavender_blob::FileStore;
use lavender_core::{ServiceError, SignedIn};
use lavender_kv::RedbStore;
use lavender_realtime::{RealtimeDb, TreeDb};
use lavender_social::{CascadingDeletion, InteractionLedger, NotificationInbox, Post, StorePaths};
use tracing::info;

use crate::config::AppConfig;

/// Opened stores plus the acting user, shared by every command.
pub struct App {
    pub db: Arc<dyn RealtimeDb>,
    blobs: Arc<FileStore>,
    session: Arc<SignedIn>,
    paths: StorePaths,
}

impl App {
    pub fn open(config: &AppConfig) -> Result<Self> {
        let db_path = config.storage.resolve_db_path();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        info!("Opening tree at {}", db_path.display());
        let kv = RedbStore::open(&db_path)
            .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?;

        let blob_dir = config.storage.resolve_blob_dir();
        let blobs = FileStore::open(&blob_dir)
            .map_err(|e| anyhow::anyhow!("failed to open media store: {}", e))?;

        Ok(Self {
            db: Arc::new(TreeDb::new(kv)),
            blobs: Arc::new(blobs),
            session: Arc::new(SignedIn(config.uid.clone())),
            paths: config.paths.clone(),
        })
    }

    /// The acting uid, or an error when signed out.
    pub fn require_uid(&self) -> Result<&str, ServiceError> {
        if self.session.0.is_empty() {
            return Err(ServiceError::Unauthenticated(
                "Not signed in. Set `uid` in the config or pass --as <uid>.".to_string(),
            ));
        }
        Ok(&self.session.0)
    }

    pub fn ledger(&self) -> InteractionLedger {
        InteractionLedger::new(self.db.clone(), self.session.clone(), self.paths.clone())
    }

    pub fn deletion(&self) -> CascadingDeletion {
        CascadingDeletion::new(
            self.db.clone(),
            self.blobs.clone(),
            self.session.clone(),
            self.paths.clone(),
        )
    }

    pub fn inbox(&self) -> NotificationInbox {
        NotificationInbox::new(self.db.clone(), self.paths.clone())
    }

    /// Load `posts/{id}` with the acting user's liked flag.
    pub async fn load_post(&self, ledger: &InteractionLedger, id: &str) -> Result<Post> {
        let record = self
            .db
            .read_once(&self.paths.post(id))
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Post not found: {}", id)))?;
        let mut post = Post::from_record(id, &record)?;
        ledger.refresh_liked(&mut post).await?;
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lavender_core::ServiceConfig;
    use serde_json::json;

    fn make_app(dir: &std::path::Path, uid: &str) -> App {
        let config = AppConfig {
            uid: uid.to_string(),
            storage: ServiceConfig {
                data_dir: Some(dir.to_path_buf()),
                ..Default::default()
            },
            paths: StorePaths::default(),
        };
        App::open(&config).unwrap()
    }

    #[tokio::test]
    async fn test_like_and_delete_through_app() {
        let tmp = tempfile::TempDir::new().unwrap();
        let app = make_app(tmp.path(), "alice");
        app.db
            .set_value(
                "posts/p1",
                json!({
                    "caption": "#hi",
                    "imageUrl": "post_images/p1.jpg",
                    "ownerUid": "bob",
                    "creationDate": 1_714_564_800.0,
                }),
            )
            .await
            .unwrap();

        let ledger = app.ledger();
        let mut post = app.load_post(&ledger, "p1").await.unwrap();
        assert!(!post.liked());
        ledger.set_like_state(&mut post, true, |_| {}).await;

        let reloaded = app.load_post(&ledger, "p1").await.unwrap();
        assert_eq!(reloaded.likes(), 1);
        assert!(reloaded.liked());
        assert_eq!(app.inbox().watch("bob").unwrap().ready().len(), 1);

        drop(ledger);
        drop(app);
        let owner = make_app(tmp.path(), "bob");
        let post = owner.load_post(&owner.ledger(), "p1").await.unwrap();
        owner.deletion().delete_post(&post).await;
        assert_eq!(owner.db.read_once("posts/p1").await.unwrap(), None);
        assert_eq!(owner.db.read_once("notifications/bob").await.unwrap(), None);
        assert_eq!(owner.db.read_once("user-likes/alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_post_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let app = make_app(tmp.path(), "alice");
        let err = app.load_post(&app.ledger(), "nope").await.unwrap_err();
        let err = err.downcast::<ServiceError>().unwrap();
        assert_eq!(err.error_code(), "NOT_FOUND");

        let signed_out = make_app(tmp.path().join("other").as_path(), "");
        assert_eq!(signed_out.require_uid().unwrap_err().error_code(), "UNAUTHENTICATED");
    }
}
