use chrono::{DateTime, Utc};
use lavender_core::ServiceError;
use lavender_realtime::path;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Stored in an index entry that carries no notification id.
pub const LIKE_MARKER: i64 = 1;

/// A client-side post.
///
/// Identity, owner, caption, image and creation time are fixed once
/// loaded. The like counter and the viewer's liked flag are mutated only
/// by [`crate::InteractionLedger`].
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    id: String,
    owner_uid: String,
    caption: String,
    image_url: String,
    created_at: DateTime<Utc>,
    pub(crate) likes: u64,
    pub(crate) liked: bool,
}

impl Post {
    pub fn new(
        id: &str,
        owner_uid: &str,
        caption: &str,
        image_url: &str,
        created_at: DateTime<Utc>,
        likes: u64,
    ) -> Result<Self, ServiceError> {
        if !path::is_valid_segment(id) {
            return Err(ServiceError::Validation(format!("invalid post id: {:?}", id)));
        }
        if !path::is_valid_segment(owner_uid) {
            return Err(ServiceError::Validation(format!(
                "post {}: invalid owner uid {:?}",
                id, owner_uid
            )));
        }
        if image_url.is_empty() {
            return Err(ServiceError::Validation(format!("post {}: empty image reference", id)));
        }
        Ok(Self {
            id: id.to_string(),
            owner_uid: owner_uid.to_string(),
            caption: caption.to_string(),
            image_url: image_url.to_string(),
            created_at,
            likes,
            liked: false,
        })
    }

    /// Build a post from its stored record under `posts/{id}`.
    ///
    /// `likes` defaults to 0 when absent and is clamped at 0; `caption`
    /// defaults to empty. `ownerUid`, `imageUrl` and `creationDate` are
    /// required.
    pub fn from_record(id: &str, record: &Value) -> Result<Self, ServiceError> {
        let obj = record
            .as_object()
            .ok_or_else(|| ServiceError::Validation(format!("post {}: record is not an object", id)))?;
        let text = |field: &str| obj.get(field).and_then(Value::as_str);
        let required = |field: &str| {
            text(field)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ServiceError::Validation(format!("post {}: missing {}", id, field)))
        };

        let owner_uid = required("ownerUid")?;
        let image_url = required("imageUrl")?;
        let seconds = obj
            .get("creationDate")
            .and_then(Value::as_f64)
            .ok_or_else(|| ServiceError::Validation(format!("post {}: missing creationDate", id)))?;
        let created_at = DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
            .ok_or_else(|| {
                ServiceError::Validation(format!("post {}: creationDate out of range", id))
            })?;
        let likes = match obj.get("likes") {
            None | Some(Value::Null) => 0,
            Some(v) => v
                .as_f64()
                .ok_or_else(|| ServiceError::Validation(format!("post {}: likes is not a number", id)))?
                .max(0.0) as u64,
        };

        Self::new(id, owner_uid, text("caption").unwrap_or_default(), image_url, created_at, likes)
    }

    /// The stored record for this post.
    pub fn to_record(&self) -> Value {
        json!({
            "caption": self.caption,
            "likes": self.likes,
            "imageUrl": self.image_url,
            "ownerUid": self.owner_uid,
            "creationDate": self.created_at.timestamp_millis() as f64 / 1000.0,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner_uid(&self) -> &str {
        &self.owner_uid
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn likes(&self) -> u64 {
        self.likes
    }

    /// Whether the signed-in viewer likes this post.
    pub fn liked(&self) -> bool {
        self.liked
    }
}

/// Notification type codes as stored in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum NotificationKind {
    Like,
    Comment,
    Follow,
    CommentMention,
    PostMention,
}

impl From<NotificationKind> for u8 {
    fn from(kind: NotificationKind) -> u8 {
        match kind {
            NotificationKind::Like => 0,
            NotificationKind::Comment => 1,
            NotificationKind::Follow => 2,
            NotificationKind::CommentMention => 3,
            NotificationKind::PostMention => 4,
        }
    }
}

impl TryFrom<u8> for NotificationKind {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(NotificationKind::Like),
            1 => Ok(NotificationKind::Comment),
            2 => Ok(NotificationKind::Follow),
            3 => Ok(NotificationKind::CommentMention),
            4 => Ok(NotificationKind::PostMention),
            other => Err(format!("unknown notification type {}", other)),
        }
    }
}

/// A record under `notifications/{ownerUid}/{notificationId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(with = "flag")]
    pub checked: bool,
    /// Unix seconds.
    #[serde(rename = "creationDate")]
    pub created_at: i64,
    /// Who caused it.
    #[serde(rename = "uid")]
    pub actor_uid: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(rename = "postId", default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
}

impl Notification {
    pub fn like(actor_uid: &str, post_id: &str, created_at: i64) -> Self {
        Self {
            checked: false,
            created_at,
            actor_uid: actor_uid.to_string(),
            kind: NotificationKind::Like,
            post_id: Some(post_id.to_string()),
        }
    }
}

/// `checked` is stored as 0/1; booleans are accepted on read.
mod flag {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match Value::deserialize(d)? {
            Value::Bool(b) => Ok(b),
            Value::Number(n) => Ok(n.as_f64() != Some(0.0)),
            other => Err(D::Error::custom(format!("expected 0 or 1, got {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record() -> Value {
        json!({
            "caption": "sunset #beach",
            "likes": 3,
            "imageUrl": "post_images/p1.jpg",
            "ownerUid": "bob",
            "creationDate": 1_700_000_000.25,
        })
    }

    #[test]
    fn from_record_reads_every_field() {
        let post = Post::from_record("p1", &make_record()).unwrap();
        assert_eq!(post.id(), "p1");
        assert_eq!(post.owner_uid(), "bob");
        assert_eq!(post.caption(), "sunset #beach");
        assert_eq!(post.image_url(), "post_images/p1.jpg");
        assert_eq!(post.likes(), 3);
        assert!(!post.liked());
        assert_eq!(post.created_at().timestamp_millis(), 1_700_000_000_250);
    }

    #[test]
    fn from_record_defaults_and_clamps_likes() {
        let mut record = make_record();
        record.as_object_mut().unwrap().remove("likes");
        assert_eq!(Post::from_record("p1", &record).unwrap().likes(), 0);

        record["likes"] = json!(-4);
        assert_eq!(Post::from_record("p1", &record).unwrap().likes(), 0);
    }

    #[test]
    fn from_record_rejects_missing_fields() {
        for field in ["ownerUid", "imageUrl", "creationDate"] {
            let mut record = make_record();
            record.as_object_mut().unwrap().remove(field);
            let err = Post::from_record("p1", &record).unwrap_err();
            assert!(err.to_string().contains(field), "{}", err);
        }
        assert!(Post::from_record("p1", &json!("nope")).is_err());
        assert!(Post::from_record("p.1", &make_record()).is_err());
    }

    #[test]
    fn record_survives_reload() {
        let post = Post::from_record("p1", &make_record()).unwrap();
        assert_eq!(Post::from_record("p1", &post.to_record()).unwrap(), post);
    }

    #[test]
    fn notification_wire_format() {
        let n = Notification::like("alice", "p1", 1_700_000_000);
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(
            value,
            json!({
                "checked": 0,
                "creationDate": 1_700_000_000,
                "uid": "alice",
                "type": 0,
                "postId": "p1",
            })
        );
    }

    #[test]
    fn notification_accepts_follow_without_post() {
        let n: Notification = serde_json::from_value(json!({
            "checked": true,
            "creationDate": 5,
            "uid": "carol",
            "type": 2,
        }))
        .unwrap();
        assert!(n.checked);
        assert_eq!(n.kind, NotificationKind::Follow);
        assert_eq!(n.post_id, None);
    }

    #[test]
    fn unknown_notification_type_is_rejected() {
        let res: Result<Notification, _> = serde_json::from_value(json!({
            "checked": 0,
            "creationDate": 5,
            "uid": "carol",
            "type": 9,
        }));
        assert!(res.is_err());
    }
}
