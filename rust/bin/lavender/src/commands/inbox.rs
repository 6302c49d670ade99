//! `lavender inbox`: list a user's notifications.

use anyhow::Result;
use chrono::DateTime;
use lavender_social::NotificationKind;

use super::App;

pub async fn list(app: &App, uid: Option<&str>, mark_checked: bool, output_json: bool) -> Result<()> {
    let uid = match uid {
        Some(uid) => uid,
        None => app.require_uid()?,
    };

    let inbox = app.inbox();
    let notifications = inbox.watch(uid)?.ready();

    if output_json {
        let entries: Vec<serde_json::Value> = notifications
            .iter()
            .map(|(id, n)| {
                let mut value = serde_json::to_value(n).unwrap_or_default();
                value["id"] = serde_json::Value::String(id.clone());
                value
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if notifications.is_empty() {
        println!("No notifications for {}.", uid);
    } else {
        println!("{:<22} {:<16} {:<14} {:<12} {:<8} CREATED", "ID", "KIND", "FROM", "POST", "SEEN");
        for (id, n) in &notifications {
            let created = DateTime::from_timestamp(n.created_at, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| n.created_at.to_string());
            println!(
                "{:<22} {:<16} {:<14} {:<12} {:<8} {}",
                id,
                kind_name(n.kind),
                n.actor_uid,
                n.post_id.as_deref().unwrap_or("-"),
                if n.checked { "yes" } else { "no" },
                created,
            );
        }
    }

    if mark_checked {
        for (id, _) in notifications.iter().filter(|(_, n)| !n.checked) {
            inbox.mark_checked(uid, id).await?;
        }
    }
    Ok(())
}

fn kind_name(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Like => "like",
        NotificationKind::Comment => "comment",
        NotificationKind::Follow => "follow",
        NotificationKind::CommentMention => "comment-mention",
        NotificationKind::PostMention => "post-mention",
    }
}
