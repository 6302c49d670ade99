//! Post commands: like, unlike, show, delete.

use anyhow::Result;
use lavender_social::{LikeOutcome, Skip};
use serde_json::json;
use tracing::info;

use super::App;

pub async fn set_like(app: &App, post_id: &str, add_like: bool) -> Result<()> {
    let ledger = app.ledger();
    let mut post = app.load_post(&ledger, post_id).await?;

    let outcome = ledger.set_like_state(&mut post, add_like, |_| {}).await;
    match outcome {
        LikeOutcome::Applied { likes } => {
            let verb = if add_like { "Liked" } else { "Unliked" };
            println!("{} {} ({} likes).", verb, post_id, likes);
        }
        LikeOutcome::Skipped(Skip::SignedOut) => {
            app.require_uid()?;
        }
        LikeOutcome::Skipped(Skip::AlreadyLiked) => {
            println!("Already liked {} ({} likes).", post_id, post.likes());
        }
        LikeOutcome::Skipped(Skip::CounterAtZero) => {
            println!("{} has no likes to remove.", post_id);
        }
        LikeOutcome::Skipped(Skip::LookupFailed(e)) => {
            anyhow::bail!("Could not read like state for {}: {}", post_id, e);
        }
        LikeOutcome::Skipped(Skip::IndexWriteFailed(e)) => {
            anyhow::bail!("Could not record like on {}: {}", post_id, e);
        }
    }
    Ok(())
}

pub async fn show(app: &App, post_id: &str, output_json: bool) -> Result<()> {
    let ledger = app.ledger();
    let post = app.load_post(&ledger, post_id).await?;
    let likers = ledger.likers(post_id).await?;

    if output_json {
        let mut record = post.to_record();
        record["id"] = json!(post.id());
        record["liked"] = json!(post.liked());
        record["likers"] = json!(likers);
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("{:<10} {}", "ID", post.id());
    println!("{:<10} {}", "OWNER", post.owner_uid());
    println!("{:<10} {}", "CAPTION", post.caption());
    println!("{:<10} {}", "IMAGE", post.image_url());
    println!("{:<10} {}", "CREATED", post.created_at().to_rfc3339());
    println!("{:<10} {}", "LIKES", post.likes());
    println!("{:<10} {}", "LIKED", if post.liked() { "yes" } else { "no" });
    println!("{:<10} {}", "LIKERS", likers.join(", "));
    Ok(())
}

pub async fn delete(app: &App, post_id: &str) -> Result<()> {
    let ledger = app.ledger();
    let post = app.load_post(&ledger, post_id).await?;
    let uid = app.require_uid()?;
    if post.owner_uid() != uid {
        anyhow::bail!("Only the owner ({}) can delete {}.", post.owner_uid(), post_id);
    }

    app.deletion().delete_post(&post).await;
    info!("Deleted post {}", post_id);
    println!("Deleted {}.", post_id);
    Ok(())
}
