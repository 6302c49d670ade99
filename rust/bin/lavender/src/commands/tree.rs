//! Raw tree access: `lavender get posts/p1`, `lavender put posts/p1/caption '"hi"'`.

use anyhow::Result;
use serde_json::Value;

use super::App;

pub async fn get(app: &App, path: &str) -> Result<()> {
    match app.db.read_once(path).await? {
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => println!("(empty)"),
    }
    Ok(())
}

/// Write JSON at `path`. With `merge`, an object body is merged into the
/// existing node instead of replacing it.
pub async fn put(app: &App, path: &str, body: &str, merge: bool) -> Result<()> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| anyhow::anyhow!("Invalid JSON body: {}", e))?;

    match (merge, value) {
        (true, Value::Object(fields)) => app.db.update(path, fields).await?,
        (true, _) => anyhow::bail!("--merge needs a JSON object body."),
        (false, value) => app.db.set_value(path, value).await?,
    }
    println!("Wrote {}", path);
    Ok(())
}
