//! gravatar and photo commands

use super::CommandContext;
use crate::output::print_json;
use anyhow::{Context, Result};
use std::path::Path;

pub fn gravatar(ctx: &CommandContext, uid: &str) -> Result<()> {
    let url = ctx.directory.get_gravatar(uid);

    if ctx.is_json() {
        print_json(&serde_json::json!({ "uid": uid, "url": url }))
    } else {
        println!("{}", url);
        Ok(())
    }
}

pub async fn photo(ctx: &CommandContext, uid: &str, file: Option<&Path>) -> Result<()> {
    let Some(photo) = ctx.directory.get_image(uid).await? else {
        println!("{} has no photo, fallback: {}", uid, ctx.directory.get_gravatar(uid));
        return Ok(());
    };

    match file {
        Some(path) => {
            tokio::fs::write(path, &photo)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} bytes to {}", photo.len(), path.display());
        }
        None => println!("{} has a {} byte photo", uid, photo.len()),
    }
    Ok(())
}
