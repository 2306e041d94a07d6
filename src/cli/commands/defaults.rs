//! defaults command - Show the default revision pair

use anyhow::{Context as _, Result};
use serde_json::json;

use super::open_repo;
use crate::cli::Context;
use crate::ui::output;

/// Print the revisions compared when none are given.
pub fn defaults(ctx: &Context) -> Result<()> {
    let repo = open_repo(ctx)?;
    let (before, after) = repo
        .default_revisions()
        .context("failed to determine default revisions")?;

    if ctx.json {
        output::json(&json!({ "before": before, "after": after }))?;
    } else {
        println!("before: {}", before);
        println!("after:  {}", after);
    }
    Ok(())
}
