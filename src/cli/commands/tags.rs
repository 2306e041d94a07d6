//! tags command - List semantic-version tags

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::open_repo;
use crate::cli::Context;
use crate::ui::output;

#[derive(Serialize)]
struct TagRow<'a> {
    tag: &'a str,
    version: String,
    selected: bool,
}

/// List semantic-version tags, marking the default baseline.
pub fn tags(ctx: &Context) -> Result<()> {
    let repo = open_repo(ctx)?;
    let listing = repo.tag_listing().context("failed to list tags")?;
    let tags = &listing.tags;
    let selected = listing.selected.as_deref();

    if ctx.json {
        let rows: Vec<TagRow<'_>> = tags
            .iter()
            .map(|t| TagRow {
                tag: &t.original,
                version: t.version.to_string(),
                selected: Some(t.original.as_str()) == selected,
            })
            .collect();
        output::json(&rows)?;
        return Ok(());
    }

    if tags.is_empty() {
        output::print("No semantic-version tags.", ctx.verbosity());
        return Ok(());
    }
    let names: Vec<&str> = tags.iter().map(|t| t.original.as_str()).collect();
    println!("{}", output::format_tags(&names, selected));
    Ok(())
}
