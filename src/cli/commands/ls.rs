//! ls command - List a directory as of a revision

use std::path::Path;

use anyhow::{Context as _, Result};

use super::{open_repo, parse_revision};
use crate::cli::Context;
use crate::ui::output;

/// List `path` (default: the repository root) as of `rev`.
pub fn ls(ctx: &Context, rev: &str, path: Option<&Path>) -> Result<()> {
    let revision = parse_revision(rev)?;
    let path = path.unwrap_or(Path::new(""));

    let mut repo = open_repo(ctx)?;
    let entries = repo
        .list_directory(&revision, path)
        .with_context(|| format!("failed to list '{}' at {}", path.display(), revision))?;

    if ctx.json {
        output::json(&entries)?;
    } else {
        for entry in &entries {
            println!("{}", output::format_entry(entry));
        }
    }
    Ok(())
}
