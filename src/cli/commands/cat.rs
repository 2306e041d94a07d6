//! cat command - Print a file as of a revision

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context as _, Result};

use super::{open_repo, parse_revision};
use crate::cli::Context;

/// Copy `path` as of `rev` to `out`.
///
/// The content is streamed, not buffered, and the file handle is closed on
/// every exit path.
pub fn cat(ctx: &Context, rev: &str, path: &Path, out: &mut dyn Write) -> Result<()> {
    let revision = parse_revision(rev)?;

    let mut repo = open_repo(ctx)?;
    let mut file = repo
        .read_file(&revision, path)
        .with_context(|| format!("failed to open '{}' at {}", path.display(), revision))?;

    io::copy(&mut file, out)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    out.flush()?;
    Ok(())
}
