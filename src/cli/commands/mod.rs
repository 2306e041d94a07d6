//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the repository named by the [`Context`]
//! 2. Calls into [`crate::access`]
//! 3. Formats and displays output
//!
//! Handlers never check out revisions themselves; every positioning of the
//! working copy goes through the accessor's revision cache.

mod cat;
mod completion;
mod defaults;
mod ls;
mod tags;

// Re-export command functions for testing and direct invocation
pub use cat::cat;
pub use completion::completion;
pub use defaults::defaults;
pub use ls::ls;
pub use tags::tags;

use anyhow::{Context as _, Result};

use crate::access::{RepoSource, VersionedRepo};
use crate::cli::args::Command;
use crate::cli::Context;
use crate::core::config::Config;
use crate::core::types::Revision;
use crate::ui::output;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Defaults => defaults(ctx),
        Command::Tags => tags(ctx),
        Command::Ls { rev, path } => ls(ctx, &rev, path.as_deref()),
        Command::Cat { rev, path } => cat(ctx, &rev, &path, &mut std::io::stdout().lock()),
        Command::Completion { shell } => completion(shell),
    }
}

/// Load configuration and open the repository for a command.
pub fn open_repo(ctx: &Context) -> Result<VersionedRepo> {
    // Repository config lives at the top of the working copy, wherever
    // inside it the user pointed.
    let repo_root = match &ctx.source {
        RepoSource::Local(path) => Some(ctx.source.local_root().unwrap_or_else(|| path.clone())),
        RepoSource::Remote(_) => None,
    };

    let loaded = Config::load(repo_root.as_deref()).context("failed to load configuration")?;
    for warning in &loaded.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.path.display()),
            ctx.verbosity(),
        );
    }

    let mut config = loaded.config;
    if !ctx.verify_remote {
        config.global.verify_remote = Some(false);
    }

    if let RepoSource::Remote(url) = &ctx.source {
        output::print(format!("Cloning {}...", url), ctx.verbosity());
    }

    VersionedRepo::open(&ctx.source, &config)
        .with_context(|| format!("failed to open repository {}", ctx.source))
}

/// Parse a revision argument.
fn parse_revision(rev: &str) -> Result<Revision> {
    Revision::new(rev).with_context(|| format!("invalid revision '{}'", rev))
}
