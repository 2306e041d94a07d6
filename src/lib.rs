//! revscope - Read a git repository's files as of any revision
//!
//! revscope exposes directory listings and file contents of a git working
//! copy as they were at a requested revision, hiding checkout, caching and
//! switching between revisions. By default it compares the latest
//! semantic-version release tag with the working tree as it is on disk.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to access)
//! - [`access`] - Revision cache and revision-scoped reads
//! - [`core`] - Domain types, tag selection, configuration
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - Output formatting
//!
//! # Correctness Invariants
//!
//! 1. The working copy is only moved by the revision cache
//! 2. The cache is either empty or names what is actually checked out
//! 3. A failed checkout never caches the revision it was asked for
//! 4. Reads with the working-tree revision (`.`) never check anything out
//!
//! # Example
//!
//! ```no_run
//! use revscope::access::VersionedRepo;
//! use revscope::core::config::Config;
//! use std::path::Path;
//!
//! let mut repo = VersionedRepo::open_local(Path::new("."), &Config::default())?;
//! let (before, after) = repo.default_revisions()?;
//! for entry in repo.list_directory(&before, "src")? {
//!     println!("{}", entry.path.display());
//! }
//! let current = repo.read_to_string(&after, "Cargo.toml")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod access;
pub mod cli;
pub mod core;
pub mod git;
pub mod ui;
