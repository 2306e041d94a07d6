//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. No other module imports
//! `git2`. The rest of the crate talks to repositories through the
//! [`RepoClient`] trait, which [`Git`] implements with `git2` (no shelling
//! out to the git CLI).
//!
//! # Responsibilities
//!
//! - Repository discovery, opening and cloning
//! - Remote reachability checks
//! - Tag enumeration
//! - Querying and switching the checked-out version
//!
//! # Example
//!
//! ```ignore
//! use revscope::git::{Git, RepoClient};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! for tag in git.tags()? {
//!     println!("{tag}");
//! }
//! ```

mod client;
mod interface;

pub use client::RepoClient;
pub use interface::{Git, GitError};
