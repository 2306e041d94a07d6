//! access
//!
//! Revision-scoped access to a working copy.
//!
//! # Modules
//!
//! - [`cache`] - Which revision is on disk, and the checkout-ensuring step
//! - [`repository`] - [`VersionedRepo`]: default revisions, directory
//!   listings and file reads as of a revision
//! - [`mock`] - In-memory [`RepoClient`](crate::git::RepoClient) for tests
//!
//! # Error Handling
//!
//! Every client or filesystem failure is returned to the caller wrapped in
//! an [`AccessError`] naming the operation. Nothing is retried here.

pub mod cache;
pub mod mock;
pub mod repository;

pub use cache::{CachedVersion, RevisionCache};
pub use repository::{FileEntry, FileKind, RepoSource, TagListing, VersionedRepo};

use std::path::PathBuf;

use thiserror::Error;

use crate::core::tags::TagError;
use crate::core::types::Revision;
use crate::git::GitError;

/// Errors from revision-scoped access.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The local path is not a working copy.
    #[error("directory is not a repository: {path}")]
    NotARepository { path: PathBuf, source: GitError },

    /// The repository (or its remote) could not be contacted.
    #[error("cannot ping repository: {location}")]
    Unreachable { location: String, source: GitError },

    /// Cloning a remote repository failed.
    #[error("failed to clone {url}")]
    Clone { url: String, source: GitError },

    /// Listing tags failed.
    #[error("failed to list tags")]
    TagQuery(#[source] GitError),

    /// The repository has no tags.
    #[error("no tags detected")]
    NoTags,

    /// No tag is a semantic version.
    #[error("none of the {count} tags is a semantic version")]
    NoValidSemverTag { count: usize },

    /// The checked-out version could not be determined.
    #[error("failed to query current version")]
    VersionQuery { source: GitError },

    /// Switching the working copy failed.
    #[error("failed to check out {revision}")]
    Checkout { revision: Revision, source: GitError },

    /// Reading from the working copy failed.
    #[error("failed to read '{path}'")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The temporary clone directory could not be created.
    #[error("failed to create clone directory")]
    TempDir(#[source] std::io::Error),
}

impl AccessError {
    /// Whether a read failed because the path does not exist at the revision.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AccessError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

impl From<TagError> for AccessError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::NoTags => AccessError::NoTags,
            TagError::NoValidSemverTag { count } => AccessError::NoValidSemverTag { count },
        }
    }
}
