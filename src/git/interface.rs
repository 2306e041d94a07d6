//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to all Git operations in
//! revscope. All interactions flow through [`Git`], which provides structured
//! results and normalizes errors into typed failure categories.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RevisionNotFound`]: Requested revision does not exist
//! - [`GitError::CheckoutConflict`]: Local changes block a checkout
//! - [`GitError::Unreachable`]: Remote could not be contacted
//! - [`GitError::UnsupportedTransport`]: URL scheme not compiled in
//!
//! # Example
//!
//! ```ignore
//! use revscope::core::types::Revision;
//! use revscope::git::{Git, RepoClient};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! println!("at {}", git.current_version()?.short(7));
//! git.switch_to_version(&Revision::new("v1.0.0")?)?;
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use super::RepoClient;
use crate::core::types::{Revision, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Requested revision does not exist.
    #[error("revision not found: {revision}")]
    RevisionNotFound {
        /// The revision that was not found
        revision: String,
    },

    /// Local changes would be overwritten by a checkout.
    #[error("cannot check out {revision}: {message}")]
    CheckoutConflict {
        /// The revision being checked out
        revision: String,
        /// Description of the conflict
        message: String,
    },

    /// Remote could not be contacted.
    #[error("cannot reach {url}: {message}")]
    Unreachable {
        /// The remote URL
        url: String,
        /// The transport error
        message: String,
    },

    /// The URL needs a transport this build was compiled without.
    #[error("{url} needs revscope built with the `{feature}` feature")]
    UnsupportedTransport {
        /// The remote URL
        url: String,
        /// Cargo feature that enables the transport
        feature: &'static str,
    },

    /// Invalid revision string reported by or passed to git.
    #[error("invalid revision: {message}")]
    InvalidRevision {
        /// Description of the problem
        message: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::UnbornBranch => {
                GitError::RevisionNotFound {
                    revision: context.to_string(),
                }
            }
            git2::ErrorCode::InvalidSpec | git2::ErrorCode::Ambiguous => {
                GitError::InvalidRevision {
                    message: format!("{}: {}", context, err.message()),
                }
            }
            git2::ErrorCode::Conflict | git2::ErrorCode::Uncommitted => {
                GitError::CheckoutConflict {
                    revision: context.to_string(),
                    message: err.message().to_string(),
                }
            }
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidRevision(message) => GitError::InvalidRevision { message },
        }
    }
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. No other module
/// imports `git2` directly.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
    /// Working directory of the repository
    root: PathBuf,
    /// Remote consulted by [`RepoClient::ping`]
    remote: String,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("root", &self.root)
            .field("remote", &self.remote)
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening
    // =========================================================================

    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// within the repository; the root is always the top of the working
    /// directory.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Self::from_repository(repo)
    }

    /// Top of the working directory containing `path`, without opening
    /// the repository for use.
    pub fn discover_root(path: &Path) -> Result<PathBuf, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        repo.workdir()
            .map(Path::to_path_buf)
            .ok_or(GitError::BareRepo)
    }

    /// Clone `url` into `dest` and open the result.
    ///
    /// `url` may be anything libgit2 accepts: a local path, `file://`, and
    /// (with the matching crate features) `https://` or `ssh://`.
    pub fn clone_into(url: &str, dest: &Path) -> Result<Self, GitError> {
        check_transport(url)?;
        debug!(url, dest = %dest.display(), "cloning repository");
        let repo = git2::build::RepoBuilder::new()
            .clone(url, dest)
            .map_err(|e| GitError::Internal {
                message: format!("clone of {} failed: {}", url, e.message()),
            })?;
        Self::from_repository(repo)
    }

    fn from_repository(repo: git2::Repository) -> Result<Self, GitError> {
        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }
        let root = repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();

        Ok(Self {
            repo,
            root,
            remote: "origin".to_string(),
        })
    }

    /// Use `remote` instead of "origin" for reachability checks.
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// Check that a remote URL answers, without cloning it.
    pub fn ping_url(url: &str) -> Result<(), GitError> {
        check_transport(url)?;
        let mut remote =
            git2::Remote::create_detached(url).map_err(|e| GitError::Unreachable {
                url: url.to_string(),
                message: e.message().to_string(),
            })?;
        Self::connect(&mut remote, url)
    }

    fn connect(remote: &mut git2::Remote<'_>, url: &str) -> Result<(), GitError> {
        remote
            .connect(git2::Direction::Fetch)
            .map_err(|e| GitError::Unreachable {
                url: url.to_string(),
                message: e.message().to_string(),
            })?;
        // Only reachability matters; a failed disconnect does not change that.
        let _ = remote.disconnect();
        Ok(())
    }

    /// Contact the configured remote.
    ///
    /// A repository without that remote is local-only and passes.
    pub fn check_remote(&self) -> Result<(), GitError> {
        let mut remote = match self.repo.find_remote(&self.remote) {
            Ok(remote) => remote,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(()),
            Err(e) => {
                return Err(GitError::Unreachable {
                    url: self.remote.clone(),
                    message: e.message().to_string(),
                })
            }
        };
        let url = remote.url().unwrap_or_default().to_string();
        check_transport(&url)?;
        Self::connect(&mut remote, &url)
    }

    /// Get the URL for a remote.
    ///
    /// Returns `None` if the remote doesn't exist.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(String::from)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::Internal {
                message: e.message().to_string(),
            }),
        }
    }

    /// Peel a revision to the id of the commit it names.
    fn commit_id(&self, spec: &str) -> Result<Revision, GitError> {
        let commit = self
            .repo
            .revparse_single(spec)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| GitError::from_git2(e, spec))?;
        Ok(Revision::new(commit.id().to_string())?)
    }

    /// Put back HEAD's files after a switch to `abandoned` moved the tree
    /// but not HEAD.
    ///
    /// Only paths that differ between the two trees are rewritten. The safe
    /// checkout that just succeeded found none of them modified, so forcing
    /// them loses no local edits; everything else is left alone.
    fn restore_head_tree(&self, abandoned: &git2::Commit<'_>) -> Result<(), git2::Error> {
        let head = self.repo.head()?.peel_to_commit()?;
        let diff = self.repo.diff_tree_to_tree(
            Some(&abandoned.tree()?),
            Some(&head.tree()?),
            None,
        )?;

        let mut opts = git2::build::CheckoutBuilder::new();
        opts.force().disable_pathspec_match(true);
        let mut changed = 0usize;
        for delta in diff.deltas() {
            for path in [delta.old_file().path(), delta.new_file().path()]
                .into_iter()
                .flatten()
            {
                opts.path(path);
                changed += 1;
            }
        }
        if changed == 0 {
            return Ok(());
        }
        self.repo.checkout_tree(head.as_object(), Some(&mut opts))
    }
}

/// Reject URLs whose transport was not compiled into libgit2, so the
/// caller learns which feature to enable instead of a bare libgit2 error.
fn check_transport(url: &str) -> Result<(), GitError> {
    let unsupported = |feature: &'static str| -> Result<(), GitError> {
        Err(GitError::UnsupportedTransport {
            url: url.to_string(),
            feature,
        })
    };
    let lower = url.to_ascii_lowercase();
    if !cfg!(feature = "https") && (lower.starts_with("https://") || lower.starts_with("http://")) {
        return unsupported("https");
    }
    if !cfg!(feature = "ssh") && (lower.starts_with("ssh://") || is_scp_like(url)) {
        return unsupported("ssh");
    }
    Ok(())
}

/// `user@host:path`, the short form git treats as ssh.
fn is_scp_like(url: &str) -> bool {
    if url.contains("://") {
        return false;
    }
    match url.split_once(':') {
        Some((host, _)) => host.contains('@') && !host.contains('/'),
        None => false,
    }
}

impl RepoClient for Git {
    fn root(&self) -> &Path {
        &self.root
    }

    fn check_local(&self) -> bool {
        !self.repo.is_bare() && self.root.is_dir()
    }

    /// A repository without the configured remote is local-only and always
    /// reachable.
    fn ping(&self) -> bool {
        match self.check_remote() {
            Ok(()) => true,
            Err(e) => {
                debug!(remote = %self.remote, error = %e, "ping failed");
                false
            }
        }
    }

    fn tags(&self) -> Result<Vec<String>, GitError> {
        let names = self
            .repo
            .tag_names(None)
            .map_err(|e| GitError::from_git2(e, "refs/tags"))?;
        Ok(names.iter().flatten().map(String::from).collect())
    }

    fn current_version(&self) -> Result<Revision, GitError> {
        self.commit_id("HEAD")
    }

    fn resolve_version(&self, revision: &Revision) -> Result<Revision, GitError> {
        self.commit_id(revision.as_str())
    }

    fn switch_to_version(&self, revision: &Revision) -> Result<(), GitError> {
        let spec = revision.as_str();
        let (object, reference) = self
            .repo
            .revparse_ext(spec)
            .map_err(|e| GitError::from_git2(e, spec))?;
        let commit = object
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, spec))?;

        let mut opts = git2::build::CheckoutBuilder::new();
        opts.safe();
        self.repo
            .checkout_tree(commit.as_object(), Some(&mut opts))
            .map_err(|e| GitError::from_git2(e, spec))?;

        // Branches stay attached; tags and commit ids detach HEAD, as
        // `git checkout` does.
        let branch = reference
            .filter(|r| r.is_branch())
            .and_then(|r| r.name().map(String::from));
        let moved = match branch {
            Some(name) => self.repo.set_head(&name),
            None => self.repo.set_head_detached(commit.id()),
        };
        if let Err(e) = moved {
            // HEAD still names the old commit; put its tree back so HEAD and
            // the files agree.
            if let Err(restore) = self.restore_head_tree(&commit) {
                warn!(revision = spec, error = %restore, "could not restore working tree after failed checkout");
            }
            return Err(GitError::from_git2(e, spec));
        }
        Ok(())
    }
}
