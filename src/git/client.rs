//! git::client
//!
//! The narrow capability the versioned accessor needs from a repository.
//!
//! [`Git`](super::Git) is the production implementation. Tests substitute
//! an in-memory client so checkout decisions can be observed directly.

use std::path::Path;

use super::GitError;
use crate::core::types::Revision;

/// Operations a versioned accessor performs against a working copy.
///
/// All methods block until the underlying operation completes.
pub trait RepoClient {
    /// Root of the working copy. Reads are resolved against this path.
    fn root(&self) -> &Path;

    /// Whether the root is a usable working copy.
    fn check_local(&self) -> bool;

    /// Whether the repository's remote (if any) can be reached.
    fn ping(&self) -> bool;

    /// Every tag name the repository exposes, in no particular order.
    fn tags(&self) -> Result<Vec<String>, GitError>;

    /// The revision the working copy is actually positioned at.
    fn current_version(&self) -> Result<Revision, GitError>;

    /// The revision `revision` names, in the same form `current_version`
    /// reports.
    ///
    /// Clients whose revisions are already canonical can rely on the default,
    /// which returns the revision unchanged.
    fn resolve_version(&self, revision: &Revision) -> Result<Revision, GitError> {
        Ok(revision.clone())
    }

    /// Move the working copy to `revision`.
    fn switch_to_version(&self, revision: &Revision) -> Result<(), GitError>;
}
