//! access::cache
//!
//! Tracks which revision the working copy reflects and positions it before
//! reads.
//!
//! # Invariants
//!
//! - The cache is either empty or names the commit actually checked out.
//! - Only [`RevisionCache::ensure_revision`] mutates it.
//! - A failed checkout never stores the revision it was asked for. The
//!   previous entry survives only if the client still reports it, so a
//!   checkout that failed after moving the tree cannot leave a stale entry.
//! - The working-tree sentinel never touches the client or the cache.

use tracing::{debug, info, warn};

use super::AccessError;
use crate::core::types::Revision;
use crate::git::RepoClient;

/// The last revision confirmed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedVersion {
    /// The revision a caller asked for (e.g. a tag name)
    pub requested: Revision,
    /// What the client reported as checked out after confirming it
    pub actual: Revision,
}

impl CachedVersion {
    fn satisfies(&self, revision: &Revision) -> bool {
        &self.requested == revision || &self.actual == revision
    }
}

/// Revision cache for one working copy.
#[derive(Debug, Clone, Default)]
pub struct RevisionCache {
    current: Option<CachedVersion>,
}

impl RevisionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached version, if a revision has been confirmed.
    pub fn cached(&self) -> Option<&CachedVersion> {
        self.current.as_ref()
    }

    /// Forget the cached version, e.g. after the working copy was changed
    /// outside this cache.
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    /// Make sure the working copy reflects `requested`.
    ///
    /// Checks out through `client` only when the working copy is not
    /// already at the requested revision.
    ///
    /// # Errors
    ///
    /// - [`AccessError::VersionQuery`] if the current version can't be read
    /// - [`AccessError::Checkout`] if switching fails
    pub fn ensure_revision<C>(&mut self, client: &C, requested: &Revision) -> Result<(), AccessError>
    where
        C: RepoClient + ?Sized,
    {
        if requested.is_working_tree() {
            return Ok(());
        }

        if self.current.as_ref().is_some_and(|c| c.satisfies(requested)) {
            debug!(revision = %requested, "revision already checked out (cached)");
            return Ok(());
        }

        let actual = client
            .current_version()
            .map_err(|source| AccessError::VersionQuery { source })?;

        match client.resolve_version(requested) {
            Ok(target) if target == actual => {
                debug!(revision = %requested, commit = %actual.short(12), "working copy already at revision");
                self.current = Some(CachedVersion {
                    requested: requested.clone(),
                    actual,
                });
                return Ok(());
            }
            Ok(_) => {}
            // An unresolvable revision is reported by the checkout itself.
            Err(e) => debug!(revision = %requested, error = %e, "could not resolve revision"),
        }

        info!(from = %actual.short(12), to = %requested, "checking out revision");
        if let Err(source) = client.switch_to_version(requested) {
            self.revalidate(client);
            return Err(AccessError::Checkout {
                revision: requested.clone(),
                source,
            });
        }

        // The tree has moved; the old entry is no longer true even if the
        // confirmation below fails.
        self.current = None;
        let confirmed = client
            .current_version()
            .map_err(|source| AccessError::VersionQuery { source })?;
        self.current = Some(CachedVersion {
            requested: requested.clone(),
            actual: confirmed,
        });
        Ok(())
    }

    /// Keep the cached entry after a failed switch only if the client still
    /// reports the cached version. A switch can fail after the tree moved.
    fn revalidate<C>(&mut self, client: &C)
    where
        C: RepoClient + ?Sized,
    {
        let Some(cached) = &self.current else {
            return;
        };
        match client.current_version() {
            Ok(now) if now == cached.actual => {}
            Ok(now) => {
                warn!(cached = %cached.actual.short(12), now = %now.short(12), "working copy moved by failed checkout");
                self.current = None;
            }
            Err(e) => {
                warn!(error = %e, "cannot confirm working copy after failed checkout");
                self.current = None;
            }
        }
    }
}
