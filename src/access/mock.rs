//! access::mock
//!
//! Mock repository client for deterministic testing.
//!
//! # Design
//!
//! The mock keeps its "checked out" version in memory and records every
//! call, so tests can assert exactly when the accessor talked to the
//! client and how many checkouts it asked for. Reads still go to a real
//! directory (`root`), which tests usually back with a `TempDir`.
//!
//! # Example
//!
//! ```
//! use revscope::access::mock::{MockClient, MockOperation};
//! use revscope::core::types::Revision;
//! use revscope::git::RepoClient;
//!
//! let client = MockClient::new("/tmp/repo")
//!     .with_tags(["v1.0.0", "v1.1.0"])
//!     .at("main");
//!
//! client.switch_to_version(&Revision::new("v1.0.0").unwrap()).unwrap();
//! assert_eq!(client.head().as_str(), "v1.0.0");
//! assert_eq!(client.switch_count(), 1);
//! assert!(matches!(client.operations()[0], MockOperation::SwitchToVersion(_)));
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::core::types::Revision;
use crate::git::{GitError, RepoClient};

/// Mock repository client.
///
/// Clones share state, so a test can keep a handle after moving the client
/// into a [`VersionedRepo`](super::VersionedRepo).
#[derive(Debug, Clone)]
pub struct MockClient {
    root: PathBuf,
    inner: Arc<Mutex<MockClientInner>>,
}

#[derive(Debug)]
struct MockClientInner {
    tags: Vec<String>,
    head: Revision,
    /// Revision name to the canonical revision it resolves to.
    aliases: HashMap<String, Revision>,
    local: bool,
    reachable: bool,
    fail_on: Option<FailOn>,
    operations: Vec<MockOperation>,
}

/// Which operation should fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailOn {
    /// Fail `tags`.
    Tags,
    /// Fail `current_version`.
    CurrentVersion,
    /// Fail `switch_to_version`.
    SwitchToVersion,
    /// Move to the requested version, then fail `switch_to_version`.
    SwitchToVersionAfterMove,
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Tags,
    CurrentVersion,
    ResolveVersion(Revision),
    SwitchToVersion(Revision),
}

impl MockClient {
    /// Create a mock rooted at `root`, checked out at `main`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            inner: Arc::new(Mutex::new(MockClientInner {
                tags: Vec::new(),
                head: Revision::new("main").expect("static revision"),
                aliases: HashMap::new(),
                local: true,
                reachable: true,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Set the tags the mock reports.
    pub fn with_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.lock().unwrap().tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the version the mock starts at.
    ///
    /// # Panics
    ///
    /// Panics if `head` is not a valid revision.
    pub fn at(self, head: &str) -> Self {
        self.set_head(head);
        self
    }

    /// Make `name` resolve to `canonical`, like a branch resolving to a
    /// commit id. Switching to `name` then reports `canonical` as current.
    pub fn with_alias(self, name: &str, canonical: &str) -> Self {
        let canonical = Revision::new(canonical).unwrap();
        self.inner
            .lock()
            .unwrap()
            .aliases
            .insert(name.to_string(), canonical);
        self
    }

    /// Control what `check_local` and `ping` report.
    pub fn with_health(self, local: bool, reachable: bool) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.local = local;
            inner.reachable = reachable;
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.inner.lock().unwrap().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.inner.lock().unwrap().fail_on = None;
    }

    /// Move the working copy behind the accessor's back.
    pub fn set_head(&self, head: &str) {
        self.inner.lock().unwrap().head = Revision::new(head).unwrap();
    }

    /// The version the mock is currently at.
    pub fn head(&self) -> Revision {
        self.inner.lock().unwrap().head.clone()
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.inner.lock().unwrap().operations.clone()
    }

    /// Number of `switch_to_version` calls, successful or not.
    pub fn switch_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .operations
            .iter()
            .filter(|op| matches!(op, MockOperation::SwitchToVersion(_)))
            .count()
    }

    /// Forget recorded operations.
    pub fn clear_operations(&self) {
        self.inner.lock().unwrap().operations.clear();
    }

    fn record(inner: &mut MockClientInner, op: MockOperation) -> bool {
        let fails = match (&op, &inner.fail_on) {
            (MockOperation::Tags, Some(FailOn::Tags)) => true,
            (MockOperation::CurrentVersion, Some(FailOn::CurrentVersion)) => true,
            (
                MockOperation::SwitchToVersion(_),
                Some(FailOn::SwitchToVersion | FailOn::SwitchToVersionAfterMove),
            ) => true,
            _ => false,
        };
        inner.operations.push(op);
        fails
    }
}

impl RepoClient for MockClient {
    fn root(&self) -> &Path {
        &self.root
    }

    fn check_local(&self) -> bool {
        self.inner.lock().unwrap().local
    }

    fn ping(&self) -> bool {
        self.inner.lock().unwrap().reachable
    }

    fn tags(&self) -> Result<Vec<String>, GitError> {
        let mut inner = self.inner.lock().unwrap();
        if Self::record(&mut inner, MockOperation::Tags) {
            return Err(GitError::Internal {
                message: "mock tag listing failure".to_string(),
            });
        }
        Ok(inner.tags.clone())
    }

    fn current_version(&self) -> Result<Revision, GitError> {
        let mut inner = self.inner.lock().unwrap();
        if Self::record(&mut inner, MockOperation::CurrentVersion) {
            return Err(GitError::Internal {
                message: "mock version query failure".to_string(),
            });
        }
        Ok(inner.head.clone())
    }

    fn resolve_version(&self, revision: &Revision) -> Result<Revision, GitError> {
        let mut inner = self.inner.lock().unwrap();
        Self::record(&mut inner, MockOperation::ResolveVersion(revision.clone()));
        Ok(inner
            .aliases
            .get(revision.as_str())
            .cloned()
            .unwrap_or_else(|| revision.clone()))
    }

    fn switch_to_version(&self, revision: &Revision) -> Result<(), GitError> {
        let mut inner = self.inner.lock().unwrap();
        let fails = Self::record(&mut inner, MockOperation::SwitchToVersion(revision.clone()));
        let target = inner
            .aliases
            .get(revision.as_str())
            .cloned()
            .unwrap_or_else(|| revision.clone());

        if fails {
            if inner.fail_on == Some(FailOn::SwitchToVersionAfterMove) {
                inner.head = target;
            }
            return Err(GitError::CheckoutConflict {
                revision: revision.to_string(),
                message: "mock checkout failure".to_string(),
            });
        }
        inner.head = target;
        Ok(())
    }
}
