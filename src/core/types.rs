//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Revision`] - A revision token, or the working-tree sentinel
//!
//! # Examples
//!
//! ```
//! use revscope::core::types::Revision;
//!
//! let tag = Revision::new("v1.0.0").unwrap();
//! assert!(!tag.is_working_tree());
//!
//! let tree = Revision::working_tree();
//! assert!(tree.is_working_tree());
//! assert_eq!(tree.as_str(), ".");
//!
//! assert!(Revision::new("").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid revision: {0}")]
    InvalidRevision(String),
}

/// A revision understood by the repository client.
///
/// Either a concrete revision token (branch, tag, commit id) or the
/// reserved sentinel [`Revision::WORKING_TREE`], which names the working
/// tree exactly as it is on disk, without checking anything out.
///
/// Git never produces `.` as a branch, tag or commit id, so the sentinel
/// cannot collide with a real revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Revision(String);

impl Revision {
    /// The working-tree sentinel.
    pub const WORKING_TREE: &'static str = ".";

    /// Create a new revision.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRevision` if the string is empty or
    /// contains whitespace or control characters.
    pub fn new(rev: impl Into<String>) -> Result<Self, TypeError> {
        let rev = rev.into();
        Self::validate(&rev)?;
        Ok(Self(rev))
    }

    /// The revision naming the current, unmodified working tree.
    pub fn working_tree() -> Self {
        Self(Self::WORKING_TREE.to_string())
    }

    /// Check if this is the working-tree sentinel.
    pub fn is_working_tree(&self) -> bool {
        self.0 == Self::WORKING_TREE
    }

    /// Get an abbreviated form, useful for commit ids.
    ///
    /// ```
    /// use revscope::core::types::Revision;
    ///
    /// let rev = Revision::new("abc123def4567890abc123def4567890abc12345").unwrap();
    /// assert_eq!(rev.short(7), "abc123d");
    /// assert_eq!(Revision::working_tree().short(7), ".");
    /// ```
    pub fn short(&self, len: usize) -> &str {
        match self.0.char_indices().nth(len) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }

    fn validate(rev: &str) -> Result<(), TypeError> {
        if rev.is_empty() {
            return Err(TypeError::InvalidRevision(
                "revision cannot be empty".into(),
            ));
        }
        if rev.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidRevision(format!(
                "revision cannot contain whitespace or control characters: {rev:?}"
            )));
        }
        Ok(())
    }

    /// Get the revision as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Revision {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Revision> for String {
    fn from(rev: Revision) -> Self {
        rev.0
    }
}

impl AsRef<str> for Revision {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Revision {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
