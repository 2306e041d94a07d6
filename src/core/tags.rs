//! core::tags
//!
//! Selection of the comparison baseline from a repository's tags.
//!
//! # Parsing
//!
//! Tags are parsed leniently: `v?MAJOR(.MINOR(.PATCH)?)?(-PRE)?(+BUILD)?`,
//! with missing minor and patch components treated as zero. Tags that do
//! not parse are not semantic versions and are skipped without error; only
//! the complete absence of a usable tag fails.
//!
//! # Ordering
//!
//! Versions are ordered by semver precedence: major, minor, patch, then
//! pre-release (a release outranks its pre-releases). Build metadata does
//! not participate. When several tags share the same precedence, the one
//! that appears first in the input wins.
//!
//! # Example
//!
//! ```
//! use revscope::core::tags::{select_comparison_tag, TagSelection};
//!
//! let tags = ["v1.0.0", "v1.2.0", "v2.0.0", "garbage"];
//! let latest = select_comparison_tag(&tags, TagSelection::Latest).unwrap();
//! assert_eq!(latest, "v2.0.0");
//!
//! let earliest = select_comparison_tag(&tags, TagSelection::Earliest).unwrap();
//! assert_eq!(earliest, "v1.0.0");
//! ```

use std::cmp::Ordering;

use semver::{BuildMetadata, Prerelease, Version};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors from tag selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    /// The repository has no tags at all.
    #[error("repository has no tags")]
    NoTags,

    /// Tags exist, but none of them is a semantic version.
    #[error("none of the {count} tags is a semantic version")]
    NoValidSemverTag {
        /// Number of tags that were examined
        count: usize,
    },
}

/// Which end of the version ordering is used as the comparison baseline.
///
/// `Latest` is the default: the baseline is the most recent release.
/// `Earliest` reproduces the older behavior of picking the lowest version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSelection {
    #[default]
    Latest,
    Earliest,
}

impl TagSelection {
    /// Names accepted in configuration files.
    pub const NAMES: [&'static str; 2] = ["latest", "earliest"];

    /// Parse a configuration value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "latest" => Some(TagSelection::Latest),
            "earliest" => Some(TagSelection::Earliest),
            _ => None,
        }
    }

    /// The configuration name of this selection.
    pub fn name(&self) -> &'static str {
        match self {
            TagSelection::Latest => "latest",
            TagSelection::Earliest => "earliest",
        }
    }
}

impl std::fmt::Display for TagSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A tag that parsed as a semantic version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemverTag {
    /// The tag exactly as the repository reports it (needed for checkout)
    pub original: String,
    /// The parsed version
    pub version: Version,
}

impl SemverTag {
    /// Parse a tag, returning `None` if it is not a semantic version.
    pub fn parse(tag: &str) -> Option<Self> {
        parse_lenient(tag).map(|version| SemverTag {
            original: tag.to_string(),
            version,
        })
    }

    /// Compare two tags by semver precedence, ignoring build metadata.
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        precedence(&self.version, &other.version)
    }
}

/// Parse a version string leniently.
///
/// ```
/// use revscope::core::tags::parse_lenient;
///
/// assert_eq!(parse_lenient("v1.2").unwrap().to_string(), "1.2.0");
/// assert_eq!(parse_lenient("3").unwrap().to_string(), "3.0.0");
/// assert!(parse_lenient("v").is_none());
/// assert!(parse_lenient("release-1").is_none());
/// ```
pub fn parse_lenient(tag: &str) -> Option<Version> {
    let body = tag.strip_prefix(|c| c == 'v' || c == 'V').unwrap_or(tag);

    let (rest, build) = match body.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (body, None),
    };
    let (core, pre) = match rest.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (rest, None),
    };

    let mut parts = core.split('.');
    let major = parts.next()?;
    let minor = parts.next().unwrap_or("0");
    let patch = parts.next().unwrap_or("0");
    if parts.next().is_some() {
        return None;
    }
    for part in [major, minor, patch] {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    let mut version = Version::new(
        major.parse().ok()?,
        minor.parse().ok()?,
        patch.parse().ok()?,
    );
    if let Some(pre) = pre {
        if pre.is_empty() {
            return None;
        }
        version.pre = Prerelease::new(pre).ok()?;
    }
    if let Some(build) = build {
        if build.is_empty() {
            return None;
        }
        version.build = BuildMetadata::new(build).ok()?;
    }
    Some(version)
}

fn precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch)
        .cmp(&(b.major, b.minor, b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

/// All tags that parse as semantic versions, in ascending precedence.
///
/// The sort is stable: tags with equal precedence keep their input order.
pub fn semver_tags<S: AsRef<str>>(tags: &[S]) -> Vec<SemverTag> {
    let mut parsed: Vec<SemverTag> = tags
        .iter()
        .filter_map(|t| SemverTag::parse(t.as_ref()))
        .collect();
    parsed.sort_by(SemverTag::cmp_precedence);
    parsed
}

/// Pick the comparison tag from tags already sorted by [`semver_tags`].
///
/// Among equal-precedence tags the first one wins, so this agrees with
/// [`select_comparison_tag`] on the unsorted input.
pub fn select_from(sorted: &[SemverTag], selection: TagSelection) -> Option<&SemverTag> {
    match selection {
        TagSelection::Earliest => sorted.first(),
        TagSelection::Latest => {
            let last = sorted.last()?;
            sorted
                .iter()
                .find(|t| t.cmp_precedence(last) == Ordering::Equal)
        }
    }
}

/// Select the tag to compare against.
///
/// Returns the original string of the latest (or earliest, per `selection`)
/// semantic-version tag.
///
/// # Errors
///
/// - [`TagError::NoTags`] if `tags` is empty
/// - [`TagError::NoValidSemverTag`] if no tag is a semantic version
pub fn select_comparison_tag<S: AsRef<str>>(
    tags: &[S],
    selection: TagSelection,
) -> Result<String, TagError> {
    if tags.is_empty() {
        return Err(TagError::NoTags);
    }

    let sorted = semver_tags(tags);
    let discarded = tags.len() - sorted.len();
    if discarded > 0 {
        debug!(discarded, total = tags.len(), "skipped non-semver tags");
    }

    match select_from(&sorted, selection) {
        Some(tag) => {
            debug!(tag = %tag.original, %selection, "selected comparison tag");
            Ok(tag.original.clone())
        }
        None => Err(TagError::NoValidSemverTag { count: tags.len() }),
    }
}
