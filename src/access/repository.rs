//! access::repository
//!
//! Revision-scoped reads against one working copy.
//!
//! A [`VersionedRepo`] owns its repository client, its revision cache and,
//! for remote sources, the temporary clone. Reads take `&mut self`: the
//! working copy has a single current revision, so one value must not be
//! driven by two callers at once. Concurrent consumers open one
//! `VersionedRepo` each.
//!
//! # Example
//!
//! ```no_run
//! use revscope::access::{RepoSource, VersionedRepo};
//! use revscope::core::config::Config;
//! use std::io::Read;
//!
//! let source = RepoSource::parse("/path/to/repo");
//! let mut repo = VersionedRepo::open(&source, &Config::default())?;
//!
//! let (before, after) = repo.default_revisions()?;
//! let old = repo.read_to_string(&before, "pkg/api.go")?;
//! let mut new = String::new();
//! repo.read_file(&after, "pkg/api.go")?.read_to_string(&mut new)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, info};

use super::cache::{CachedVersion, RevisionCache};
use super::AccessError;
use crate::core::config::Config;
use crate::core::tags::{self, SemverTag, TagSelection};
use crate::core::types::Revision;
use crate::git::{Git, GitError, RepoClient};

/// Where a repository comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSource {
    /// An existing working copy on disk.
    Local(PathBuf),
    /// A URL to clone into a temporary directory.
    Remote(String),
}

impl RepoSource {
    /// Classify a user-supplied location.
    ///
    /// URLs with a scheme, scp-style `user@host:path` locations, and `.git`
    /// paths that are not existing directories are remote; everything else
    /// is a local path.
    ///
    /// ```
    /// use revscope::access::RepoSource;
    ///
    /// assert!(matches!(RepoSource::parse("https://example.com/x.git"), RepoSource::Remote(_)));
    /// assert!(matches!(RepoSource::parse("git@example.com:org/x.git"), RepoSource::Remote(_)));
    /// assert!(matches!(RepoSource::parse("./checkout"), RepoSource::Local(_)));
    /// ```
    pub fn parse(location: &str) -> Self {
        let scp_like = location
            .split_once(':')
            .is_some_and(|(host, _)| host.contains('@') && !host.contains('/'));
        let bare_git = location.ends_with(".git") && !Path::new(location).is_dir();

        if location.contains("://") || scp_like || bare_git {
            RepoSource::Remote(location.to_string())
        } else {
            RepoSource::Local(PathBuf::from(location))
        }
    }

    /// Top of the working copy a local source points into.
    ///
    /// `None` for remotes and for paths outside any repository.
    pub fn local_root(&self) -> Option<PathBuf> {
        match self {
            RepoSource::Local(path) => Git::discover_root(path).ok(),
            RepoSource::Remote(_) => None,
        }
    }
}

impl std::fmt::Display for RepoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoSource::Local(path) => write!(f, "{}", path.display()),
            RepoSource::Remote(url) => f.write_str(url),
        }
    }
}

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Dir,
    Symlink,
    Other,
}

impl From<fs::FileType> for FileKind {
    fn from(ft: fs::FileType) -> Self {
        if ft.is_symlink() {
            FileKind::Symlink
        } else if ft.is_dir() {
            FileKind::Dir
        } else if ft.is_file() {
            FileKind::File
        } else {
            FileKind::Other
        }
    }
}

/// Metadata for one directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// File name within the directory
    pub name: String,
    /// Path relative to the repository root
    pub path: PathBuf,
    /// What kind of entry this is (symlinks are not followed)
    pub kind: FileKind,
    /// Size in bytes
    pub len: u64,
    /// Last modification time, if the platform reports one
    pub modified: Option<DateTime<Utc>>,
}

impl FileEntry {
    /// Whether the entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }
}

/// Tags in ascending order and the default baseline among them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagListing {
    pub tags: Vec<SemverTag>,
    /// `None` when no tag is a semantic version
    pub selected: Option<String>,
}

/// A working copy with revision-scoped reads.
pub struct VersionedRepo<C = Git> {
    client: C,
    cache: RevisionCache,
    selection: TagSelection,
    remote_url: Option<String>,
    // Dropped last, after the client has closed the repository.
    clone_dir: Option<TempDir>,
}

impl<C: RepoClient> std::fmt::Debug for VersionedRepo<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedRepo")
            .field("root", &self.client.root())
            .field("cached", &self.cache.cached())
            .field("selection", &self.selection)
            .field("remote_url", &self.remote_url)
            .finish()
    }
}

impl<C: RepoClient> VersionedRepo<C> {
    /// Wrap an already-opened client.
    pub fn new(client: C) -> Self {
        Self {
            client,
            cache: RevisionCache::new(),
            selection: TagSelection::default(),
            remote_url: None,
            clone_dir: None,
        }
    }

    /// Choose which end of the tag ordering [`default_revisions`] uses.
    ///
    /// [`default_revisions`]: VersionedRepo::default_revisions
    pub fn with_selection(mut self, selection: TagSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Root of the working copy.
    pub fn root(&self) -> &Path {
        self.client.root()
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The URL this repository was cloned from, if it was cloned.
    pub fn remote_url(&self) -> Option<&str> {
        self.remote_url.as_deref()
    }

    /// The temporary directory holding a cloned repository.
    pub fn clone_dir(&self) -> Option<&Path> {
        self.clone_dir.as_ref().map(TempDir::path)
    }

    /// The revision the working copy was last confirmed at.
    pub fn cached_version(&self) -> Option<&CachedVersion> {
        self.cache.cached()
    }

    /// Forget the cached revision (after changing the working copy by other
    /// means).
    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate();
    }

    /// The revisions to compare when the caller names none.
    ///
    /// `before` is the selected semantic-version tag; `after` is always the
    /// working tree as it is on disk. Nothing is checked out.
    ///
    /// # Errors
    ///
    /// - [`AccessError::TagQuery`] if tags can't be listed
    /// - [`AccessError::NoTags`] / [`AccessError::NoValidSemverTag`]
    pub fn default_revisions(&self) -> Result<(Revision, Revision), AccessError> {
        let tags = self.client.tags().map_err(AccessError::TagQuery)?;
        let tag = tags::select_comparison_tag(&tags, self.selection)?;
        let before = Revision::new(tag).map_err(|e| AccessError::TagQuery(e.into()))?;
        Ok((before, Revision::working_tree()))
    }

    /// Semantic-version tags in ascending order.
    pub fn semver_tags(&self) -> Result<Vec<SemverTag>, AccessError> {
        let tags = self.client.tags().map_err(AccessError::TagQuery)?;
        Ok(tags::semver_tags(&tags))
    }

    /// Semantic-version tags together with the one [`default_revisions`]
    /// would compare against, from a single tag query.
    ///
    /// [`default_revisions`]: VersionedRepo::default_revisions
    pub fn tag_listing(&self) -> Result<TagListing, AccessError> {
        let tags = self.semver_tags()?;
        let selected = tags::select_from(&tags, self.selection).map(|t| t.original.clone());
        Ok(TagListing { tags, selected })
    }

    /// Position the working copy at `revision`, checking out only if needed.
    pub fn ensure_revision(&mut self, revision: &Revision) -> Result<(), AccessError> {
        self.cache.ensure_revision(&self.client, revision)
    }

    /// List a directory as of `revision`.
    ///
    /// `path` is relative to the repository root. Entries are sorted by
    /// name. The path is not checked for escaping the root.
    pub fn list_directory(
        &mut self,
        revision: &Revision,
        path: impl AsRef<Path>,
    ) -> Result<Vec<FileEntry>, AccessError> {
        self.ensure_revision(revision)?;

        let rel = path.as_ref();
        let dir = self.root().join(rel);
        let read_err = |source| AccessError::Read {
            path: dir.clone(),
            source,
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let meta = entry.metadata().map_err(read_err)?;
            let name = entry.file_name();
            entries.push(FileEntry {
                name: name.to_string_lossy().into_owned(),
                path: rel.join(&name),
                kind: meta.file_type().into(),
                len: meta.len(),
                modified: meta.modified().ok().map(DateTime::<Utc>::from),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(revision = %revision, path = %rel.display(), count = entries.len(), "listed directory");
        Ok(entries)
    }

    /// Open a file as of `revision`.
    ///
    /// The handle is closed when dropped. Reading it after another revision
    /// has been checked out yields that revision's content.
    pub fn read_file(
        &mut self,
        revision: &Revision,
        path: impl AsRef<Path>,
    ) -> Result<File, AccessError> {
        self.ensure_revision(revision)?;

        let full = self.root().join(path.as_ref());
        File::open(&full).map_err(|source| AccessError::Read { path: full, source })
    }

    /// Read a whole UTF-8 file as of `revision`.
    pub fn read_to_string(
        &mut self,
        revision: &Revision,
        path: impl AsRef<Path>,
    ) -> Result<String, AccessError> {
        let path = path.as_ref();
        let mut file = self.read_file(revision, path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|source| AccessError::Read {
                path: self.root().join(path),
                source,
            })?;
        Ok(contents)
    }
}

impl VersionedRepo<Git> {
    /// Open a repository from either kind of source.
    pub fn open(source: &RepoSource, config: &Config) -> Result<Self, AccessError> {
        match source {
            RepoSource::Local(path) => Self::open_local(path, config),
            RepoSource::Remote(url) => Self::open_remote(url, config),
        }
    }

    /// Open an existing working copy.
    ///
    /// # Errors
    ///
    /// - [`AccessError::NotARepository`] if `path` is not a working copy
    /// - [`AccessError::Unreachable`] if its remote can't be contacted (only
    ///   when `verify_remote` is enabled)
    pub fn open_local(path: &Path, config: &Config) -> Result<Self, AccessError> {
        let git = Git::open(path)
            .map_err(|source| AccessError::NotARepository {
                path: path.to_path_buf(),
                source,
            })?
            .with_remote(config.remote());

        if !git.check_local() {
            return Err(AccessError::NotARepository {
                path: path.to_path_buf(),
                source: GitError::NotARepo {
                    path: git.root().to_path_buf(),
                },
            });
        }
        if config.verify_remote() {
            if let Err(source) = git.check_remote() {
                let location = git
                    .remote_url(config.remote())
                    .ok()
                    .flatten()
                    .unwrap_or_else(|| config.remote().to_string());
                debug!(%location, error = %source, "remote check failed");
                return Err(AccessError::Unreachable { location, source });
            }
        }

        Ok(Self::new(git).with_selection(config.tag_selection()))
    }

    /// Clone `url` into a fresh directory under the configured clone root.
    ///
    /// The clone is removed when the returned value is dropped, unless the
    /// configuration asks to keep it.
    ///
    /// # Errors
    ///
    /// - [`AccessError::Unreachable`] if `url` doesn't answer
    /// - [`AccessError::TempDir`] if the clone directory can't be created
    /// - [`AccessError::Clone`] if cloning fails
    pub fn open_remote(url: &str, config: &Config) -> Result<Self, AccessError> {
        info!(url, "pinging repository");
        Git::ping_url(url).map_err(|source| AccessError::Unreachable {
            location: url.to_string(),
            source,
        })?;

        let root = config.clone_root();
        fs::create_dir_all(&root).map_err(AccessError::TempDir)?;
        let dir = tempfile::Builder::new()
            .prefix("revscope-")
            .keep(config.keep_clone())
            .tempdir_in(&root)
            .map_err(AccessError::TempDir)?;

        info!(url, dest = %dir.path().display(), "cloning repository");
        let git = Git::clone_into(url, dir.path()).map_err(|source| AccessError::Clone {
            url: url.to_string(),
            source,
        })?;

        let mut repo = Self::new(git).with_selection(config.tag_selection());
        repo.remote_url = Some(url.to_string());
        repo.clone_dir = Some(dir);
        Ok(repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::mock::{FailOn, MockClient};
    use tempfile::TempDir;

    fn rev(s: &str) -> Revision {
        Revision::new(s).unwrap()
    }

    /// A mock-backed repo whose root holds `pkg/api.go` and `README.md`.
    fn fixture(client: impl FnOnce(MockClient) -> MockClient) -> (TempDir, MockClient) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("pkg")).unwrap();
        fs::write(dir.path().join("pkg/api.go"), "package pkg\n").unwrap();
        fs::write(dir.path().join("README.md"), "# readme\n").unwrap();
        let mock = client(MockClient::new(dir.path()).at("main"));
        (dir, mock)
    }

    mod default_revisions {
        use super::*;

        #[test]
        fn latest_tag_and_working_tree() {
            let (_dir, mock) = fixture(|m| m.with_tags(["v0.9.0", "v1.0.0"]));
            let repo = VersionedRepo::new(mock.clone());

            let (before, after) = repo.default_revisions().unwrap();
            assert_eq!(before, rev("v1.0.0"));
            assert!(after.is_working_tree());
            assert_eq!(mock.switch_count(), 0);
        }

        #[test]
        fn earliest_selection() {
            let (_dir, mock) = fixture(|m| m.with_tags(["v1.2.0", "v1.0.0", "wip"]));
            let repo = VersionedRepo::new(mock).with_selection(TagSelection::Earliest);

            let (before, _) = repo.default_revisions().unwrap();
            assert_eq!(before, rev("v1.0.0"));
        }

        #[test]
        fn no_tags() {
            let (_dir, mock) = fixture(|m| m);
            let repo = VersionedRepo::new(mock);
            assert!(matches!(repo.default_revisions(), Err(AccessError::NoTags)));
        }

        #[test]
        fn no_semver_tags() {
            let (_dir, mock) = fixture(|m| m.with_tags(["foo", "not-a-version", "v"]));
            let repo = VersionedRepo::new(mock);
            assert!(matches!(
                repo.default_revisions(),
                Err(AccessError::NoValidSemverTag { count: 3 })
            ));
        }

        #[test]
        fn tag_query_failure() {
            let (_dir, mock) = fixture(|m| m.fail_on(FailOn::Tags));
            let repo = VersionedRepo::new(mock);
            assert!(matches!(repo.default_revisions(), Err(AccessError::TagQuery(_))));
        }
    }

    mod tag_listing {
        use super::*;
        use crate::access::mock::MockOperation;

        #[test]
        fn one_query_for_tags_and_selection() {
            let (_dir, mock) = fixture(|m| m.with_tags(["v1.0.0", "nightly", "v0.9.0"]));
            let repo = VersionedRepo::new(mock.clone());

            let listing = repo.tag_listing().unwrap();
            let names: Vec<_> = listing.tags.iter().map(|t| t.original.as_str()).collect();
            assert_eq!(names, ["v0.9.0", "v1.0.0"]);
            assert_eq!(listing.selected.as_deref(), Some("v1.0.0"));
            assert_eq!(mock.operations(), vec![MockOperation::Tags]);
        }

        #[test]
        fn selection_follows_configuration() {
            let (_dir, mock) = fixture(|m| m.with_tags(["v1.0.0", "v0.9.0"]));
            let repo = VersionedRepo::new(mock).with_selection(TagSelection::Earliest);
            assert_eq!(repo.tag_listing().unwrap().selected.as_deref(), Some("v0.9.0"));
        }

        #[test]
        fn nothing_selected_without_semver_tags() {
            let (_dir, mock) = fixture(|m| m.with_tags(["nightly"]));
            let repo = VersionedRepo::new(mock);

            let listing = repo.tag_listing().unwrap();
            assert!(listing.tags.is_empty());
            assert_eq!(listing.selected, None);
        }
    }

    mod reads {
        use super::*;

        #[test]
        fn working_tree_reads_never_check_out() {
            let (_dir, mock) = fixture(|m| m);
            let mut repo = VersionedRepo::new(mock.clone());
            let tree = Revision::working_tree();

            let entries = repo.list_directory(&tree, "").unwrap();
            let content = repo.read_to_string(&tree, "pkg/api.go").unwrap();

            assert_eq!(entries.len(), 2);
            assert_eq!(content, "package pkg\n");
            assert!(mock.operations().is_empty());
        }

        #[test]
        fn listing_is_sorted_with_metadata() {
            let (_dir, mock) = fixture(|m| m);
            let mut repo = VersionedRepo::new(mock);

            let entries = repo
                .list_directory(&Revision::working_tree(), "")
                .unwrap();
            let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
            assert_eq!(names, ["README.md", "pkg"]);

            assert!(entries[1].is_dir());
            assert_eq!(entries[0].kind, FileKind::File);
            assert_eq!(entries[0].len, 9);
            assert_eq!(entries[0].path, PathBuf::from("README.md"));
        }

        #[test]
        fn nested_listing_paths_are_repo_relative() {
            let (_dir, mock) = fixture(|m| m);
            let mut repo = VersionedRepo::new(mock);

            let entries = repo
                .list_directory(&Revision::working_tree(), "pkg")
                .unwrap();
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].path, PathBuf::from("pkg/api.go"));
        }

        #[test]
        fn tagged_read_checks_out_once() {
            let (_dir, mock) = fixture(|m| m.with_tags(["v1.0.0"]));
            let mut repo = VersionedRepo::new(mock.clone());
            let tag = rev("v1.0.0");

            repo.read_to_string(&tag, "pkg/api.go").unwrap();
            repo.list_directory(&tag, "pkg").unwrap();
            repo.read_file(&tag, "README.md").unwrap();

            assert_eq!(mock.switch_count(), 1);
            assert_eq!(repo.cached_version().unwrap().actual, tag);
        }

        #[test]
        fn missing_file_is_read_error() {
            let (_dir, mock) = fixture(|m| m);
            let mut repo = VersionedRepo::new(mock);

            let err = repo
                .read_file(&Revision::working_tree(), "pkg/missing.go")
                .unwrap_err();
            assert!(err.is_not_found());
            assert!(err.to_string().contains("missing.go"));
        }

        #[test]
        fn missing_directory_is_read_error() {
            let (_dir, mock) = fixture(|m| m);
            let mut repo = VersionedRepo::new(mock);

            let err = repo
                .list_directory(&Revision::working_tree(), "nope")
                .unwrap_err();
            assert!(matches!(err, AccessError::Read { .. }));
        }

        #[test]
        fn failed_checkout_skips_read() {
            let (_dir, mock) = fixture(|m| m.fail_on(FailOn::SwitchToVersion));
            let mut repo = VersionedRepo::new(mock.clone());

            let err = repo.read_file(&rev("v1.0.0"), "README.md").unwrap_err();
            assert!(matches!(err, AccessError::Checkout { .. }));
            assert!(repo.cached_version().is_none());

            mock.clear_fail_on();
            repo.read_file(&rev("v1.0.0"), "README.md").unwrap();
            assert_eq!(mock.switch_count(), 2);
        }
    }

    mod cache_control {
        use super::*;

        #[test]
        fn invalidate_after_external_move() {
            let (_dir, mock) = fixture(|m| m.with_tags(["v1.0.0"]));
            let mut repo = VersionedRepo::new(mock.clone());
            let tag = rev("v1.0.0");

            repo.read_to_string(&tag, "README.md").unwrap();
            mock.set_head("main");

            // Still trusted until told otherwise.
            repo.read_to_string(&tag, "README.md").unwrap();
            assert_eq!(mock.switch_count(), 1);

            repo.invalidate_cache();
            assert!(repo.cached_version().is_none());
            repo.read_to_string(&tag, "README.md").unwrap();
            assert_eq!(mock.switch_count(), 2);
            assert_eq!(mock.head(), tag);
        }

        #[test]
        fn client_health_is_exposed() {
            let (_dir, mock) = fixture(|m| m.with_health(true, false));
            let repo = VersionedRepo::new(mock);

            assert!(repo.client().check_local());
            assert!(!repo.client().ping());
            assert!(repo.remote_url().is_none());
            assert!(repo.clone_dir().is_none());
        }
    }

    mod source {
        use super::*;

        #[test]
        fn classification() {
            assert_eq!(
                RepoSource::parse("file:///srv/repo"),
                RepoSource::Remote("file:///srv/repo".to_string())
            );
            assert_eq!(
                RepoSource::parse("ssh://git@host/repo"),
                RepoSource::Remote("ssh://git@host/repo".to_string())
            );
            assert_eq!(
                RepoSource::parse("/definitely/not/here/repo.git"),
                RepoSource::Remote("/definitely/not/here/repo.git".to_string())
            );
            assert_eq!(
                RepoSource::parse("../work/repo"),
                RepoSource::Local(PathBuf::from("../work/repo"))
            );
        }

        #[test]
        fn existing_dot_git_directory_is_local() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("mirror.git");
            fs::create_dir(&path).unwrap();

            let location = path.to_str().unwrap();
            assert_eq!(RepoSource::parse(location), RepoSource::Local(path.clone()));
        }

        #[test]
        fn local_root_is_discovered() {
            let dir = TempDir::new().unwrap();
            let status = std::process::Command::new("git")
                .arg("init")
                .current_dir(dir.path())
                .output()
                .unwrap()
                .status;
            assert!(status.success());
            let sub = dir.path().join("pkg");
            fs::create_dir(&sub).unwrap();

            let root = RepoSource::Local(sub).local_root().unwrap();
            assert_eq!(
                root.canonicalize().unwrap(),
                dir.path().canonicalize().unwrap()
            );
            assert_eq!(
                RepoSource::Remote("https://example.com/x.git".to_string()).local_root(),
                None
            );
        }
    }
}
