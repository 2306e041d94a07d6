//! Integration tests for commands.
//!
//! These tests verify that commands work correctly with real git repositories,
//! both by calling the handlers directly and by running the binary.

use std::path::Path;
use std::process::Command;

use assert_cmd::Command as BinCommand;
use predicates::prelude::*;
use tempfile::TempDir;

use revscope::access::RepoSource;
use revscope::cli::{commands, Context};

// =============================================================================
// Test Fixtures
// =============================================================================

/// Test fixture that creates a real git repository with two release tags.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a repository tagged `v0.9.0` and `v1.0.0` with unreleased work
    /// on main.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let repo = Self { dir };

        run_git(repo.path(), &["init", "-b", "main"]);
        run_git(repo.path(), &["config", "user.email", "test@example.com"]);
        run_git(repo.path(), &["config", "user.name", "Test User"]);

        repo.commit("README.md", "# Test Repo\n", "Initial commit");
        repo.commit("lib.rs", "// 0.9\n", "First release");
        run_git(repo.path(), &["tag", "v0.9.0"]);
        repo.commit("lib.rs", "// 1.0\n", "Second release");
        run_git(repo.path(), &["tag", "v1.0.0"]);
        run_git(repo.path(), &["tag", "latest-build"]);
        repo.commit("lib.rs", "// dev\n", "Work in progress");

        repo
    }

    /// Get the path to the repository.
    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a file and commit it.
    fn commit(&self, filename: &str, content: &str, message: &str) {
        std::fs::write(self.path().join(filename), content).unwrap();
        run_git(self.path(), &["add", filename]);
        run_git(self.path(), &["commit", "-m", message]);
    }

    /// Create a standard test context.
    fn context(&self) -> Context {
        Context {
            source: RepoSource::Local(self.path().to_path_buf()),
            quiet: true,
            ..Default::default()
        }
    }

    /// A binary invocation isolated from the user's configuration.
    fn revscope(&self) -> BinCommand {
        self.revscope_at(self.path())
    }

    /// Like [`revscope`](Self::revscope), with `--repo` pointing at `repo`.
    fn revscope_at(&self, repo: impl AsRef<std::ffi::OsStr>) -> BinCommand {
        let mut cmd = BinCommand::cargo_bin("revscope").unwrap();
        cmd.env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path())
            .env_remove("REVSCOPE_CONFIG")
            .env_remove("REVSCOPE_LOG")
            .arg("--repo")
            .arg(repo);
        cmd
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

// =============================================================================
// Handler Tests
// =============================================================================

mod handlers {
    use super::*;

    #[test]
    fn cat_at_tag() {
        let repo = TestRepo::new();
        let mut out = Vec::new();

        commands::cat(&repo.context(), "v0.9.0", Path::new("lib.rs"), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "// 0.9\n");
    }

    #[test]
    fn cat_working_tree() {
        let repo = TestRepo::new();
        let mut out = Vec::new();

        commands::cat(&repo.context(), ".", Path::new("lib.rs"), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "// dev\n");
    }

    #[test]
    fn cat_missing_file() {
        let repo = TestRepo::new();
        let mut out = Vec::new();

        let err = commands::cat(&repo.context(), ".", Path::new("nope.rs"), &mut out).unwrap_err();
        assert!(format!("{:#}", err).contains("nope.rs"));
        assert!(out.is_empty());
    }

    #[test]
    fn cat_rejects_blank_revision() {
        let repo = TestRepo::new();
        let mut out = Vec::new();

        let err = commands::cat(&repo.context(), " ", Path::new("lib.rs"), &mut out).unwrap_err();
        assert!(err.to_string().contains("invalid revision"));
    }

    #[test]
    fn ls_at_tag() {
        let repo = TestRepo::new();
        commands::ls(&repo.context(), "v1.0.0", None).unwrap();
    }

    #[test]
    fn defaults_and_tags() {
        let repo = TestRepo::new();
        commands::defaults(&repo.context()).unwrap();
        commands::tags(&repo.context()).unwrap();
    }

    #[test]
    fn non_repository_fails() {
        let dir = TempDir::new().unwrap();
        let ctx = Context {
            source: RepoSource::Local(dir.path().to_path_buf()),
            quiet: true,
            ..Default::default()
        };

        let err = commands::defaults(&ctx).unwrap_err();
        assert!(format!("{:#}", err).contains("directory is not a repository"));
    }
}

// =============================================================================
// Binary Tests
// =============================================================================

mod binary {
    use super::*;

    #[test]
    fn defaults_prints_pair() {
        let repo = TestRepo::new();
        repo.revscope()
            .arg("defaults")
            .assert()
            .success()
            .stdout(predicate::str::contains("before: v1.0.0"))
            .stdout(predicate::str::contains("after:  ."));
    }

    #[test]
    fn defaults_json() {
        let repo = TestRepo::new();
        let output = repo.revscope().args(["--json", "defaults"]).output().unwrap();
        assert!(output.status.success());

        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["before"], "v1.0.0");
        assert_eq!(value["after"], ".");
    }

    #[test]
    fn tags_marks_selection() {
        let repo = TestRepo::new();
        repo.revscope()
            .arg("tags")
            .assert()
            .success()
            .stdout(predicate::str::contains("  v0.9.0\n* v1.0.0"))
            .stdout(predicate::str::contains("latest-build").not());
    }

    #[test]
    fn cat_at_tag() {
        let repo = TestRepo::new();
        repo.revscope()
            .args(["cat", "--rev", "v0.9.0", "lib.rs"])
            .assert()
            .success()
            .stdout("// 0.9\n");
    }

    #[test]
    fn ls_lists_root() {
        let repo = TestRepo::new();
        repo.revscope()
            .arg("ls")
            .assert()
            .success()
            .stdout(predicate::str::contains("README.md"))
            .stdout(predicate::str::contains("lib.rs"));
    }

    #[test]
    fn ls_json() {
        let repo = TestRepo::new();
        let output = repo
            .revscope()
            .args(["--json", "ls", "--rev", "v1.0.0"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let names: Vec<&str> = entries
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"lib.rs"));
        assert!(entries
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["kind"] == "file"));
    }

    #[test]
    fn earliest_from_repo_config() {
        let repo = TestRepo::new();
        let dir = repo.path().join(".git/revscope");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "tag_selection = \"earliest\"\n").unwrap();

        repo.revscope()
            .arg("defaults")
            .assert()
            .success()
            .stdout(predicate::str::contains("before: v0.9.0"));
    }

    #[test]
    fn repo_config_found_from_subdirectory() {
        let repo = TestRepo::new();
        let dir = repo.path().join(".git/revscope");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "tag_selection = \"earliest\"\n").unwrap();
        let sub = repo.path().join("src");
        std::fs::create_dir_all(&sub).unwrap();

        repo.revscope_at(&sub)
            .arg("defaults")
            .assert()
            .success()
            .stdout(predicate::str::contains("before: v0.9.0"));
    }

    #[test]
    fn repo_flag_accepts_url() {
        let upstream = TestRepo::new();
        let clones = TempDir::new().unwrap();
        let url = format!("file://{}", upstream.path().display());

        upstream
            .revscope_at(&url)
            .env("TMPDIR", clones.path())
            .args(["cat", "--rev", "v0.9.0", "lib.rs"])
            .assert()
            .success()
            .stdout("// 0.9\n");

        // The clone was read, not the upstream working copy.
        assert_eq!(
            std::fs::read_to_string(upstream.path().join("lib.rs")).unwrap(),
            "// dev\n"
        );
    }

    #[test]
    fn non_repository_exits_with_error() {
        let dir = TempDir::new().unwrap();
        BinCommand::cargo_bin("revscope")
            .unwrap()
            .env("HOME", dir.path())
            .env("XDG_CONFIG_HOME", dir.path())
            .env_remove("REVSCOPE_CONFIG")
            .arg("--repo")
            .arg(dir.path())
            .arg("tags")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error:"));
    }

    #[test]
    fn completion_generates_script() {
        BinCommand::cargo_bin("revscope")
            .unwrap()
            .args(["completion", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("revscope"));
    }
}
