//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! revscope has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$REVSCOPE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/revscope/config.toml`
//! 3. `~/.revscope/config.toml`
//!
//! # Repo Config Location
//!
//! `.git/revscope/config.toml`. A `.revscope.toml` at the repository root
//! is still read for compatibility, with a warning.
//!
//! # Example
//!
//! ```no_run
//! use revscope::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/repo"))).unwrap();
//! let config = result.config;
//!
//! println!("Tag selection: {}", config.tag_selection());
//! println!("Remote: {}", config.remote());
//! ```

pub mod schema;

pub use schema::{CloneConfig, GlobalConfig, RepoConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::tags::TagSelection;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence automatically: repo config overrides global.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if a local repository was given)
    pub repo: Option<RepoConfig>,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Build a config from already-parsed parts.
    pub fn from_parts(global: GlobalConfig, repo: Option<RepoConfig>) -> Self {
        Self {
            global,
            repo,
            global_path: None,
            repo_path: None,
        }
    }

    /// Load configuration from default locations.
    ///
    /// If `repo_path` is provided, also loads repo-specific config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or hold
    /// invalid values. Missing config files are not an error.
    pub fn load(repo_path: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let global_path = Self::find_global();
        Self::load_from(global_path.as_deref(), repo_path)
    }

    /// Load configuration from an explicit global config file.
    pub fn load_from(
        global_path: Option<&Path>,
        repo_path: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let global = match global_path {
            Some(path) => Self::read_toml::<GlobalConfig>(path)?,
            None => GlobalConfig::default(),
        };

        let (repo, repo_path_found) = match repo_path {
            Some(path) => Self::load_repo(path, &mut warnings)?,
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                repo,
                global_path: global_path.map(Path::to_path_buf),
                repo_path: repo_path_found,
            },
            warnings,
        })
    }

    /// Locate the global config file, if any.
    fn find_global() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("REVSCOPE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("revscope/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".revscope/config.toml"))
            .filter(|path| path.exists())
    }

    /// Load repository configuration.
    fn load_repo(
        repo_path: &Path,
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<(Option<RepoConfig>, Option<PathBuf>), ConfigError> {
        let canonical = Self::repo_config_path(repo_path);
        if canonical.exists() {
            let config = Self::read_toml::<RepoConfig>(&canonical)?;
            return Ok((Some(config), Some(canonical)));
        }

        let compat = repo_path.join(".revscope.toml");
        if compat.exists() {
            warnings.push(ConfigWarning {
                message: format!(
                    "Using deprecated config location. Please move to '{}'",
                    canonical.display()
                ),
                path: compat.clone(),
            });
            let config = Self::read_toml::<RepoConfig>(&compat)?;
            return Ok((Some(config), Some(compat)));
        }

        Ok((None, None))
    }

    fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for repo config.
    pub fn repo_config_path(repo_path: &Path) -> PathBuf {
        repo_path.join(".git/revscope/config.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Which end of the tag ordering is the default baseline.
    ///
    /// Defaults to [`TagSelection::Latest`].
    pub fn tag_selection(&self) -> TagSelection {
        self.repo
            .as_ref()
            .and_then(|r| r.tag_selection.as_deref())
            .or(self.global.tag_selection.as_deref())
            .and_then(TagSelection::from_name)
            .unwrap_or_default()
    }

    /// Remote name used to check reachability of a local repository.
    ///
    /// Defaults to "origin".
    pub fn remote(&self) -> &str {
        self.repo
            .as_ref()
            .and_then(|r| r.remote.as_deref())
            .or(self.global.remote.as_deref())
            .unwrap_or("origin")
    }

    /// Whether opening a local repository pings its remote.
    ///
    /// Defaults to `true`.
    pub fn verify_remote(&self) -> bool {
        self.global.verify_remote.unwrap_or(true)
    }

    /// Directory under which temporary clones are created.
    ///
    /// Defaults to the system temporary directory.
    pub fn clone_root(&self) -> PathBuf {
        self.global
            .clone
            .as_ref()
            .and_then(|c| c.root.clone())
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Whether temporary clones outlive the process.
    ///
    /// Defaults to `false`.
    pub fn keep_clone(&self) -> bool {
        self.global
            .clone
            .as_ref()
            .and_then(|c| c.keep)
            .unwrap_or(false)
    }

    /// Path the global config was loaded from, if any.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Path the repo config was loaded from, if any.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}
