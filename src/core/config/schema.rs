//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$REVSCOPE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/revscope/config.toml`
//! 3. `~/.revscope/config.toml`
//!
//! # Repo Config
//!
//! Located at `.git/revscope/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::tags::TagSelection;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// tag_selection = "latest"
/// verify_remote = true
///
/// [clone]
/// root = "/var/tmp/revscope"
/// keep = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Which end of the tag ordering is the default baseline
    pub tag_selection: Option<String>,

    /// Whether opening a local repository pings its remote
    pub verify_remote: Option<bool>,

    /// Remote name used when pinging a local repository
    pub remote: Option<String>,

    /// Settings for temporary clones of remote repositories
    pub clone: Option<CloneConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_tag_selection(self.tag_selection.as_deref())?;
        validate_remote(self.remote.as_deref())?;
        if let Some(clone) = &self.clone {
            clone.validate()?;
        }
        Ok(())
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// tag_selection = "earliest"
/// remote = "upstream"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Overrides the global tag selection for this repository
    pub tag_selection: Option<String>,

    /// Overrides the remote name for this repository
    pub remote: Option<String>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_tag_selection(self.tag_selection.as_deref())?;
        validate_remote(self.remote.as_deref())
    }
}

/// Temporary clone settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CloneConfig {
    /// Directory under which temporary clones are created
    pub root: Option<PathBuf>,

    /// Keep the clone on disk after the process exits
    pub keep: Option<bool>,
}

impl CloneConfig {
    /// Validate the clone configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(root) = &self.root {
            if root.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "clone root cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn validate_tag_selection(value: Option<&str>) -> Result<(), ConfigError> {
    if let Some(value) = value {
        if TagSelection::from_name(value).is_none() {
            return Err(ConfigError::InvalidValue(format!(
                "invalid tag_selection '{}', must be one of: {}",
                value,
                TagSelection::NAMES.join(", ")
            )));
        }
    }
    Ok(())
}

fn validate_remote(value: Option<&str>) -> Result<(), ConfigError> {
    if value.is_some_and(str::is_empty) {
        return Err(ConfigError::InvalidValue(
            "remote cannot be empty".to_string(),
        ));
    }
    Ok(())
}
