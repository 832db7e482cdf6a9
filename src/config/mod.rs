//! Configuration loading: credentials, settings file, and lookup maps.
//!
//! Sources and precedence (highest wins):
//! 1. CLI flags (with environment-variable fallbacks via clap)
//! 2. Settings file (`m2g.yaml` by default)
//! 3. Defaults
//!
//! Credentials are kept out of the settings file on purpose: they live in a
//! separate JSON file that can stay untracked while the settings are
//! committed.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, Result};

/// Default settings filename probed in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "m2g.yaml";

/// Default credentials filename probed in the working directory.
pub const DEFAULT_CREDENTIALS_FILE: &str = "github.json";

/// API credentials for the destination service:
/// `{"username": "jsmith", "apikey": "..."}`.
///
/// The key needs repo access. Never logged.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub apikey: String,
}

impl Credentials {
    /// Load credentials from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if either
    /// field is empty.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            MigrateError::Config(format!(
                "cannot read credentials file {}: {e}",
                path.display()
            ))
        })?;
        let credentials: Self = serde_json::from_str(&contents).map_err(|e| {
            MigrateError::Config(format!(
                "malformed credentials file {}: {e}",
                path.display()
            ))
        })?;
        if credentials.username.trim().is_empty() {
            return Err(MigrateError::Config(format!(
                "malformed credentials file {}: no username",
                path.display()
            )));
        }
        if credentials.apikey.trim().is_empty() {
            return Err(MigrateError::Config(format!(
                "malformed credentials file {}: no apikey",
                path.display()
            )));
        }
        Ok(credentials)
    }
}

/// Migration settings (`m2g.yaml`). Every field has a default so a missing
/// file behaves like an empty one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Destination repository owner.
    pub owner: Option<String>,
    /// Destination repository name.
    pub repo: Option<String>,
    /// Base URL of the source Mantis tracker, used for provenance links.
    pub tracker_url: String,
    /// Path to the username map (Mantis handle to GitHub handle, YAML).
    pub user_map: Option<PathBuf>,
    /// Path to the label map (Mantis project to GitHub label, YAML).
    pub label_map: Option<PathBuf>,
    /// Seconds to sleep after each created issue, for the secondary rate
    /// limiter.
    pub pace_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            owner: None,
            repo: None,
            tracker_url: "https://tracker.example.org".to_string(),
            user_map: None,
            label_map: None,
            pace_seconds: 1,
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }
}

/// Fully-resolved migration target: CLI flags over the settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationTarget {
    pub owner: String,
    pub repo: String,
}

/// Resolve the destination repository from CLI flags and settings.
///
/// # Errors
///
/// Returns a validation error when no owner or repo is given by either
/// source.
pub fn resolve_target(
    cli_owner: Option<&str>,
    cli_repo: Option<&str>,
    settings: &Settings,
) -> Result<MigrationTarget> {
    let owner = cli_owner
        .map(str::to_string)
        .or_else(|| settings.owner.clone())
        .ok_or_else(|| {
            MigrateError::validation("owner", "no repository owner given (--owner or `owner:`)")
        })?;
    let repo = cli_repo
        .map(str::to_string)
        .or_else(|| settings.repo.clone())
        .ok_or_else(|| {
            MigrateError::validation("repo", "no repository name given (--repo or `repo:`)")
        })?;
    Ok(MigrationTarget { owner, repo })
}

/// Load a handle-translation map from a YAML file of `source: destination`
/// pairs. `None` yields an empty map; a named path must exist.
///
/// # Errors
///
/// Returns an error if the named file is missing, unreadable, or not a flat
/// string mapping.
pub fn load_map(path: Option<&Path>) -> Result<HashMap<String, String>> {
    let Some(path) = path else {
        return Ok(HashMap::new());
    };
    if !path.exists() {
        return Err(MigrateError::Config(format!(
            "map file {} does not exist",
            path.display()
        )));
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&contents)?)
}
