//! Configuration file support for repropack.
//!
//! repropack supports two configuration file locations:
//! - Global: `~/.repropack/config.toml` - User-wide defaults
//! - Project: `.repropack/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Oracle timeout used when none is configured.
pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 30;

/// repropack configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Package attribution settings
    pub attribution: AttributionConfig,
}

/// Which package database to query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Detect from the host distribution
    #[default]
    Auto,
    /// Always use dpkg
    Dpkg,
    /// Never query; every file is packed individually
    None,
}

/// Package attribution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributionConfig {
    /// Package database backend (default: auto)
    pub backend: Option<BackendChoice>,

    /// Seconds to wait for each package manager query
    pub oracle_timeout_secs: Option<u64>,

    /// Additional pseudo-filesystem roots whose files are dropped
    pub extra_magic_dirs: Vec<PathBuf>,

    /// Additional directories that may contain packaged files
    pub extra_system_dirs: Vec<PathBuf>,
}

impl AttributionConfig {
    pub fn backend(&self) -> BackendChoice {
        self.backend.unwrap_or_default()
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs.unwrap_or(DEFAULT_ORACLE_TIMEOUT_SECS))
    }
}

impl Settings {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Settings) {
        let ours = &mut self.attribution;
        let theirs = other.attribution;

        if theirs.backend.is_some() {
            ours.backend = theirs.backend;
        }
        if theirs.oracle_timeout_secs.is_some() {
            ours.oracle_timeout_secs = theirs.oracle_timeout_secs;
        }
        if !theirs.extra_magic_dirs.is_empty() {
            ours.extra_magic_dirs = theirs.extra_magic_dirs;
        }
        if !theirs.extra_system_dirs.is_empty() {
            ours.extra_system_dirs = theirs.extra_system_dirs;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.repropack/config.toml)
/// 2. Global config (~/.repropack/config.toml)
/// 3. Defaults
pub fn load_settings(global_path: Option<&Path>, project_path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Some(global) = global_path {
        settings.merge(Settings::load_or_default(global));
    }

    settings.merge(Settings::load_or_default(project_path));

    settings
}

/// Load settings for a project rooted at `project_root`.
pub fn load_project_settings(project_root: &Path) -> Settings {
    let global = global_config_path();
    load_settings(global.as_deref(), &project_config_path(project_root))
}

/// Get the global repropack config directory (~/.repropack).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".repropack"))
}

/// Get the global config path (~/.repropack/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.repropack/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".repropack").join("config.toml")
}
