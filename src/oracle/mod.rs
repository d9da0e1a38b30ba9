//! Package manager oracles.
//!
//! An oracle answers two questions about the host's package database: which
//! installed package owns a path, and what version of a package is
//! installed. Attribution only talks to this trait; the command-line
//! plumbing and its output parsing live in the backends.

mod dpkg;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::util::process::{find_executable, ProcessError};

pub use dpkg::DpkgOracle;

/// Where the host's distribution identity is read from.
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Error querying the package database.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("`{command}` failed with exit code {status:?}: {stderr}")]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("package `{0}` is not installed")]
    NotInstalled(String),

    #[error("unexpected output from `{command}`: {line}")]
    Parse { command: String, line: String },
}

impl OracleError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, OracleError::Process(ProcessError::Timeout { .. }))
    }
}

/// Result of an ownership query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerQuery {
    /// Package owning the queried path, if any
    pub owner: Option<String>,

    /// Other `(path, package)` facts the query happened to report
    pub incidental: Vec<(PathBuf, String)>,
}

/// Installed package metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub version: String,

    /// Installed size in bytes
    pub size: Option<u64>,
}

/// A package database that can be queried about ownership and versions.
pub trait PackageOracle {
    /// Find the package owning `path`.
    fn query_owner(&mut self, path: &Path) -> Result<OwnerQuery, OracleError>;

    /// Look up an installed package. Fails if the package is not installed.
    fn query_package(&mut self, name: &str) -> Result<PackageInfo, OracleError>;
}

impl<O: PackageOracle + ?Sized> PackageOracle for &mut O {
    fn query_owner(&mut self, path: &Path) -> Result<OwnerQuery, OracleError> {
        (**self).query_owner(path)
    }

    fn query_package(&mut self, name: &str) -> Result<PackageInfo, OracleError> {
        (**self).query_package(name)
    }
}

impl<O: PackageOracle + ?Sized> PackageOracle for Box<O> {
    fn query_owner(&mut self, path: &Path) -> Result<OwnerQuery, OracleError> {
        (**self).query_owner(path)
    }

    fn query_package(&mut self, name: &str) -> Result<PackageInfo, OracleError> {
        (**self).query_package(name)
    }
}

/// Package database backends this crate knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Debian and derivatives
    Dpkg,
    /// No known package manager; nothing gets attributed
    Unsupported,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Dpkg => write!(f, "dpkg"),
            Backend::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Detect the package database backend of the running host.
pub fn detect_backend() -> Backend {
    let contents = match std::fs::read_to_string(OS_RELEASE_PATH) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::debug!("cannot read {}: {}", OS_RELEASE_PATH, e);
            return Backend::Unsupported;
        }
    };

    let backend = backend_for_os_release(&contents);
    if backend == Backend::Dpkg && find_executable("dpkg").is_none() {
        tracing::warn!("Debian-like distribution but `dpkg` is not on PATH");
        return Backend::Unsupported;
    }
    backend
}

/// Pick a backend from the contents of an os-release file.
pub fn backend_for_os_release(contents: &str) -> Backend {
    let mut ids = Vec::new();
    for line in contents.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        if key == "ID" || key == "ID_LIKE" {
            let value = value.trim_matches(|c| c == '"' || c == '\'');
            ids.extend(value.split_whitespace().map(str::to_ascii_lowercase));
        }
    }

    if ids.iter().any(|id| id == "debian" || id == "ubuntu") {
        Backend::Dpkg
    } else {
        tracing::debug!("no package backend for distribution ids {:?}", ids);
        Backend::Unsupported
    }
}
