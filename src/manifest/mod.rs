//! The manifest: a versioned, annotated TOML document listing the runs of
//! a traced execution, the packages its files came from, and the files that
//! must be packed individually.
//!
//! ```text
//! version = "0.0"
//! other_files = [ ... ]
//! [[runs]]          # opaque, passed through untouched
//! [[packages]]
//! name = "coreutils"
//! version = "8.30"
//! packfiles = true
//! files = [ ... ]
//! ```
//!
//! Comments in the document are documentation only. They are regenerated
//! on every save and ignored on load.

mod load;
mod save;

use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::core::{File, Package};

pub use load::{load_config, load_config_with, parse_config, DocumentEntities, EntityFactory, LiveEntities};
pub use save::{render_config, save_config};

/// The only manifest format version this crate reads and writes.
pub const CONFIG_VERSION: &str = "0.0";

/// Top-level keys a manifest may contain.
pub const SECTIONS: &[&str] = &["version", "runs", "packages", "other_files"];

/// A run record, carried through without interpretation.
pub type Run = toml::Value;

/// Errors from loading or saving a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The document parsed, but does not follow the manifest schema.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ManifestError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ManifestError::InvalidConfig(message.into())
    }
}

/// An in-memory manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Config {
    pub runs: Vec<Run>,
    pub packages: Vec<Package>,
    pub other_files: Vec<File>,
}

impl Config {
    pub fn new(runs: Vec<Run>, packages: Vec<Package>, other_files: Vec<File>) -> Self {
        Config {
            runs,
            packages,
            other_files,
        }
    }

    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        load_config(path)
    }

    /// Write this manifest to disk.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        save_config(path, &self.runs, &self.packages, &self.other_files)
    }

    /// Number of files across all packages and `other_files`.
    pub fn file_count(&self) -> usize {
        self.packages.iter().map(|p| p.files.len()).sum::<usize>() + self.other_files.len()
    }
}

impl FromStr for Config {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_config(s, &DocumentEntities)
    }
}
