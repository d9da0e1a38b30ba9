//! File - a path touched by the traced program.
//!
//! A `File` is identified by its path alone. The recorded size is
//! informational: two files with the same path are the same file no matter
//! what size was sampled for each.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A file used at some point during the traced execution.
#[derive(Debug, Clone, Serialize)]
pub struct File {
    path: PathBuf,
    size: Option<u64>,
}

impl File {
    /// Create a file from a live path, sampling its size from the filesystem.
    ///
    /// A missing or unreadable path gives an unknown size instead of an error.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let size = match std::fs::metadata(&path) {
            Ok(meta) => Some(meta.len()),
            Err(e) => {
                tracing::debug!("cannot stat {}: {}", path.display(), e);
                None
            }
        };
        File { path, size }
    }

    /// Create a file with an already-known size, without touching the filesystem.
    pub fn with_size(path: impl Into<PathBuf>, size: Option<u64>) -> Self {
        File {
            path: path.into(),
            size,
        }
    }

    /// The identity key: every comparison and hash goes through this.
    #[inline]
    pub fn key(&self) -> &Path {
        &self.path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes, `None` when unknown.
    pub fn size(&self) -> Option<u64> {
        self.size
    }
}

impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for File {}

impl Hash for File {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Borrow<Path> for File {
    fn borrow(&self) -> &Path {
        self.key()
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
