//! Package attribution.
//!
//! Splits the files a traced program used into those owned by an installed
//! OS package and those that have to be packed individually. Asking the
//! package manager is expensive (one process per query), so:
//!
//! - synthetic trees (`/dev`, `/proc`, `/sys`) are dropped outright;
//! - anything outside the system-managed directories, or under
//!   `/usr/local`, is never looked up;
//! - every ownership fact the package manager reports, including ones
//!   about paths we did not ask for, is memoized for the session;
//! - package metadata is fetched once per package name.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::{File, Package};
use crate::oracle::{OracleError, PackageOracle};
use crate::util::config::AttributionConfig;

/// Pseudo-filesystems whose entries are never real artifacts.
pub const MAGIC_DIRS: &[&str] = &["/dev", "/proc", "/sys"];

/// Directories managed by the system package manager.
pub const SYSTEM_DIRS: &[&str] = &[
    "/bin", "/etc", "/lib", "/lib32", "/lib64", "/libx32", "/sbin", "/usr", "/var",
];

/// Locally installed software, never owned by a package.
pub const LOCAL_DIRS: &[&str] = &["/usr/local"];

/// A recoverable failure during attribution.
#[derive(Debug, Error)]
pub enum AttributionError {
    /// The package metadata query failed; the package's files stay unattributed.
    #[error("failed to query package `{package}`")]
    PackageQueryFailed {
        package: String,
        #[source]
        source: OracleError,
    },

    /// The ownership query failed; the path is treated as unowned.
    #[error("failed to look up the owner of {}", path.display())]
    OwnerQueryFailed {
        path: PathBuf,
        #[source]
        source: OracleError,
    },
}

/// How a path is treated before the package manager is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Synthetic; drop it
    Magic,
    /// Cannot belong to a package
    Unmanaged,
    /// Might belong to a package; ask
    System,
}

/// Directory heuristics used to avoid pointless package manager queries.
#[derive(Debug, Clone)]
pub struct DirectoryRules {
    magic_dirs: Vec<PathBuf>,
    system_dirs: Vec<PathBuf>,
    local_dirs: Vec<PathBuf>,
}

impl Default for DirectoryRules {
    fn default() -> Self {
        DirectoryRules {
            magic_dirs: MAGIC_DIRS.iter().map(PathBuf::from).collect(),
            system_dirs: SYSTEM_DIRS.iter().map(PathBuf::from).collect(),
            local_dirs: LOCAL_DIRS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl DirectoryRules {
    /// Default rules extended with the directories from the configuration.
    pub fn from_config(config: &AttributionConfig) -> Self {
        let mut rules = DirectoryRules::default();
        rules.magic_dirs.extend(config.extra_magic_dirs.iter().cloned());
        rules.system_dirs.extend(config.extra_system_dirs.iter().cloned());
        rules
    }

    /// Classify a path. Prefixes match whole path components.
    pub fn classify(&self, path: &Path) -> PathClass {
        let under = |dirs: &[PathBuf]| dirs.iter().any(|d| path.starts_with(d));

        if under(&self.magic_dirs) {
            PathClass::Magic
        } else if under(&self.local_dirs) || !under(&self.system_dirs) {
            PathClass::Unmanaged
        } else {
            PathClass::System
        }
    }
}

/// Outcome of an attribution session.
#[derive(Debug, Default)]
pub struct Attributed {
    /// Files not owned by any package, in input order
    pub unknown_files: Vec<File>,

    /// Packages in the order they were first seen
    pub packages: Vec<Package>,

    /// Queries that failed along the way
    pub failures: Vec<AttributionError>,
}

/// One attribution session.
///
/// The memo cache lives here, so separate sessions never share state.
pub struct Attribution<O> {
    oracle: O,
    rules: DirectoryRules,
    unknown_files: Vec<File>,
    packages: Vec<Package>,
    package_index: HashMap<String, usize>,
    /// `None` records that the path has no owner
    path_to_package: HashMap<PathBuf, Option<String>>,
    failed_packages: HashSet<String>,
    failures: Vec<AttributionError>,
}

impl<O: PackageOracle> Attribution<O> {
    pub fn new(oracle: O) -> Self {
        Self::with_rules(oracle, DirectoryRules::default())
    }

    pub fn with_rules(oracle: O, rules: DirectoryRules) -> Self {
        Attribution {
            oracle,
            rules,
            unknown_files: Vec::new(),
            packages: Vec::new(),
            package_index: HashMap::new(),
            path_to_package: HashMap::new(),
            failed_packages: HashSet::new(),
            failures: Vec::new(),
        }
    }

    /// Attribute every file in `files`.
    pub fn attribute(&mut self, files: impl IntoIterator<Item = File>) {
        for file in files {
            self.search_for_file(file);
        }
    }

    /// Attribute a single file.
    pub fn search_for_file(&mut self, file: File) {
        match self.rules.classify(file.path()) {
            PathClass::Magic => {
                tracing::trace!("dropping {}", file);
                return;
            }
            PathClass::Unmanaged => {
                self.unknown_files.push(file);
                return;
            }
            PathClass::System => {}
        }

        match self.owner_of(file.path()) {
            Some(name) => self.add_to_package(name, file),
            None => self.unknown_files.push(file),
        }
    }

    fn owner_of(&mut self, path: &Path) -> Option<String> {
        if let Some(cached) = self.path_to_package.get(path) {
            tracing::trace!("cache hit for {}", path.display());
            return cached.clone();
        }

        let owner = match self.oracle.query_owner(path) {
            Ok(query) => {
                for (other, package) in query.incidental {
                    self.path_to_package.insert(other, Some(package));
                }
                query.owner
            }
            Err(source) => {
                if source.is_timeout() {
                    tracing::warn!("Package manager timed out looking up {}", path.display());
                } else {
                    tracing::warn!("Cannot find the owner of {}: {}", path.display(), source);
                }
                self.failures.push(AttributionError::OwnerQueryFailed {
                    path: path.to_path_buf(),
                    source,
                });
                None
            }
        };
        tracing::debug!("{} -> {:?}", path.display(), owner);

        self.path_to_package.insert(path.to_path_buf(), owner.clone());
        owner
    }

    fn add_to_package(&mut self, name: String, file: File) {
        if let Some(&idx) = self.package_index.get(&name) {
            self.packages[idx].add_file(file);
            return;
        }
        if self.failed_packages.contains(&name) {
            self.unknown_files.push(file);
            return;
        }

        match self.oracle.query_package(&name) {
            Ok(info) => {
                tracing::debug!("new package {} ({})", name, info.version);
                let mut package = Package::new(name.clone(), info.version).with_size(info.size);
                package.add_file(file);
                self.package_index.insert(name, self.packages.len());
                self.packages.push(package);
            }
            Err(source) => {
                if source.is_timeout() {
                    tracing::warn!(
                        "Package manager timed out querying {}, its files will be packed individually",
                        name
                    );
                } else {
                    tracing::warn!(
                        "Cannot query package {}, its files will be packed individually: {}",
                        name,
                        source
                    );
                }
                self.failed_packages.insert(name.clone());
                self.failures.push(AttributionError::PackageQueryFailed {
                    package: name,
                    source,
                });
                self.unknown_files.push(file);
            }
        }
    }

    /// End the session and return what was found.
    pub fn finish(self) -> Attributed {
        Attributed {
            unknown_files: self.unknown_files,
            packages: self.packages,
            failures: self.failures,
        }
    }
}

/// Attribute `files` in a fresh session.
pub fn attribute<O: PackageOracle>(oracle: O, files: impl IntoIterator<Item = File>) -> Attributed {
    let mut session = Attribution::new(oracle);
    session.attribute(files);
    session.finish()
}
