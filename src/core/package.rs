//! Package - an installed OS package and the traced files it owns.

use std::fmt;

use serde::Serialize;

use crate::core::File;

/// An OS package, as reported by the package manager or read from a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    /// Package manager identifier
    pub name: String,

    /// Package manager version string (opaque)
    pub version: String,

    /// Files attributed to this package, in the order they were seen
    pub files: Vec<File>,

    /// Whether the files should go into the bundle, rather than being
    /// reinstalled from the package on the target
    pub packfiles: bool,

    /// Installed size in bytes, when the package manager reports it
    pub size: Option<u64>,
}

impl Package {
    /// Create a package with no files yet.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Package {
            name: name.into(),
            version: version.into(),
            files: Vec::new(),
            packfiles: true,
            size: None,
        }
    }

    pub fn with_files(mut self, files: Vec<File>) -> Self {
        self.files = files;
        self
    }

    pub fn with_size(mut self, size: Option<u64>) -> Self {
        self.size = size;
        self
    }

    pub fn with_packfiles(mut self, packfiles: bool) -> Self {
        self.packfiles = packfiles;
        self
    }

    /// Append a file to this package.
    pub fn add_file(&mut self, file: File) {
        self.files.push(file);
    }

    /// Total size of the files with a known size.
    pub fn files_size(&self) -> u64 {
        self.files.iter().filter_map(File::size).sum()
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_packages_do_not_share_files() {
        let mut a = Package::new("a", "1");
        let b = Package::new("b", "1");
        a.add_file(File::with_size("/usr/lib/a.so", None));

        assert_eq!(a.files.len(), 1);
        assert!(b.files.is_empty());
        assert!(b.packfiles);
    }

    #[test]
    fn test_files_size_skips_unknown() {
        let pkg = Package::new("coreutils", "8.30").with_files(vec![
            File::with_size("/usr/bin/ls", Some(1000)),
            File::with_size("/usr/bin/cat", None),
            File::with_size("/usr/bin/cp", Some(24)),
        ]);

        assert_eq!(pkg.files_size(), 1024);
    }

    #[test]
    fn test_display() {
        let pkg = Package::new("libc6", "2.31-0ubuntu9");
        assert_eq!(pkg.to_string(), "libc6 (2.31-0ubuntu9)");
    }
}
