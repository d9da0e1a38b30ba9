//! Test fixtures for common test scenarios.
//!
//! Canned manifests and canned package manager output.

/// Common manifest documents.
pub mod manifests {
    /// The smallest valid manifest.
    pub fn minimal() -> String {
        "version = \"0.0\"\n".to_string()
    }

    /// A manifest with one package per `(name, version, files)` entry and
    /// the given unpackaged files.
    pub fn with_packages(packages: &[(&str, &str, &[&str])], other_files: &[&str]) -> String {
        let mut manifest = minimal();

        manifest.push_str("other_files = [\n");
        for path in other_files {
            manifest.push_str(&format!("    \"{}\",\n", path));
        }
        manifest.push_str("]\n");

        for (name, version, files) in packages {
            manifest.push_str(&format!(
                "\n[[packages]]\nname = \"{name}\"\nversion = \"{version}\"\nfiles = [\n"
            ));
            for path in *files {
                manifest.push_str(&format!("    \"{}\",\n", path));
            }
            manifest.push_str("]\n");
        }

        manifest
    }
}

/// Mock dpkg outputs.
pub mod dpkg_outputs {
    use super::super::MockProcessOutput;

    /// `dpkg -S` listing one line per `(package, path)`.
    pub fn owners(entries: &[(&str, &str)]) -> MockProcessOutput {
        let stdout: String = entries
            .iter()
            .map(|(pkg, path)| format!("{}: {}\n", pkg, path))
            .collect();
        MockProcessOutput::success(stdout)
    }

    /// `dpkg -S` for a path no package contains.
    pub fn not_owned(path: &str) -> MockProcessOutput {
        MockProcessOutput::failure(
            1,
            format!("dpkg-query: no path found matching pattern {}", path),
        )
    }

    /// `dpkg-query -W` for an installed package.
    pub fn installed(version: &str, size_kib: u64) -> MockProcessOutput {
        MockProcessOutput::success(format!("install ok installed\t{}\t{}\n", version, size_kib))
    }

    /// `dpkg-query -W` for an unknown package.
    pub fn no_package(name: &str) -> MockProcessOutput {
        MockProcessOutput::failure(1, format!("dpkg-query: no packages found matching {}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Config;

    #[test]
    fn test_minimal_manifest_loads() {
        let config: Config = manifests::minimal().parse().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_manifest_with_packages_loads() {
        let files: &[&str] = &["/usr/bin/ls", "/usr/bin/cat"];
        let doc = manifests::with_packages(&[("coreutils", "8.30", files)], &["/home/user/in.csv"]);
        let config: Config = doc.parse().unwrap();

        assert_eq!(config.packages.len(), 1);
        assert_eq!(config.packages[0].files.len(), 2);
        assert_eq!(config.other_files.len(), 1);
    }

    #[test]
    fn test_dpkg_owners_output() {
        let out = dpkg_outputs::owners(&[("bash", "/bin/bash"), ("dash", "/bin/dash")]);
        assert_eq!(out.stdout, "bash: /bin/bash\ndash: /bin/dash\n");
        assert_eq!(out.status, 0);
    }
}
