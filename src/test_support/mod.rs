//! Test utilities and mocks for repropack unit tests.
//!
//! This module provides stand-ins for the two expensive collaborators:
//! process execution (for testing backend output parsing) and the package
//! database itself (for testing attribution).
//!
//! # Example
//!
//! ```rust,ignore
//! let mut exec = MockExecutor::new();
//! exec.expect("dpkg -S /usr/bin/ls", MockProcessOutput::success("coreutils: /usr/bin/ls\n"));
//! let mut dpkg = DpkgOracle::new(exec);
//! ```

pub mod fixtures;

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::oracle::{OracleError, OwnerQuery, PackageInfo, PackageOracle};
use crate::util::process::{CommandOutput, CommandRunner, ProcessError};

pub use fixtures::*;

/// A canned process result.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl MockProcessOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    fn to_output(&self) -> CommandOutput {
        CommandOutput {
            status: Some(self.status),
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        }
    }
}

/// A scripted [`CommandRunner`].
///
/// Commands are matched on their full command line (`program arg...`),
/// first registered response wins. Every command line is recorded.
#[derive(Debug, Default)]
pub struct MockExecutor {
    responses: Vec<(String, bool, MockProcessOutput)>,
    fallback: Option<MockProcessOutput>,
    calls: Vec<String>,
}

impl MockExecutor {
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Answer `cmd` exactly.
    pub fn expect(&mut self, cmd: &str, output: MockProcessOutput) -> &mut Self {
        self.responses.push((cmd.to_string(), false, output));
        self
    }

    /// Answer any command line starting with `prefix`.
    pub fn expect_prefix(&mut self, prefix: &str, output: MockProcessOutput) -> &mut Self {
        self.responses.push((prefix.to_string(), true, output));
        self
    }

    /// Answer everything else with `output` instead of failing to spawn.
    pub fn set_default(&mut self, output: MockProcessOutput) -> &mut Self {
        self.fallback = Some(output);
        self
    }

    pub fn calls(&self) -> &[String] {
        &self.calls
    }
}

impl CommandRunner for MockExecutor {
    fn run(&mut self, program: &str, args: &[&str]) -> Result<CommandOutput, ProcessError> {
        let mut cmd = program.to_string();
        for arg in args {
            cmd.push(' ');
            cmd.push_str(arg);
        }
        self.calls.push(cmd.clone());

        let matched = self
            .responses
            .iter()
            .find(|(pattern, prefix, _)| {
                if *prefix {
                    cmd.starts_with(pattern.as_str())
                } else {
                    cmd == *pattern
                }
            })
            .map(|(_, _, output)| output)
            .or(self.fallback.as_ref());

        match matched {
            Some(output) => Ok(output.to_output()),
            None => Err(ProcessError::Spawn {
                program: cmd,
                source: io::Error::new(io::ErrorKind::NotFound, "no scripted response"),
            }),
        }
    }
}

/// In-memory package database that counts the queries made against it.
#[derive(Debug, Default)]
pub struct FakeOracle {
    owners: HashMap<PathBuf, String>,
    versions: HashMap<String, String>,
    sizes: HashMap<String, u64>,
    failing_packages: HashSet<String>,
    failing_paths: HashSet<PathBuf>,
    timed_out_paths: HashSet<PathBuf>,
    report_siblings: bool,
    owner_queries: usize,
    package_queries: usize,
}

impl FakeOracle {
    pub fn new() -> Self {
        FakeOracle::default()
    }

    /// Report every other file of the owning package as incidental facts,
    /// the way a bulk listing would.
    pub fn reporting_siblings(mut self) -> Self {
        self.report_siblings = true;
        self
    }

    /// Install a package owning `paths`.
    pub fn add_package(&mut self, name: &str, version: &str, paths: &[&str]) -> &mut Self {
        self.versions.insert(name.to_string(), version.to_string());
        for path in paths {
            self.owners.insert(PathBuf::from(path), name.to_string());
        }
        self
    }

    pub fn set_size(&mut self, name: &str, size: u64) -> &mut Self {
        self.sizes.insert(name.to_string(), size);
        self
    }

    /// Make metadata queries for `name` fail.
    pub fn fail_package(&mut self, name: &str) -> &mut Self {
        self.failing_packages.insert(name.to_string());
        self
    }

    /// Make ownership queries for `path` fail.
    pub fn fail_owner(&mut self, path: &str) -> &mut Self {
        self.failing_paths.insert(PathBuf::from(path));
        self
    }

    /// Make ownership queries for `path` time out.
    pub fn time_out_owner(&mut self, path: &str) -> &mut Self {
        self.timed_out_paths.insert(PathBuf::from(path));
        self
    }

    pub fn owner_queries(&self) -> usize {
        self.owner_queries
    }

    pub fn package_queries(&self) -> usize {
        self.package_queries
    }
}

impl PackageOracle for FakeOracle {
    fn query_owner(&mut self, path: &Path) -> Result<OwnerQuery, OracleError> {
        self.owner_queries += 1;
        if self.timed_out_paths.contains(path) {
            return Err(OracleError::Process(ProcessError::Timeout {
                command: format!("query_owner {}", path.display()),
                timeout: Duration::from_secs(30),
            }));
        }
        if self.failing_paths.contains(path) {
            return Err(OracleError::Failed {
                command: format!("query_owner {}", path.display()),
                status: Some(2),
                stderr: "simulated failure".to_string(),
            });
        }

        let owner = self.owners.get(path).cloned();
        let incidental = match (&owner, self.report_siblings) {
            (Some(pkg), true) => self
                .owners
                .iter()
                .filter(|(p, name)| *name == pkg && p.as_path() != path)
                .map(|(p, name)| (p.clone(), name.clone()))
                .collect(),
            _ => Vec::new(),
        };

        Ok(OwnerQuery { owner, incidental })
    }

    fn query_package(&mut self, name: &str) -> Result<PackageInfo, OracleError> {
        self.package_queries += 1;
        if self.failing_packages.contains(name) {
            return Err(OracleError::Failed {
                command: format!("query_package {}", name),
                status: Some(1),
                stderr: "simulated failure".to_string(),
            });
        }

        match self.versions.get(name) {
            Some(version) => Ok(PackageInfo {
                version: version.clone(),
                size: self.sizes.get(name).copied(),
            }),
            None => Err(OracleError::NotInstalled(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_first_match_wins() {
        let mut exec = MockExecutor::new();
        exec.expect("dpkg -S /bin/bash", MockProcessOutput::success("bash: /bin/bash\n"));
        exec.expect_prefix("dpkg -S", MockProcessOutput::failure(1, ""));

        let exact = exec.run("dpkg", &["-S", "/bin/bash"]).unwrap();
        let other = exec.run("dpkg", &["-S", "/bin/sh"]).unwrap();

        assert!(exact.success());
        assert!(!other.success());
        assert_eq!(exec.calls(), ["dpkg -S /bin/bash", "dpkg -S /bin/sh"]);
    }

    #[test]
    fn test_mock_executor_rejects_unscripted() {
        let mut exec = MockExecutor::new();
        assert!(exec.run("rpm", &["-qf", "/bin/bash"]).is_err());

        exec.set_default(MockProcessOutput::success(""));
        assert!(exec.run("rpm", &["-qf", "/bin/bash"]).is_ok());
    }

    #[test]
    fn test_fake_oracle_reports_siblings() {
        let mut oracle = FakeOracle::new().reporting_siblings();
        oracle.add_package("coreutils", "8.30", &["/bin/ls", "/bin/cat"]);

        let query = oracle.query_owner(Path::new("/bin/ls")).unwrap();
        assert_eq!(query.owner.as_deref(), Some("coreutils"));
        assert_eq!(query.incidental, vec![(PathBuf::from("/bin/cat"), "coreutils".to_string())]);
        assert_eq!(oracle.owner_queries(), 1);
    }
}
