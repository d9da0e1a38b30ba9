//! dpkg backend.
//!
//! Ownership comes from `dpkg -S <path>`, whose output lines look like
//!
//! ```text
//! coreutils: /usr/bin/ls
//! libc6:amd64: /lib/x86_64-linux-gnu/libc.so.6
//! libfoo1, libfoo-dev: /usr/share/doc/libfoo
//! diversion by dash from: /bin/sh
//! ```
//!
//! and package metadata from `dpkg-query -W -f <format> <name>`.

use std::path::{Path, PathBuf};

use super::{OracleError, OwnerQuery, PackageInfo, PackageOracle};
use crate::util::process::{CommandOutput, CommandRunner};

const QUERY_FORMAT: &str = "${Status}\\t${Version}\\t${Installed-Size}\\n";

/// Queries the dpkg database through its command-line tools.
#[derive(Debug)]
pub struct DpkgOracle<R> {
    runner: R,
}

impl<R: CommandRunner> DpkgOracle<R> {
    pub fn new(runner: R) -> Self {
        DpkgOracle { runner }
    }

    /// Get the underlying command runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: CommandRunner> PackageOracle for DpkgOracle<R> {
    fn query_owner(&mut self, path: &Path) -> Result<OwnerQuery, OracleError> {
        let path_str = path.to_string_lossy().into_owned();
        let output = self.runner.run("dpkg", &["-S", path_str.as_str()])?;

        // dpkg exits with 1 when no package contains the path
        match output.status {
            Some(0) => {}
            Some(1) => return Ok(OwnerQuery::default()),
            _ => return Err(failed(format!("dpkg -S {}", path_str), output)),
        }

        let mut query = OwnerQuery::default();
        for line in output.stdout.lines() {
            if line.is_empty() || line.starts_with("diversion by ") {
                continue;
            }
            let Some((packages, owned)) = line.split_once(": ") else {
                return Err(OracleError::Parse {
                    command: format!("dpkg -S {}", path_str),
                    line: line.to_string(),
                });
            };
            let Some(package) = packages.split(", ").next().map(str::trim) else {
                continue;
            };

            let owned = PathBuf::from(owned.trim());
            if owned == path {
                query.owner = Some(package.to_string());
            } else {
                query.incidental.push((owned, package.to_string()));
            }
        }

        Ok(query)
    }

    fn query_package(&mut self, name: &str) -> Result<PackageInfo, OracleError> {
        let output = self
            .runner
            .run("dpkg-query", &["-W", "-f", QUERY_FORMAT, name])?;

        match output.status {
            Some(0) => {}
            Some(1) => return Err(OracleError::NotInstalled(name.to_string())),
            _ => return Err(failed(format!("dpkg-query -W {}", name), output)),
        }

        for line in output.stdout.lines() {
            let mut fields = line.split('\t');
            let (Some(status), Some(version)) = (fields.next(), fields.next()) else {
                return Err(OracleError::Parse {
                    command: format!("dpkg-query -W {}", name),
                    line: line.to_string(),
                });
            };
            if !status.ends_with(" installed") {
                continue;
            }

            // Installed-Size is in KiB and may be empty. Sizes a manifest
            // integer cannot hold are treated as unknown.
            let size = fields
                .next()
                .and_then(|s| s.trim().parse::<u64>().ok())
                .and_then(|kib| kib.checked_mul(1024))
                .filter(|bytes| *bytes <= i64::MAX as u64);

            return Ok(PackageInfo {
                version: version.to_string(),
                size,
            });
        }

        Err(OracleError::NotInstalled(name.to_string()))
    }
}

fn failed(command: String, output: CommandOutput) -> OracleError {
    OracleError::Failed {
        command,
        status: output.status,
        stderr: output.stderr.trim().to_string(),
    }
}
