//! Turning a trace's file list into a manifest.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::attribution::{Attributed, Attribution, AttributionError, DirectoryRules};
use crate::core::File;
use crate::manifest::{save_config, Run};
use crate::oracle::{detect_backend, Backend, DpkgOracle, PackageOracle};
use crate::util::config::{AttributionConfig, BackendChoice};
use crate::util::process::SystemRunner;

/// Options for [`identify`].
#[derive(Debug, Clone)]
pub struct IdentifyOptions<'a> {
    /// Newline-separated list of paths the program used
    pub file_list: &'a Path,
    /// TOML document holding a `runs` array, passed through untouched
    pub runs: Option<&'a Path>,
    /// Where to write the manifest
    pub output: &'a Path,
}

/// Resolve the configured backend choice against the host.
pub fn select_backend(config: &AttributionConfig) -> Backend {
    match config.backend() {
        BackendChoice::Auto => detect_backend(),
        BackendChoice::Dpkg => Backend::Dpkg,
        BackendChoice::None => Backend::Unsupported,
    }
}

/// Build the oracle for a backend, `None` when there is nothing to query.
pub fn oracle_for(backend: Backend, config: &AttributionConfig) -> Option<Box<dyn PackageOracle>> {
    match backend {
        Backend::Dpkg => Some(Box::new(DpkgOracle::new(SystemRunner::new(
            config.oracle_timeout(),
        )))),
        Backend::Unsupported => None,
    }
}

/// Attribute `files` with `oracle`; without an oracle nothing is attributed.
pub fn attribute_files<O: PackageOracle>(
    files: Vec<File>,
    oracle: Option<O>,
    config: &AttributionConfig,
) -> Attributed {
    let Some(oracle) = oracle else {
        tracing::info!("No supported package manager, packing all files individually");
        return Attributed {
            unknown_files: files,
            ..Default::default()
        };
    };

    let mut session = Attribution::with_rules(oracle, DirectoryRules::from_config(config));
    session.attribute(files);
    session.finish()
}

/// Organize files using the host's package manager.
pub fn identify_packages(files: Vec<File>, config: &AttributionConfig) -> Attributed {
    let backend = select_backend(config);
    tracing::debug!("package backend: {}", backend);
    attribute_files(files, oracle_for(backend, config), config)
}

/// Read a file list: one absolute path per line, blank lines ignored.
///
/// Only the line terminator is stripped; other whitespace belongs to the path.
///
/// Duplicates are dropped, keeping the first occurrence.
pub fn read_file_list(contents: &str) -> Result<Vec<File>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for (lineno, line) in contents.lines().enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        if !Path::new(line).is_absolute() {
            bail!("line {}: `{}` is not an absolute path", lineno + 1, line);
        }

        let file = File::new(line);
        if seen.insert(file.clone()) {
            files.push(file);
        }
    }

    Ok(files)
}

/// Read the `runs` array from a TOML document.
pub fn read_runs(path: &Path) -> Result<Vec<Run>> {
    #[derive(serde::Deserialize)]
    struct RunsDocument {
        #[serde(default)]
        runs: Vec<Run>,
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read runs: {}", path.display()))?;
    let doc: RunsDocument = toml::from_str(&contents)
        .with_context(|| format!("failed to parse runs: {}", path.display()))?;
    Ok(doc.runs)
}

/// One-line description of a failure, including its causes.
pub fn failure_report(failure: AttributionError) -> String {
    format!("{:#}", anyhow::Error::from(failure))
}

/// Attribute the files of a trace and write the manifest.
pub fn identify(opts: &IdentifyOptions<'_>, config: &AttributionConfig) -> Result<Attributed> {
    let contents = std::fs::read_to_string(opts.file_list)
        .with_context(|| format!("failed to read file list: {}", opts.file_list.display()))?;
    let files = read_file_list(&contents)?;
    let runs = match opts.runs {
        Some(path) => read_runs(path)?,
        None => Vec::new(),
    };

    tracing::info!("Identifying packages for {} files", files.len());
    let attributed = identify_packages(files, config);

    save_config(
        opts.output,
        &runs,
        &attributed.packages,
        &attributed.unknown_files,
    )
    .with_context(|| format!("failed to write manifest: {}", opts.output.display()))?;

    Ok(attributed)
}
