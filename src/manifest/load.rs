//! Manifest loading and schema validation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{Config, ManifestError, Run, CONFIG_VERSION, SECTIONS};
use crate::core::{File, Package};

/// Builds the entities a manifest decodes into.
///
/// Loading goes through this so callers decide how `File`s are created:
/// from the document alone, or re-sampled from the live filesystem.
pub trait EntityFactory {
    fn file(&self, path: PathBuf) -> File;

    fn package(
        &self,
        name: String,
        version: String,
        files: Vec<File>,
        packfiles: bool,
        size: Option<u64>,
    ) -> Package {
        Package::new(name, version)
            .with_files(files)
            .with_packfiles(packfiles)
            .with_size(size)
    }
}

/// Takes everything from the document; never touches the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentEntities;

impl EntityFactory for DocumentEntities {
    fn file(&self, path: PathBuf) -> File {
        File::with_size(path, None)
    }
}

/// Re-samples file sizes from the filesystem, for refreshing annotations.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveEntities;

impl EntityFactory for LiveEntities {
    fn file(&self, path: PathBuf) -> File {
        File::new(path)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackageEntry {
    name: String,
    version: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default = "default_true")]
    packfiles: bool,
    #[serde(default)]
    files: Vec<PathBuf>,
}

fn default_true() -> bool {
    true
}

/// Load a manifest from a file.
pub fn load_config(path: &Path) -> Result<Config, ManifestError> {
    load_config_with(path, &DocumentEntities)
}

/// Load a manifest from a file, building entities through `factory`.
pub fn load_config_with(path: &Path, factory: &dyn EntityFactory) -> Result<Config, ManifestError> {
    let contents = std::fs::read_to_string(path)?;
    let config = parse_config(&contents, factory)?;
    tracing::info!(
        "Loaded {} ({} packages, {} other files)",
        path.display(),
        config.packages.len(),
        config.other_files.len()
    );
    Ok(config)
}

/// Parse and validate a manifest document.
///
/// The whole schema is checked before any entity is built, so a failed
/// load never hands back a partial model.
pub fn parse_config(contents: &str, factory: &dyn EntityFactory) -> Result<Config, ManifestError> {
    let mut document: toml::Table = contents.parse()?;

    check_sections(&document)?;

    let runs: Vec<Run> = decode_section(&mut document, "runs")?;
    let packages: Vec<PackageEntry> = decode_section(&mut document, "packages")?;
    let other_files: Vec<PathBuf> = decode_section(&mut document, "other_files")?;

    let packages = packages
        .into_iter()
        .map(|entry| {
            let files = entry.files.into_iter().map(|p| factory.file(p)).collect();
            factory.package(entry.name, entry.version, files, entry.packfiles, entry.size)
        })
        .collect();
    let other_files = other_files.into_iter().map(|p| factory.file(p)).collect();

    Ok(Config {
        runs,
        packages,
        other_files,
    })
}

fn check_sections(document: &toml::Table) -> Result<(), ManifestError> {
    match document.get("version") {
        None => return Err(ManifestError::invalid("missing version")),
        Some(toml::Value::String(v)) if v == CONFIG_VERSION => {}
        Some(_) => return Err(ManifestError::invalid("unknown version")),
    }

    let unknown: BTreeSet<&str> = document
        .keys()
        .map(String::as_str)
        .filter(|key| !SECTIONS.contains(key))
        .collect();
    if !unknown.is_empty() {
        let names: Vec<&str> = unknown.into_iter().collect();
        return Err(ManifestError::invalid(format!(
            "unrecognized sections: {}",
            names.join(", ")
        )));
    }

    Ok(())
}

/// Decode an optional section; absent sections are empty.
fn decode_section<T>(document: &mut toml::Table, key: &str) -> Result<Vec<T>, ManifestError>
where
    T: DeserializeOwned,
{
    match document.remove(key) {
        None => Ok(Vec::new()),
        Some(value @ toml::Value::Array(_)) => value
            .try_into()
            .map_err(|e| ManifestError::invalid(format!("invalid `{}` section: {}", key, e))),
        Some(_) => Err(ManifestError::invalid(format!("`{}` must be a list", key))),
    }
}
