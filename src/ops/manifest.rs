//! Inspecting and refreshing existing manifests.

use std::path::Path;

use anyhow::{Context, Result};

use crate::manifest::{load_config, load_config_with, Config, LiveEntities};
use crate::util::size::format_size;

/// Load and validate a manifest.
pub fn check_manifest(path: &Path) -> Result<Config> {
    load_config(path).with_context(|| format!("failed to load manifest: {}", path.display()))
}

/// Reload a manifest with sizes sampled from the live filesystem and write
/// it back, regenerating every annotation.
pub fn resave_manifest(path: &Path, output: Option<&Path>) -> Result<Config> {
    let config = load_config_with(path, &LiveEntities)
        .with_context(|| format!("failed to load manifest: {}", path.display()))?;

    let output = output.unwrap_or(path);
    config
        .save(output)
        .with_context(|| format!("failed to write manifest: {}", output.display()))?;

    Ok(config)
}

/// Human-readable summary of a manifest.
pub fn summarize(config: &Config) -> String {
    let mut out = String::new();

    out.push_str(&format!("runs: {}\n", config.runs.len()));
    out.push_str(&format!("packages: {}\n", config.packages.len()));

    let mut packages: Vec<_> = config.packages.iter().collect();
    packages.sort_by(|a, b| a.name.cmp(&b.name));
    for pkg in packages {
        let mode = if pkg.packfiles { "pack" } else { "reinstall" };
        out.push_str(&format!(
            "  {} {} files, {}\n",
            pkg,
            pkg.files.len(),
            mode
        ));
    }

    let known: u64 = config.other_files.iter().filter_map(|f| f.size()).sum();
    out.push_str(&format!(
        "other files: {} ({} known)\n",
        config.other_files.len(),
        format_size(known)
    ));

    out
}
