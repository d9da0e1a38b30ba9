//! Manifest writing.
//!
//! The output is meant to be read and edited by a person before packing,
//! so it carries a preamble and a size annotation on every file. None of
//! that is needed to load it back.

use std::io::Write as _;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use super::{ManifestError, Run, CONFIG_VERSION};
use crate::core::{File, Package};
use crate::util::size::{format_size, hsize};

#[derive(Serialize)]
struct RunsSection<'a> {
    runs: &'a [Run],
}

/// Write a manifest to `path`.
///
/// The document is written to a temporary file next to `path` and renamed
/// into place, so a failed write never leaves a truncated manifest behind.
pub fn save_config(
    path: &Path,
    runs: &[Run],
    packages: &[Package],
    other_files: &[File],
) -> Result<(), ManifestError> {
    let contents = render_config(runs, packages, other_files, Local::now())?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    // Created like a regular file, so the umask applies
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    if let Ok(existing) = std::fs::metadata(path) {
        tmp.as_file().set_permissions(existing.permissions())?;
    }
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::info!(
        "Wrote {} ({} packages, {} other files)",
        path.display(),
        packages.len(),
        other_files.len()
    );
    Ok(())
}

/// Render a manifest document.
///
/// Packages are emitted sorted by name so the same attribution always gives
/// the same document.
pub fn render_config(
    runs: &[Run],
    packages: &[Package],
    other_files: &[File],
    generated_at: DateTime<Local>,
) -> Result<String, ManifestError> {
    let mut out = String::new();
    out.push_str(&format!(
        "\
# repropack configuration file
# This file was generated by repropack {tool} at {date}

# You might want to edit this file before running the packer
# See 'repropack --help' for help

# Run info
version = {version}

# These files do not appear to come with an installed package -- you probably
# want them packed
other_files = [
",
        tool = env!("CARGO_PKG_VERSION"),
        date = generated_at.format("%Y-%m-%dT%H:%M:%S"),
        version = quote(CONFIG_VERSION),
    ));
    for file in other_files {
        write_file(&mut out, file);
    }
    out.push_str("]\n\n");

    out.push_str(&toml::to_string(&RunsSection { runs })?);

    out.push_str(
        "

# Files to pack
# All the files below were used by the program; they will be included in the
# generated package

# These files come from packages; we can thus choose not to include them, as it
# will simply be possible to install that package on the destination system
# They are included anyway by default
",
    );

    let mut sorted: Vec<&Package> = packages.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    for pkg in sorted {
        write_package(&mut out, pkg);
    }

    Ok(out)
}

fn write_package(out: &mut String, pkg: &Package) {
    out.push_str("\n[[packages]]\n");
    out.push_str(&format!("name = {}\n", quote(&pkg.name)));
    out.push_str(&format!("version = {}\n", quote(&pkg.version)));
    if let Some(size) = pkg.size {
        out.push_str(&format!("size = {}\n", size));
    }
    out.push_str(&format!("packfiles = {}\n", pkg.packfiles));
    out.push_str(&format!("# Total files used: {}\n", format_size(pkg.files_size())));
    if let Some(size) = pkg.size {
        out.push_str(&format!("# Installed package size: {}\n", format_size(size)));
    }
    out.push_str("files = [\n");
    for file in &pkg.files {
        write_file(out, file);
    }
    out.push_str("]\n");
}

fn write_file(out: &mut String, file: &File) {
    out.push_str(&format!(
        "    {}, # {}\n",
        quote(&file.path().to_string_lossy()),
        hsize(file.size())
    ));
}

/// Quote a string as a TOML value, escaping whatever needs it.
fn quote(s: &str) -> String {
    toml::Value::String(s.to_owned()).to_string()
}
