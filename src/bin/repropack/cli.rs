//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// repropack - record which files a traced program used, and which OS
/// packages they came from
#[derive(Parser)]
#[command(name = "repropack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Attribute traced files to packages and write a manifest
    Identify(IdentifyArgs),

    /// Validate a manifest and print a summary
    Check(CheckArgs),

    /// Reload a manifest and write it back with fresh size annotations
    Resave(ResaveArgs),
}

#[derive(Args)]
pub struct IdentifyArgs {
    /// File listing the traced paths, one per line
    pub files: PathBuf,

    /// TOML document with the `runs` to record
    #[arg(long)]
    pub runs: Option<PathBuf>,

    /// Where to write the manifest
    #[arg(short, long, default_value = "config.toml")]
    pub output: PathBuf,

    /// Package database to query (auto, dpkg, none)
    #[arg(long, env = "REPROPACK_BACKEND")]
    pub backend: Option<String>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Manifest to check
    #[arg(default_value = "config.toml")]
    pub manifest: PathBuf,

    /// Print the manifest as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ResaveArgs {
    /// Manifest to refresh
    #[arg(default_value = "config.toml")]
    pub manifest: PathBuf,

    /// Write to this path instead of overwriting the manifest
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
