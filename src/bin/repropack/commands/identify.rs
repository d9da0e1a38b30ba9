//! `repropack identify` command

use anyhow::{bail, Result};

use crate::cli::IdentifyArgs;
use repropack::ops::{failure_report, identify, IdentifyOptions};
use repropack::util::config::{load_project_settings, BackendChoice};

pub fn execute(args: IdentifyArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let mut settings = load_project_settings(&cwd);

    if let Some(ref backend) = args.backend {
        let choice = match backend.as_str() {
            "auto" => BackendChoice::Auto,
            "dpkg" => BackendChoice::Dpkg,
            "none" => BackendChoice::None,
            other => bail!("unknown backend `{}` (expected auto, dpkg or none)", other),
        };
        settings.attribution.backend = Some(choice);
    }

    let opts = IdentifyOptions {
        file_list: &args.files,
        runs: args.runs.as_deref(),
        output: &args.output,
    };
    let attributed = identify(&opts, &settings.attribution)?;

    for failure in attributed.failures {
        eprintln!("warning: {}", failure_report(failure));
    }
    eprintln!(
        "     Wrote {} ({} packages, {} other files)",
        args.output.display(),
        attributed.packages.len(),
        attributed.unknown_files.len()
    );

    Ok(())
}
