//! `repropack resave` command

use anyhow::Result;

use crate::cli::ResaveArgs;
use repropack::ops::resave_manifest;

pub fn execute(args: ResaveArgs) -> Result<()> {
    let config = resave_manifest(&args.manifest, args.output.as_deref())?;

    let written = args.output.as_ref().unwrap_or(&args.manifest);
    eprintln!(
        "     Wrote {} ({} files)",
        written.display(),
        config.file_count()
    );

    Ok(())
}
