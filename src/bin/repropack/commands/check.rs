//! `repropack check` command

use anyhow::Result;

use crate::cli::CheckArgs;
use repropack::ops::{check_manifest, summarize};

pub fn execute(args: CheckArgs) -> Result<()> {
    let config = check_manifest(&args.manifest)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", summarize(&config));
    }

    Ok(())
}
