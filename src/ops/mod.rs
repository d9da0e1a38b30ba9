//! High-level operations behind the `repropack` commands.

pub mod identify;
pub mod manifest;

pub use identify::{failure_report, identify, identify_packages, IdentifyOptions};
pub use manifest::{check_manifest, resave_manifest, summarize};
