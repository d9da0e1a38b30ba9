//! repropack - record which files a traced program used
//!
//! This crate provides the core library functionality for repropack:
//! the manifest format (loading, validation, annotated writing) and the
//! attribution of traced files to the OS packages that own them.

pub mod attribution;
pub mod core;
pub mod manifest;
pub mod ops;
pub mod oracle;
pub mod util;

/// Test utilities and mocks for repropack unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a mock command executor and an in-memory
/// package database.
#[cfg(test)]
pub mod test_support;

pub use attribution::{attribute, Attributed, Attribution, AttributionError};
pub use core::{file::File, package::Package};
pub use manifest::{load_config, save_config, Config, ManifestError};
pub use oracle::{detect_backend, Backend, PackageOracle};
pub use util::config::Settings;
