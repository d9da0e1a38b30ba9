//! Core data structures for repropack.
//!
//! - `File`: a path the traced program used, identified by path alone
//! - `Package`: an installed OS package and the traced files it owns

pub mod file;
pub mod package;

pub use file::File;
pub use package::Package;
