//! Shared utilities

pub mod config;
pub mod process;
pub mod size;

pub use config::Settings;
