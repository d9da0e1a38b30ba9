//! Command implementations

pub mod check;
pub mod identify;
pub mod resave;
