//! Command implementations

pub mod plugins;
pub mod provision;
pub mod version;
