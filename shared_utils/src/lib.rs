//! Small helpers shared across the workspace: environment lookup and TOML loading.

pub mod config;
pub mod env;
