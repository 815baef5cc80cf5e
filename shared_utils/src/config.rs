//! TOML configuration loading.
//!
//! Binaries describe their configuration as a `serde` struct and load it with
//! [`load_toml`] (from disk) or [`parse_toml`] (from a string). Errors carry the
//! offending path so they can be reported as-is.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors related to application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or does not match the schema.
    #[error("failed to parse config {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// An environment variable required by the application is not set.
    #[error(transparent)]
    MissingEnvVar(#[from] crate::env::MissingEnvVarError),
}

/// Parse a TOML document into `T`.
///
/// `origin` is only used to label errors (a file path, or e.g. `"<inline>"`).
pub fn parse_toml<T: DeserializeOwned>(text: &str, origin: &str) -> Result<T, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })
}

/// Read a TOML file from disk and parse it into `T`.
pub fn load_toml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_toml(&text, &path.display().to_string())
}
