//! Error types for sensordash.
//!
//! Adapter failures ([`SourceError`]) never leave their adapter: they are
//! logged and collapsed into [`SourceResult::Unavailable`]. Only a
//! [`ConfigurationError`] from the terminal simulated source reaches the
//! dashboard controller.
//!
//! [`SourceResult::Unavailable`]: crate::model::SourceResult::Unavailable

use std::path::PathBuf;

use thiserror::Error;

/// Why a single adapter attempt could not produce a reading.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network failure, timeout, or non-success HTTP status.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A local resource could not be read.
    #[error("resource error: {0}")]
    Resource(#[from] std::io::Error),

    /// The response arrived but lacked the fields the adapter needs.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl SourceError {
    pub fn malformed(message: impl Into<String>) -> Self {
        SourceError::Malformed(message.into())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Malformed(err.to_string())
    }
}

/// The terminal source could not construct a reading.
///
/// This is unrecoverable for the current refresh cycle only; the next timer
/// tick retries the whole chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("configuration error: {0}")]
pub struct ConfigurationError(pub String);

/// Startup configuration failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
