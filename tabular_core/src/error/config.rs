//! Configuration error types

use thiserror::Error;

/// Configuration loading and merging errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Layered extraction failed (bad TOML, wrong types, ...)
    #[error("Failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    /// Overrides could not be turned into a configuration layer
    #[error("Invalid configuration override: {message}")]
    Serialize { message: String },
}

impl ConfigError {
    /// Create a serialization error
    pub fn serialize(message: &str) -> Self {
        Self::Serialize {
            message: message.to_string(),
        }
    }
}
