//! Progress backend error types

use crate::progress::BackendKind;
use thiserror::Error;

/// Errors returned by progress backends
///
/// Only a malformed options payload or a backend that cannot build its
/// display surfaces here. Unknown or unavailable backends never do.
#[derive(Error, Debug)]
pub enum ProgressError {
    /// Options payload could not be decoded into the backend's options type
    #[error("invalid options for progress backend '{backend}': {source}")]
    InvalidOptions {
        backend: BackendKind,
        #[source]
        source: serde_json::Error,
    },

    /// Backend rejected its configuration (templates, characters, ...)
    #[error("progress backend '{backend}' failed: {message}")]
    Backend {
        backend: BackendKind,
        message: String,
    },

    /// Backend was asked for something it does not provide
    #[error("progress backend '{backend}' does not support {feature}")]
    Unsupported {
        backend: BackendKind,
        feature: &'static str,
    },
}

impl ProgressError {
    /// Create an invalid options error
    pub fn invalid_options(backend: BackendKind, source: serde_json::Error) -> Self {
        Self::InvalidOptions { backend, source }
    }

    /// Create a backend failure error
    pub fn backend(backend: BackendKind, message: impl Into<String>) -> Self {
        Self::Backend {
            backend,
            message: message.into(),
        }
    }

    /// Create an unsupported feature error
    pub fn unsupported(backend: BackendKind, feature: &'static str) -> Self {
        Self::Unsupported { backend, feature }
    }
}
