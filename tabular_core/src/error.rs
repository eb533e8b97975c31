//! Error types for the tabular core library
//!
//! Errors are split by concern: progress backends and configuration. Backend
//! resolution problems (unknown or missing backends) are not errors at all;
//! they are reported as [`crate::progress::BackendIssue`] warnings.

use thiserror::Error;

pub mod config;
pub mod progress;

pub use self::config::ConfigError;
pub use self::progress::ProgressError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the tabular core library
#[derive(Error, Debug)]
pub enum Error {
    /// Progress backend errors
    #[error(transparent)]
    Progress(#[from] ProgressError),

    /// Configuration loading and merging errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}
