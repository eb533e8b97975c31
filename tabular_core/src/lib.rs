//! Tabular Core Library
//!
//! Progress reporting and configuration utilities for tabular model
//! training: a backend-agnostic progress facade, progress-bar training
//! callbacks, a logger factory and layered trainer configuration.

pub mod callbacks;
pub mod config;
pub mod error;
pub mod logging;
pub mod progress;

// Re-export main types
pub use callbacks::{CallbackRegistry, EpochMetrics, TrainingCallback};
pub use config::{ConfigLoader, Devices, TrainerConfig};
pub use error::{ConfigError, Error, ProgressError, Result};
pub use logging::init_logging;
pub use progress::{
    BackendKind, BackendOptions, BackendRegistry, ProgressFacade, ProgressScope, ProgressSettings,
    TrackSpec, Tracked, Tracker,
};
