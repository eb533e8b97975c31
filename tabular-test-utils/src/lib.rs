//! Test utilities for the tabular crates
//!
//! This crate provides mock progress backends, a shared output buffer and a
//! log capture helper for asserting on warnings.

pub mod log_capture;
pub mod mocks;

// Re-export commonly used types
pub use log_capture::{CapturedRecord, capture_logs, warnings};
pub use mocks::{BackendEvent, RecordingBackend, SharedBuffer};
