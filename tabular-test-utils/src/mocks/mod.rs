//! Mock implementations for testing

mod backend;
mod writer;

pub use backend::{BackendEvent, RecordingBackend};
pub use writer::SharedBuffer;
