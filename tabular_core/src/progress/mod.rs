//! Progress tracking for training and inference loops
//!
//! [`ProgressFacade`] hides which visualization backend is in use. Callers
//! name a backend (`"none"`, `"simple"`, `"rich"`, `"tqdm"`); if that backend
//! is unknown or not available in this build, tracking quietly degrades to a
//! no-op after a single warning.
//!
//! ```
//! use tabular_core::progress::{self, TrackSpec};
//!
//! let tracked = progress::track(Some("none"), vec![1, 2, 3], TrackSpec::new()).unwrap();
//! assert_eq!(tracked.collect::<Vec<_>>(), vec![1, 2, 3]);
//! ```

pub mod backend;
pub mod facade;
pub mod options;
pub mod registry;
#[cfg(feature = "rich")]
pub mod rich;
pub mod scope;
pub mod simple;
#[cfg(feature = "tqdm")]
pub mod tqdm;
pub mod tracked;
pub mod utils;

pub use backend::{
    BackendIssue, BackendKind, Capabilities, IterationSink, ProgressBackend, TaskContext, TaskId,
    TrackSpec,
};
pub use facade::{
    ProgressFacade, ProgressSettings, bar_callback, scoped_context, track, tracker,
    with_scoped_context,
};
pub use options::BackendOptions;
pub use registry::BackendRegistry;
pub use scope::{NoOpTaskContext, ProgressScope};
pub use simple::{SharedWriter, SimpleBackend};
pub use tracked::{Tracked, Tracker};
