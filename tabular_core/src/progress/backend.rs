//! Backend selection and the backend trait
//!
//! A backend is an optional visualization provider. The facade only talks to
//! backends through [`ProgressBackend`]; everything a backend hands back
//! ([`IterationSink`], [`TaskContext`], training callbacks) is a transient
//! object owned by the caller.

use crate::callbacks::TrainingCallback;
use crate::error::ProgressError;
use crate::progress::options::BackendOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Progress backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// No-op tracking
    #[default]
    None,
    /// Plain text lines
    Simple,
    /// Styled terminal bars with manual task support
    Rich,
    /// Single tqdm-style terminal bar
    Tqdm,
}

impl BackendKind {
    /// All selectable kinds, in display order
    pub const ALL: [BackendKind; 4] = [
        BackendKind::None,
        BackendKind::Simple,
        BackendKind::Rich,
        BackendKind::Tqdm,
    ];

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::None => "none",
            BackendKind::Simple => "simple",
            BackendKind::Rich => "rich",
            BackendKind::Tqdm => "tqdm",
        }
    }

    /// Normalize an optional backend name
    ///
    /// Missing, empty and `"none"` names select [`BackendKind::None`].
    /// Names are trimmed and compared case-insensitively. Anything else is
    /// reported as [`BackendIssue::Unknown`] so the caller can warn and
    /// fall back.
    pub fn normalize(name: Option<&str>) -> Result<Self, BackendIssue> {
        let Some(raw) = name else {
            return Ok(BackendKind::None);
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(BackendKind::None);
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "none" => Ok(BackendKind::None),
            "simple" => Ok(BackendKind::Simple),
            "rich" => Ok(BackendKind::Rich),
            "tqdm" => Ok(BackendKind::Tqdm),
            _ => Err(BackendIssue::Unknown {
                name: raw.to_string(),
            }),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = BackendIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(Some(s))
    }
}

/// Reasons a requested backend could not be honoured
///
/// None of these are fatal. The facade logs them as warnings and degrades to
/// no-op tracking.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendIssue {
    /// Name did not match any known backend
    #[error("unknown progress backend '{name}'")]
    Unknown { name: String },

    /// Backend is known but not available in this build
    #[error("progress backend '{kind}' is not available")]
    Unavailable { kind: BackendKind },

    /// Backend cannot drive manual task contexts
    #[error("progress backend '{kind}' does not support manual task contexts")]
    NoTaskSupport { kind: BackendKind },
}

/// What a backend can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Can wrap iterators
    pub iteration: bool,
    /// Can open manual task contexts
    pub tasks: bool,
    /// Can provide training-loop callbacks
    pub callback: bool,
}

impl Capabilities {
    pub const fn new(iteration: bool, tasks: bool, callback: bool) -> Self {
        Self {
            iteration,
            tasks,
            callback,
        }
    }
}

/// Parameters for tracking a single iteration
#[derive(Debug, Clone, Default)]
pub struct TrackSpec {
    pub description: Option<String>,
    pub total: Option<u64>,
    pub options: BackendOptions,
}

impl TrackSpec {
    /// Create an empty track spec
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the description shown next to the bar
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the expected number of items
    pub fn total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Set backend options
    pub fn options(mut self, options: impl Into<BackendOptions>) -> Self {
        self.options = options.into();
        self
    }
}

/// Identifier of a task inside a [`TaskContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Option<usize>);

impl TaskId {
    /// Identifier handed out by contexts that do not track anything
    pub const NULL: TaskId = TaskId(None);

    pub fn new(index: usize) -> Self {
        Self(Some(index))
    }

    pub fn index(&self) -> Option<usize> {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }
}

/// Receives advancement of a wrapped iterator
pub trait IterationSink: Send {
    /// Record `n` consumed items
    fn advance(&mut self, n: u64);

    /// The iterator was exhausted
    fn finish(&mut self);

    /// The iterator was dropped before exhaustion
    fn abandon(&mut self) {
        self.finish();
    }
}

/// Manual task tracking for a scoped block of work
pub trait TaskContext: Send {
    /// Register a task and return its id
    fn add_task(&mut self, description: &str, total: Option<u64>) -> TaskId;

    /// Advance a task; unknown ids are ignored
    fn update(&mut self, task: TaskId, advance: u64);

    /// Release display resources held by the context
    ///
    /// Called exactly once, from the owning scope.
    fn release(&mut self);
}

/// A pluggable progress visualization provider
pub trait ProgressBackend: Send + Sync {
    /// Which selector this backend answers to
    fn kind(&self) -> BackendKind;

    /// What this backend can do
    fn capabilities(&self) -> Capabilities;

    /// Start tracking a single iteration
    fn iteration_sink(&self, spec: &TrackSpec) -> Result<Box<dyn IterationSink>, ProgressError>;

    /// Open a manual task context
    fn task_context(&self, _options: &BackendOptions) -> Result<Box<dyn TaskContext>, ProgressError> {
        Err(ProgressError::unsupported(self.kind(), "task contexts"))
    }

    /// Build a training-loop callback
    fn bar_callback(
        &self,
        _options: &BackendOptions,
    ) -> Result<Box<dyn TrainingCallback>, ProgressError> {
        Err(ProgressError::unsupported(self.kind(), "training callbacks"))
    }
}
