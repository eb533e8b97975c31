//! Scoped task contexts
//!
//! [`ProgressScope`] owns a backend [`TaskContext`] and releases it when
//! dropped, so display state is cleaned up on every exit path, including
//! early returns and panics.

use crate::progress::backend::{TaskContext, TaskId};
use std::fmt;

/// Task context that accepts everything and tracks nothing
pub struct NoOpTaskContext;

impl TaskContext for NoOpTaskContext {
    fn add_task(&mut self, _description: &str, _total: Option<u64>) -> TaskId {
        TaskId::NULL
    }

    fn update(&mut self, _task: TaskId, _advance: u64) {
        // No-op
    }

    fn release(&mut self) {
        // Nothing to release
    }
}

/// Guarded task-tracking handle
pub struct ProgressScope {
    context: Box<dyn TaskContext>,
    tracking: bool,
    released: bool,
}

impl ProgressScope {
    /// Scope backed by a real backend context
    pub fn new(context: Box<dyn TaskContext>) -> Self {
        Self {
            context,
            tracking: true,
            released: false,
        }
    }

    /// Do-nothing scope
    pub fn noop() -> Self {
        Self {
            context: Box::new(NoOpTaskContext),
            tracking: false,
            released: false,
        }
    }

    /// Whether tasks are shown by a backend
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Add a task without a known total
    pub fn add_task(&mut self, description: &str) -> TaskId {
        self.context.add_task(description, None)
    }

    /// Add a task with a known total
    pub fn add_task_with_total(&mut self, description: &str, total: u64) -> TaskId {
        self.context.add_task(description, Some(total))
    }

    /// Advance a task
    pub fn update(&mut self, task: TaskId, advance: u64) {
        self.context.update(task, advance);
    }

    /// Release the context now instead of at end of scope
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.context.release();
        }
    }
}

impl Drop for ProgressScope {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ProgressScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressScope")
            .field("tracking", &self.tracking)
            .field("released", &self.released)
            .finish()
    }
}
