//! Training-loop callback registry
//!
//! The training loop itself lives elsewhere. This module defines the hooks a
//! loop fires and the registry that fans them out, so progress backends can
//! plug their bars in through [`crate::progress::ProgressFacade::bar_callback`].

use std::collections::BTreeMap;
use std::fmt;

/// Metrics reported at the end of an epoch, keyed by name
pub type EpochMetrics = BTreeMap<String, f64>;

/// Hooks fired by a training loop
///
/// Every hook defaults to doing nothing.
pub trait TrainingCallback: Send {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    fn on_fit_start(&mut self, _max_epochs: usize) {}

    fn on_epoch_start(&mut self, _epoch: usize, _num_batches: Option<u64>) {}

    fn on_batch_end(&mut self, _epoch: usize, _batch: u64, _loss: Option<f64>) {}

    fn on_epoch_end(&mut self, _epoch: usize, _metrics: &EpochMetrics) {}

    fn on_fit_end(&mut self) {}
}

/// Ordered set of training callbacks
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: Vec<Box<dyn TrainingCallback>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback
    pub fn register(&mut self, callback: Box<dyn TrainingCallback>) -> &mut Self {
        log::debug!("Registering training callback '{}'", callback.name());
        self.callbacks.push(callback);
        self
    }

    /// Append a callback if there is one
    ///
    /// Returns whether anything was registered.
    pub fn register_optional(&mut self, callback: Option<Box<dyn TrainingCallback>>) -> bool {
        match callback {
            Some(callback) => {
                self.register(callback);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Callback names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.callbacks.iter().map(|c| c.name()).collect()
    }

    pub fn fit_start(&mut self, max_epochs: usize) {
        for callback in &mut self.callbacks {
            callback.on_fit_start(max_epochs);
        }
    }

    pub fn epoch_start(&mut self, epoch: usize, num_batches: Option<u64>) {
        for callback in &mut self.callbacks {
            callback.on_epoch_start(epoch, num_batches);
        }
    }

    pub fn batch_end(&mut self, epoch: usize, batch: u64, loss: Option<f64>) {
        for callback in &mut self.callbacks {
            callback.on_batch_end(epoch, batch, loss);
        }
    }

    pub fn epoch_end(&mut self, epoch: usize, metrics: &EpochMetrics) {
        for callback in &mut self.callbacks {
            callback.on_epoch_end(epoch, metrics);
        }
    }

    pub fn fit_end(&mut self) {
        for callback in &mut self.callbacks {
            callback.on_fit_end();
        }
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callbacks", &self.names())
            .finish()
    }
}
