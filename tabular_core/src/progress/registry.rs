//! Backend registry
//!
//! The registry is the capability probe: the facade asks it for a backend
//! at call time and falls back to no-op tracking when nothing answers.
//! Cargo features only decide what [`BackendRegistry::builtin`] registers.

use crate::progress::backend::{BackendKind, Capabilities, ProgressBackend};
use crate::progress::simple::SimpleBackend;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Set of available progress backends, keyed by kind
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: HashMap<BackendKind, Arc<dyn ProgressBackend>>,
}

impl BackendRegistry {
    /// Registry with nothing available
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every backend compiled into this build
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(SimpleBackend::stderr()));

        #[cfg(feature = "rich")]
        registry.register(Arc::new(crate::progress::rich::RichBackend::new()));

        #[cfg(feature = "tqdm")]
        registry.register(Arc::new(crate::progress::tqdm::TqdmBackend::new()));

        registry
    }

    /// Register a backend, replacing any previous one of the same kind
    ///
    /// Backends claiming [`BackendKind::None`] are ignored: no-op tracking is
    /// handled by the facade itself.
    pub fn register(&mut self, backend: Arc<dyn ProgressBackend>) -> &mut Self {
        let kind = backend.kind();
        if kind == BackendKind::None {
            log::debug!("Ignoring progress backend registered as 'none'");
            return self;
        }

        if self.backends.insert(kind, backend).is_some() {
            log::debug!("Replaced progress backend '{kind}'");
        }
        self
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, backend: Arc<dyn ProgressBackend>) -> Self {
        self.register(backend);
        self
    }

    /// Remove a backend, simulating a missing dependency
    pub fn remove(&mut self, kind: BackendKind) -> Option<Arc<dyn ProgressBackend>> {
        self.backends.remove(&kind)
    }

    /// Look up a backend at call time
    pub fn probe(&self, kind: BackendKind) -> Option<Arc<dyn ProgressBackend>> {
        self.backends.get(&kind).cloned()
    }

    /// Whether a backend of `kind` can be used
    ///
    /// [`BackendKind::None`] is always available.
    pub fn is_available(&self, kind: BackendKind) -> bool {
        kind == BackendKind::None || self.backends.contains_key(&kind)
    }

    /// Capabilities of the registered backend, if any
    pub fn capabilities(&self, kind: BackendKind) -> Option<Capabilities> {
        self.backends.get(&kind).map(|b| b.capabilities())
    }

    /// Registered kinds in display order
    pub fn available(&self) -> Vec<BackendKind> {
        BackendKind::ALL
            .into_iter()
            .filter(|kind| self.backends.contains_key(kind))
            .collect()
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.available())
            .finish()
    }
}
