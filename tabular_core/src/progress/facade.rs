//! Progress facade
//!
//! Uniform tracking interface over whatever backends are registered. A
//! backend that is unknown, unavailable or lacks a capability never breaks
//! the caller: the facade logs one warning and degrades to no-op tracking.

use crate::callbacks::TrainingCallback;
use crate::error::ProgressError;
use crate::progress::backend::{BackendIssue, BackendKind, ProgressBackend, TrackSpec};
use crate::progress::options::BackendOptions;
use crate::progress::registry::BackendRegistry;
use crate::progress::scope::ProgressScope;
use crate::progress::tracked::{Tracked, Tracker};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

/// Progress settings as carried by trainer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSettings {
    pub backend: Option<String>,
    pub enabled: bool,
    #[serde(default)]
    pub options: BackendOptions,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            backend: Some(BackendKind::Simple.to_string()),
            enabled: true,
            options: BackendOptions::default(),
        }
    }
}

/// Dispatches progress requests to registered backends
#[derive(Debug, Clone)]
pub struct ProgressFacade {
    registry: BackendRegistry,
}

impl ProgressFacade {
    /// Facade over every backend compiled into this build
    pub fn new() -> Self {
        Self::with_registry(BackendRegistry::builtin())
    }

    /// Facade over a custom registry
    pub fn with_registry(registry: BackendRegistry) -> Self {
        Self { registry }
    }

    /// Process-wide facade used by the module-level helpers
    pub fn global() -> &'static ProgressFacade {
        static GLOBAL: OnceLock<ProgressFacade> = OnceLock::new();
        GLOBAL.get_or_init(ProgressFacade::new)
    }

    /// Registry consulted by this facade
    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Resolve a backend name, warning when it cannot be honoured
    ///
    /// `None` means no-op tracking.
    pub fn resolve(&self, backend: Option<&str>) -> Option<Arc<dyn ProgressBackend>> {
        let kind = match BackendKind::normalize(backend) {
            Ok(kind) => kind,
            Err(issue) => {
                warn_fallback(&issue);
                return None;
            }
        };

        if kind == BackendKind::None {
            return None;
        }

        match self.registry.probe(kind) {
            Some(found) => Some(found),
            None => {
                warn_fallback(&BackendIssue::Unavailable { kind });
                None
            }
        }
    }

    /// Wrap an iterable with progress reporting
    ///
    /// The result yields exactly the items of `iterable`, in order. Only a
    /// malformed options payload for an available backend is an error.
    pub fn track<T>(
        &self,
        backend: Option<&str>,
        iterable: T,
        spec: TrackSpec,
    ) -> Result<Tracked<T::IntoIter>, ProgressError>
    where
        T: IntoIterator,
    {
        self.tracker(backend, spec).wrap(iterable)
    }

    /// Resolve a backend now and wrap iterables later
    pub fn tracker(&self, backend: Option<&str>, spec: TrackSpec) -> Tracker {
        let resolved = self.resolve(backend).filter(|found| {
            let supported = found.capabilities().iteration;
            if !supported {
                log::warn!(
                    "progress backend '{}' cannot wrap iterators; falling back to no-op progress",
                    found.kind()
                );
            }
            supported
        });

        Tracker::new(resolved, spec)
    }

    /// Open a scoped task context
    ///
    /// The returned scope releases backend display resources when dropped.
    pub fn scoped_context(
        &self,
        backend: Option<&str>,
        options: &BackendOptions,
    ) -> Result<ProgressScope, ProgressError> {
        let Some(found) = self.resolve(backend) else {
            return Ok(ProgressScope::noop());
        };

        if !found.capabilities().tasks {
            warn_fallback(&BackendIssue::NoTaskSupport { kind: found.kind() });
            return Ok(ProgressScope::noop());
        }

        let context = found.task_context(options)?;
        Ok(ProgressScope::new(context))
    }

    /// Run `f` inside a scoped task context
    ///
    /// The scope is released before the closure's result is returned, and
    /// also when `f` panics.
    pub fn with_scoped_context<R, F>(
        &self,
        backend: Option<&str>,
        options: &BackendOptions,
        f: F,
    ) -> Result<R, ProgressError>
    where
        F: FnOnce(&mut ProgressScope) -> R,
    {
        let mut scope = self.scoped_context(backend, options)?;
        let result = f(&mut scope);
        scope.close();
        Ok(result)
    }

    /// Progress callback for a training loop's callback registry
    ///
    /// `Ok(None)` means there is no callback to register, which is a normal
    /// outcome for `none`, unavailable backends and backends without
    /// callback support.
    pub fn bar_callback(
        &self,
        backend: Option<&str>,
        options: &BackendOptions,
    ) -> Result<Option<Box<dyn TrainingCallback>>, ProgressError> {
        let Some(found) = self.resolve(backend) else {
            return Ok(None);
        };

        if !found.capabilities().callback {
            log::debug!(
                "Progress backend '{}' has no training callback; none registered",
                found.kind()
            );
            return Ok(None);
        }

        found.bar_callback(options).map(Some)
    }

    /// [`bar_callback`](Self::bar_callback) driven by configuration
    ///
    /// A disabled progress bar yields `None` without resolving the backend.
    pub fn bar_callback_for(
        &self,
        settings: &ProgressSettings,
    ) -> Result<Option<Box<dyn TrainingCallback>>, ProgressError> {
        if !settings.enabled {
            log::debug!("Progress bar disabled; no callback registered");
            return Ok(None);
        }

        self.bar_callback(settings.backend.as_deref(), &settings.options)
    }
}

impl Default for ProgressFacade {
    fn default() -> Self {
        Self::new()
    }
}

fn warn_fallback(issue: &BackendIssue) {
    log::warn!("{issue}; falling back to no-op progress");
}

/// [`ProgressFacade::track`] on the global facade
pub fn track<T>(
    backend: Option<&str>,
    iterable: T,
    spec: TrackSpec,
) -> Result<Tracked<T::IntoIter>, ProgressError>
where
    T: IntoIterator,
{
    ProgressFacade::global().track(backend, iterable, spec)
}

/// [`ProgressFacade::tracker`] on the global facade
pub fn tracker(backend: Option<&str>, spec: TrackSpec) -> Tracker {
    ProgressFacade::global().tracker(backend, spec)
}

/// [`ProgressFacade::scoped_context`] on the global facade
pub fn scoped_context(
    backend: Option<&str>,
    options: &BackendOptions,
) -> Result<ProgressScope, ProgressError> {
    ProgressFacade::global().scoped_context(backend, options)
}

/// [`ProgressFacade::with_scoped_context`] on the global facade
pub fn with_scoped_context<R, F>(
    backend: Option<&str>,
    options: &BackendOptions,
    f: F,
) -> Result<R, ProgressError>
where
    F: FnOnce(&mut ProgressScope) -> R,
{
    ProgressFacade::global().with_scoped_context(backend, options, f)
}

/// [`ProgressFacade::bar_callback`] on the global facade
pub fn bar_callback(
    backend: Option<&str>,
    options: &BackendOptions,
) -> Result<Option<Box<dyn TrainingCallback>>, ProgressError> {
    ProgressFacade::global().bar_callback(backend, options)
}
