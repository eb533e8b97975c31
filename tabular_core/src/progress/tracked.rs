//! Iterator wrapping
//!
//! [`Tracked`] yields exactly the items of the wrapped iterator, in order.
//! With no sink attached it is a plain pass-through.

use crate::error::ProgressError;
use crate::progress::backend::{IterationSink, ProgressBackend, TrackSpec};
use std::fmt;
use std::sync::Arc;

/// Iterator that reports consumption to a progress backend
pub struct Tracked<I> {
    inner: I,
    sink: Option<Box<dyn IterationSink>>,
    finished: bool,
}

impl<I: Iterator> Tracked<I> {
    /// Wrap without tracking
    pub fn passthrough(inner: I) -> Self {
        Self {
            inner,
            sink: None,
            finished: false,
        }
    }

    /// Wrap with a backend sink
    pub fn with_sink(inner: I, sink: Box<dyn IterationSink>) -> Self {
        Self {
            inner,
            sink: Some(sink),
            finished: false,
        }
    }

    /// Whether a backend is receiving progress
    pub fn is_tracking(&self) -> bool {
        self.sink.is_some()
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        if let Some(sink) = self.sink.as_mut() {
            sink.finish();
        }
    }
}

impl<I: Iterator> Iterator for Tracked<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next() {
            Some(item) => {
                if let Some(sink) = self.sink.as_mut() {
                    sink.advance(1);
                }
                Some(item)
            }
            None => {
                self.finish();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I> Drop for Tracked<I> {
    fn drop(&mut self) {
        if !self.finished
            && let Some(sink) = self.sink.as_mut()
        {
            self.finished = true;
            sink.abandon();
        }
    }
}

impl<I> fmt::Debug for Tracked<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("tracking", &self.sink.is_some())
            .field("finished", &self.finished)
            .finish()
    }
}

/// A resolved backend waiting for iterables to wrap
///
/// Resolution (and any fallback warning) happened when the tracker was
/// created; every [`wrap`](Self::wrap) call builds an independent iterator.
#[derive(Clone)]
pub struct Tracker {
    backend: Option<Arc<dyn ProgressBackend>>,
    spec: TrackSpec,
}

impl Tracker {
    pub(crate) fn new(backend: Option<Arc<dyn ProgressBackend>>, spec: TrackSpec) -> Self {
        Self { backend, spec }
    }

    /// Tracker that never reports anything
    pub fn noop() -> Self {
        Self::new(None, TrackSpec::default())
    }

    /// Whether wrapped iterators will report to a backend
    pub fn is_tracking(&self) -> bool {
        self.backend.is_some()
    }

    /// Wrap an iterable
    ///
    /// When the spec carries no total, an exact `size_hint` is used instead.
    pub fn wrap<T>(&self, iterable: T) -> Result<Tracked<T::IntoIter>, ProgressError>
    where
        T: IntoIterator,
    {
        let iter = iterable.into_iter();

        let Some(backend) = self.backend.as_ref() else {
            return Ok(Tracked::passthrough(iter));
        };

        let mut spec = self.spec.clone();
        if spec.total.is_none() {
            let (lower, upper) = iter.size_hint();
            if upper == Some(lower) {
                spec.total = Some(lower as u64);
            }
        }

        let sink = backend.iteration_sink(&spec)?;
        Ok(Tracked::with_sink(iter, sink))
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("backend", &self.backend.as_ref().map(|b| b.kind()))
            .field("description", &self.spec.description)
            .field("total", &self.spec.total)
            .finish()
    }
}
