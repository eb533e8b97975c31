//! Recording progress backend

use std::sync::{Arc, Mutex};
use tabular_core::callbacks::{EpochMetrics, TrainingCallback};
use tabular_core::error::ProgressError;
use tabular_core::progress::{
    BackendKind, BackendOptions, Capabilities, IterationSink, ProgressBackend, TaskContext,
    TaskId, TrackSpec,
};

/// Something a [`RecordingBackend`] was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    IterationStarted {
        description: Option<String>,
        total: Option<u64>,
    },
    Advanced(u64),
    Finished,
    Abandoned,
    TaskAdded {
        description: String,
        total: Option<u64>,
    },
    TaskUpdated {
        task: TaskId,
        advance: u64,
    },
    ContextReleased,
    CallbackCreated,
    EpochEnded(usize),
}

type EventLog = Arc<Mutex<Vec<BackendEvent>>>;

fn record(events: &EventLog, event: BackendEvent) {
    if let Ok(mut events) = events.lock() {
        events.push(event);
    }
}

/// Backend that records every call instead of drawing anything
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    kind: BackendKind,
    capabilities: Capabilities,
    events: EventLog,
}

impl RecordingBackend {
    /// Recording backend registered as `kind` with every capability
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            capabilities: Capabilities::new(true, true, true),
            events: Arc::default(),
        }
    }

    /// Override the advertised capabilities
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Snapshot of recorded events
    pub fn events(&self) -> Vec<BackendEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of recorded events equal to `event`
    pub fn count(&self, event: &BackendEvent) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }
}

impl ProgressBackend for RecordingBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn iteration_sink(&self, spec: &TrackSpec) -> Result<Box<dyn IterationSink>, ProgressError> {
        record(
            &self.events,
            BackendEvent::IterationStarted {
                description: spec.description.clone(),
                total: spec.total,
            },
        );
        Ok(Box::new(RecordingSink {
            events: Arc::clone(&self.events),
        }))
    }

    fn task_context(&self, _options: &BackendOptions) -> Result<Box<dyn TaskContext>, ProgressError> {
        Ok(Box::new(RecordingContext {
            events: Arc::clone(&self.events),
            tasks: 0,
        }))
    }

    fn bar_callback(
        &self,
        _options: &BackendOptions,
    ) -> Result<Box<dyn TrainingCallback>, ProgressError> {
        record(&self.events, BackendEvent::CallbackCreated);
        Ok(Box::new(RecordingCallback {
            events: Arc::clone(&self.events),
        }))
    }
}

struct RecordingSink {
    events: EventLog,
}

impl IterationSink for RecordingSink {
    fn advance(&mut self, n: u64) {
        record(&self.events, BackendEvent::Advanced(n));
    }

    fn finish(&mut self) {
        record(&self.events, BackendEvent::Finished);
    }

    fn abandon(&mut self) {
        record(&self.events, BackendEvent::Abandoned);
    }
}

struct RecordingContext {
    events: EventLog,
    tasks: usize,
}

impl TaskContext for RecordingContext {
    fn add_task(&mut self, description: &str, total: Option<u64>) -> TaskId {
        record(
            &self.events,
            BackendEvent::TaskAdded {
                description: description.to_string(),
                total,
            },
        );
        self.tasks += 1;
        TaskId::new(self.tasks - 1)
    }

    fn update(&mut self, task: TaskId, advance: u64) {
        record(&self.events, BackendEvent::TaskUpdated { task, advance });
    }

    fn release(&mut self) {
        record(&self.events, BackendEvent::ContextReleased);
    }
}

struct RecordingCallback {
    events: EventLog,
}

impl TrainingCallback for RecordingCallback {
    fn name(&self) -> &str {
        "recording-progress"
    }

    fn on_epoch_end(&mut self, epoch: usize, _metrics: &EpochMetrics) {
        record(&self.events, BackendEvent::EpochEnded(epoch));
    }
}
