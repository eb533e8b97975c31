//! Plain text progress backend
//!
//! Writes one line per reporting step instead of redrawing the terminal, so
//! it works in logs, CI output and pipes. Always compiled in.

use crate::callbacks::{EpochMetrics, TrainingCallback};
use crate::error::ProgressError;
use crate::progress::backend::{
    BackendKind, Capabilities, IterationSink, ProgressBackend, TrackSpec,
};
use crate::progress::options::BackendOptions;
use crate::progress::utils::{format_elapsed, format_rate, percent};
use serde::Deserialize;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Writer shared between a backend and the sinks it creates
pub type SharedWriter = Arc<Mutex<dyn Write + Send>>;

const DEFAULT_DESCRIPTION: &str = "Progress";
const DEFAULT_PERCENT_STEP: u8 = 10;
const UNBOUNDED_STEP: u64 = 100;

/// Options understood by the simple backend
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimpleOptions {
    /// Report every `every` items
    pub every: Option<u64>,
    /// Report every `percent_step`% of a known total
    pub percent_step: Option<u8>,
}

impl SimpleOptions {
    fn step(&self, total: Option<u64>) -> Result<u64, ProgressError> {
        if let Some(every) = self.every {
            if every == 0 {
                return Err(ProgressError::backend(
                    BackendKind::Simple,
                    "'every' must be at least 1",
                ));
            }
            return Ok(every);
        }

        let percent_step = self.percent_step.unwrap_or(DEFAULT_PERCENT_STEP);
        if percent_step == 0 || percent_step > 100 {
            return Err(ProgressError::backend(
                BackendKind::Simple,
                format!("'percent_step' must be between 1 and 100, got {percent_step}"),
            ));
        }

        // Widened so huge totals cannot overflow; the result never exceeds `total`
        Ok(match total {
            Some(total) if total > 0 => {
                let step = u128::from(total) * u128::from(percent_step) / 100;
                u64::try_from(step).unwrap_or(total).max(1)
            }
            _ => UNBOUNDED_STEP,
        })
    }
}

/// Text-line backend
pub struct SimpleBackend {
    writer: SharedWriter,
}

impl SimpleBackend {
    /// Backend writing to stderr
    pub fn stderr() -> Self {
        Self::with_writer(Arc::new(Mutex::new(std::io::stderr())))
    }

    /// Backend writing to a custom writer
    pub fn with_writer(writer: SharedWriter) -> Self {
        Self { writer }
    }
}

impl ProgressBackend for SimpleBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Simple
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new(true, false, true)
    }

    fn iteration_sink(&self, spec: &TrackSpec) -> Result<Box<dyn IterationSink>, ProgressError> {
        let options: SimpleOptions = spec.options.parse(BackendKind::Simple)?;
        let step = options.step(spec.total)?;

        Ok(Box::new(SimpleSink {
            writer: Arc::clone(&self.writer),
            description: spec
                .description
                .clone()
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            total: spec.total,
            position: 0,
            step,
            next_report: step,
            started: Instant::now(),
        }))
    }

    fn bar_callback(
        &self,
        options: &BackendOptions,
    ) -> Result<Box<dyn TrainingCallback>, ProgressError> {
        // Reject malformed payloads here too
        let _: SimpleOptions = options.parse(BackendKind::Simple)?;

        Ok(Box::new(SimpleBarCallback {
            writer: Arc::clone(&self.writer),
            max_epochs: 0,
            batches: 0,
            last_loss: None,
            fit_started: Instant::now(),
            epoch_started: Instant::now(),
        }))
    }
}

fn write_line(writer: &SharedWriter, line: &str) {
    if let Ok(mut out) = writer.lock() {
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

struct SimpleSink {
    writer: SharedWriter,
    description: String,
    total: Option<u64>,
    position: u64,
    step: u64,
    next_report: u64,
    started: Instant,
}

impl SimpleSink {
    fn position_text(&self) -> String {
        match self.total {
            Some(total) => format!(
                "{}/{} ({}%)",
                self.position,
                total,
                percent(self.position, total)
            ),
            None => format!("{} items", self.position),
        }
    }
}

impl IterationSink for SimpleSink {
    fn advance(&mut self, n: u64) {
        let before = self.position;
        self.position = self.position.saturating_add(n);
        if self.position > before && self.position >= self.next_report {
            // Next multiple of `step` past the position, covering large advances
            self.next_report = (self.position / self.step)
                .saturating_add(1)
                .saturating_mul(self.step);
            let line = format!("{}: {}", self.description, self.position_text());
            write_line(&self.writer, &line);
        }
    }

    fn finish(&mut self) {
        let elapsed = self.started.elapsed();
        let line = format!(
            "{}: done, {} items in {} ({})",
            self.description,
            self.position,
            format_elapsed(elapsed),
            format_rate(self.position, elapsed)
        );
        write_line(&self.writer, &line);
    }

    fn abandon(&mut self) {
        let line = format!(
            "{}: stopped at {}",
            self.description,
            self.position_text()
        );
        write_line(&self.writer, &line);
    }
}

struct SimpleBarCallback {
    writer: SharedWriter,
    max_epochs: usize,
    batches: u64,
    last_loss: Option<f64>,
    fit_started: Instant,
    epoch_started: Instant,
}

impl TrainingCallback for SimpleBarCallback {
    fn name(&self) -> &str {
        "simple-progress"
    }

    fn on_fit_start(&mut self, max_epochs: usize) {
        self.max_epochs = max_epochs;
        self.fit_started = Instant::now();
        write_line(&self.writer, &format!("Training for {max_epochs} epochs"));
    }

    fn on_epoch_start(&mut self, _epoch: usize, _num_batches: Option<u64>) {
        self.batches = 0;
        self.last_loss = None;
        self.epoch_started = Instant::now();
    }

    fn on_batch_end(&mut self, _epoch: usize, _batch: u64, loss: Option<f64>) {
        self.batches += 1;
        if loss.is_some() {
            self.last_loss = loss;
        }
    }

    fn on_epoch_end(&mut self, epoch: usize, metrics: &EpochMetrics) {
        let mut parts = vec![
            format!("Epoch {}/{}", epoch + 1, self.max_epochs),
            format!("{} batches", self.batches),
        ];

        if metrics.is_empty() {
            if let Some(loss) = self.last_loss {
                parts.push(format!("loss: {loss:.4}"));
            }
        } else {
            parts.extend(
                metrics
                    .iter()
                    .map(|(name, value)| format!("{name}: {value:.4}")),
            );
        }

        parts.push(format_elapsed(self.epoch_started.elapsed()));
        write_line(&self.writer, &parts.join(" - "));
    }

    fn on_fit_end(&mut self) {
        write_line(
            &self.writer,
            &format!(
                "Training finished in {}",
                format_elapsed(self.fit_started.elapsed())
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend() -> (SimpleBackend, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer: SharedWriter = buffer.clone();
        (SimpleBackend::with_writer(writer), buffer)
    }

    fn lines(buffer: &Arc<Mutex<Vec<u8>>>) -> Vec<String> {
        String::from_utf8(buffer.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_reports_every_ten_percent_of_total() {
        let (backend, buffer) = backend();
        let spec = TrackSpec::new().description("Fitting").total(20);
        let mut sink = backend.iteration_sink(&spec).unwrap();

        for _ in 0..20 {
            sink.advance(1);
        }
        sink.finish();

        let lines = lines(&buffer);
        // 10 step lines plus the final line
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "Fitting: 2/20 (10%)");
        assert_eq!(lines[9], "Fitting: 20/20 (100%)");
        assert!(lines[10].starts_with("Fitting: done, 20 items in "));
    }

    #[test]
    fn test_every_option_overrides_percent() {
        let (backend, buffer) = backend();
        let spec = TrackSpec::new()
            .total(10)
            .options(json!({ "every": 5 }));
        let mut sink = backend.iteration_sink(&spec).unwrap();
        for _ in 0..10 {
            sink.advance(1);
        }

        assert_eq!(
            lines(&buffer),
            vec!["Progress: 5/10 (50%)", "Progress: 10/10 (100%)"]
        );
    }

    #[test]
    fn test_unknown_total_uses_item_count() {
        let (backend, buffer) = backend();
        let spec = TrackSpec::new().options(json!({ "every": 2 }));
        let mut sink = backend.iteration_sink(&spec).unwrap();
        sink.advance(3);
        sink.abandon();

        assert_eq!(
            lines(&buffer),
            vec!["Progress: 3 items", "Progress: stopped at 3 items"]
        );
    }

    #[test]
    fn test_invalid_options() {
        let (backend, _) = backend();

        let zero = TrackSpec::new().options(json!({ "every": 0 }));
        assert!(matches!(
            backend.iteration_sink(&zero),
            Err(ProgressError::Backend { .. })
        ));

        let step = TrackSpec::new().options(json!({ "percent_step": 150 }));
        assert!(matches!(
            backend.iteration_sink(&step),
            Err(ProgressError::Backend { .. })
        ));

        let unknown = TrackSpec::new().options(json!({ "colour": "red" }));
        assert!(matches!(
            backend.iteration_sink(&unknown),
            Err(ProgressError::InvalidOptions { .. })
        ));
    }

    #[test]
    fn test_huge_total_does_not_overflow() {
        let (backend, buffer) = backend();
        let spec = TrackSpec::new().total(u64::MAX);
        let mut sink = backend.iteration_sink(&spec).unwrap();

        sink.advance(3);
        sink.advance(u64::MAX);
        sink.advance(1);
        sink.abandon();

        let lines = lines(&buffer);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("Progress: {0}/{0} (100%)", u64::MAX));
        assert!(lines[1].starts_with("Progress: stopped at "));
    }

    #[test]
    fn test_step_for_huge_totals() {
        let options = SimpleOptions::default();
        assert_eq!(options.step(Some(u64::MAX)).unwrap(), u64::MAX / 10);
        assert_eq!(options.step(Some(u64::MAX / 4)).unwrap(), u64::MAX / 40);
        assert_eq!(options.step(Some(3)).unwrap(), 1);
        assert_eq!(options.step(Some(20)).unwrap(), 2);
    }

    #[test]
    fn test_no_task_support() {
        let (backend, _) = backend();
        assert!(matches!(
            backend.task_context(&BackendOptions::new()),
            Err(ProgressError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_bar_callback_writes_epoch_lines() {
        let (backend, buffer) = backend();
        let mut callback = backend.bar_callback(&BackendOptions::new()).unwrap();
        assert_eq!(callback.name(), "simple-progress");

        callback.on_fit_start(2);
        callback.on_epoch_start(0, Some(3));
        for batch in 0..3 {
            callback.on_batch_end(0, batch, Some(0.5));
        }
        callback.on_epoch_end(0, &EpochMetrics::new());
        callback.on_fit_end();

        let lines = lines(&buffer);
        assert_eq!(lines[0], "Training for 2 epochs");
        assert!(lines[1].starts_with("Epoch 1/2 - 3 batches - loss: 0.5000 - "));
        assert!(lines[2].starts_with("Training finished in "));
    }
}
