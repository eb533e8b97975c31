//! Styled terminal progress backend
//!
//! Built on `indicatif`. Supports wrapped iterators, manual task contexts
//! (one bar per task under a shared `MultiProgress`) and an epoch/batch
//! training callback.

use crate::callbacks::{EpochMetrics, TrainingCallback};
use crate::error::ProgressError;
use crate::progress::backend::{
    BackendKind, Capabilities, IterationSink, ProgressBackend, TaskContext, TaskId, TrackSpec,
};
use crate::progress::options::BackendOptions;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Deserialize;
use std::time::Duration;

const BOUNDED_TEMPLATE: &str = "{spinner:.green} {msg:.bold} [{bar:40.cyan/blue}] {pos}/{len} {percent:>3}% • {elapsed_precise} • ETA {eta}";
const UNBOUNDED_TEMPLATE: &str = "{spinner:.green} {msg:.bold} {pos} • {elapsed_precise} • {per_sec}";
const PROGRESS_CHARS: &str = "━╸─";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ";

/// Options understood by the rich backend
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RichOptions {
    /// Custom `indicatif` template for bounded bars
    pub template: Option<String>,
    /// Bar fill characters, at least two
    pub progress_chars: Option<String>,
    /// Draw nothing
    pub hidden: bool,
    /// Keep finished bars on screen
    pub leave: bool,
    /// Redraw interval for spinners
    pub refresh_ms: Option<u64>,
}

impl Default for RichOptions {
    fn default() -> Self {
        Self {
            template: None,
            progress_chars: None,
            hidden: false,
            leave: true,
            refresh_ms: None,
        }
    }
}

/// Validated styles and display settings
#[derive(Clone)]
struct RichStyles {
    bounded: ProgressStyle,
    unbounded: ProgressStyle,
    hidden: bool,
    leave: bool,
    refresh: Option<Duration>,
}

impl RichStyles {
    fn from_options(options: &BackendOptions) -> Result<Self, ProgressError> {
        let options: RichOptions = options.parse(BackendKind::Rich)?;

        let chars = options.progress_chars.as_deref().unwrap_or(PROGRESS_CHARS);
        if chars.chars().count() < 2 {
            return Err(ProgressError::backend(
                BackendKind::Rich,
                "'progress_chars' needs at least two characters",
            ));
        }

        let bounded = style(options.template.as_deref().unwrap_or(BOUNDED_TEMPLATE))?
            .progress_chars(chars);
        let unbounded = style(UNBOUNDED_TEMPLATE)?;

        Ok(Self {
            bounded,
            unbounded,
            hidden: options.hidden,
            leave: options.leave,
            refresh: options
                .refresh_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
        })
    }

    fn draw_target(&self) -> ProgressDrawTarget {
        if self.hidden {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        }
    }

    /// Styled, unattached bar
    fn bar(&self, total: Option<u64>, message: &str) -> ProgressBar {
        // Target is set at construction so a hidden bar never draws
        let style = match total {
            Some(_) => self.bounded.clone(),
            None => self.unbounded.clone(),
        };
        let bar = ProgressBar::with_draw_target(total, self.draw_target()).with_style(style);
        bar.set_message(message.to_string());
        bar
    }

    fn start(&self, bar: &ProgressBar) {
        if let Some(refresh) = self.refresh {
            bar.enable_steady_tick(refresh);
        }
    }

    fn close(&self, bar: &ProgressBar) {
        if self.leave {
            bar.finish();
        } else {
            bar.finish_and_clear();
        }
    }
}

fn style(template: &str) -> Result<ProgressStyle, ProgressError> {
    ProgressStyle::with_template(template)
        .map(|style| style.tick_chars(SPINNER_CHARS))
        .map_err(|e| ProgressError::backend(BackendKind::Rich, format!("invalid template: {e}")))
}

/// `indicatif` backend with manual task support
pub struct RichBackend;

impl RichBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RichBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressBackend for RichBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Rich
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new(true, true, true)
    }

    fn iteration_sink(&self, spec: &TrackSpec) -> Result<Box<dyn IterationSink>, ProgressError> {
        let styles = RichStyles::from_options(&spec.options)?;
        let bar = styles.bar(spec.total, spec.description.as_deref().unwrap_or_default());
        styles.start(&bar);

        Ok(Box::new(RichSink { bar, styles }))
    }

    fn task_context(&self, options: &BackendOptions) -> Result<Box<dyn TaskContext>, ProgressError> {
        let styles = RichStyles::from_options(options)?;
        let multi = MultiProgress::with_draw_target(styles.draw_target());

        Ok(Box::new(RichTaskContext {
            multi,
            bars: Vec::new(),
            styles,
        }))
    }

    fn bar_callback(
        &self,
        options: &BackendOptions,
    ) -> Result<Box<dyn TrainingCallback>, ProgressError> {
        let styles = RichStyles::from_options(options)?;
        let multi = MultiProgress::with_draw_target(styles.draw_target());

        Ok(Box::new(RichBarCallback {
            multi,
            epoch_bar: None,
            batch_bar: None,
            styles,
        }))
    }
}

struct RichSink {
    bar: ProgressBar,
    styles: RichStyles,
}

impl IterationSink for RichSink {
    fn advance(&mut self, n: u64) {
        self.bar.inc(n);
    }

    fn finish(&mut self) {
        self.styles.close(&self.bar);
    }

    fn abandon(&mut self) {
        if self.styles.leave {
            self.bar.abandon();
        } else {
            self.bar.finish_and_clear();
        }
    }
}

struct RichTaskContext {
    multi: MultiProgress,
    bars: Vec<ProgressBar>,
    styles: RichStyles,
}

impl TaskContext for RichTaskContext {
    fn add_task(&mut self, description: &str, total: Option<u64>) -> TaskId {
        let bar = self.multi.add(self.styles.bar(total, description));
        self.styles.start(&bar);
        self.bars.push(bar);
        TaskId::new(self.bars.len() - 1)
    }

    fn update(&mut self, task: TaskId, advance: u64) {
        match task.index().and_then(|index| self.bars.get(index)) {
            Some(bar) => bar.inc(advance),
            None => log::debug!("Ignoring update for unknown task {task:?}"),
        }
    }

    fn release(&mut self) {
        for bar in self.bars.drain(..) {
            self.styles.close(&bar);
        }
        if !self.styles.leave {
            let _ = self.multi.clear();
        }
    }
}

struct RichBarCallback {
    multi: MultiProgress,
    epoch_bar: Option<ProgressBar>,
    batch_bar: Option<ProgressBar>,
    styles: RichStyles,
}

impl RichBarCallback {
    fn release(&mut self) {
        if let Some(bar) = self.batch_bar.take() {
            bar.finish_and_clear();
        }
        if let Some(bar) = self.epoch_bar.take() {
            self.styles.close(&bar);
        }
    }
}

impl TrainingCallback for RichBarCallback {
    fn name(&self) -> &str {
        "rich-progress"
    }

    fn on_fit_start(&mut self, max_epochs: usize) {
        self.release();
        let bar = self
            .multi
            .add(self.styles.bar(Some(max_epochs as u64), "Epochs"));
        self.styles.start(&bar);
        self.epoch_bar = Some(bar);
    }

    fn on_epoch_start(&mut self, epoch: usize, num_batches: Option<u64>) {
        if let Some(bar) = self.batch_bar.take() {
            bar.finish_and_clear();
        }
        let bar = self
            .multi
            .add(self.styles.bar(num_batches, &format!("Epoch {}", epoch + 1)));
        self.styles.start(&bar);
        self.batch_bar = Some(bar);
    }

    fn on_batch_end(&mut self, epoch: usize, _batch: u64, loss: Option<f64>) {
        if let Some(bar) = &self.batch_bar {
            bar.inc(1);
            if let Some(loss) = loss {
                bar.set_message(format!("Epoch {} loss {loss:.4}", epoch + 1));
            }
        }
    }

    fn on_epoch_end(&mut self, _epoch: usize, metrics: &EpochMetrics) {
        if let Some(bar) = &self.epoch_bar {
            bar.inc(1);
            if !metrics.is_empty() {
                let summary: Vec<String> = metrics
                    .iter()
                    .map(|(name, value)| format!("{name} {value:.4}"))
                    .collect();
                bar.set_message(format!("Epochs ({})", summary.join(", ")));
            }
        }
    }

    fn on_fit_end(&mut self) {
        self.release();
    }
}

impl Drop for RichBarCallback {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hidden() -> BackendOptions {
        BackendOptions::from(json!({ "hidden": true }))
    }

    #[test]
    fn test_iteration_sink_advances_bar() {
        let backend = RichBackend::new();
        let spec = TrackSpec::new()
            .description("Predicting")
            .total(4)
            .options(json!({ "hidden": true, "leave": false }));
        let mut sink = backend.iteration_sink(&spec).unwrap();
        for _ in 0..4 {
            sink.advance(1);
        }
        sink.finish();
    }

    #[test]
    fn test_hidden_bars_are_hidden_from_creation() {
        let styles = RichStyles::from_options(&hidden()).unwrap();

        let bounded = styles.bar(Some(3), "bounded");
        assert!(bounded.is_hidden());
        assert_eq!(bounded.length(), Some(3));

        let unbounded = styles.bar(None, "unbounded");
        assert!(unbounded.is_hidden());
        assert_eq!(unbounded.length(), None);
    }

    #[test]
    fn test_task_context_hands_out_sequential_ids() {
        let backend = RichBackend::new();
        let mut context = backend.task_context(&hidden()).unwrap();

        let first = context.add_task("load", Some(10));
        let second = context.add_task("fit", None);
        assert_eq!(first, TaskId::new(0));
        assert_eq!(second, TaskId::new(1));

        context.update(first, 5);
        context.update(second, 1);
        // Unknown and null ids are ignored
        context.update(TaskId::new(9), 1);
        context.update(TaskId::NULL, 1);
        context.release();
    }

    #[test]
    fn test_short_progress_chars_rejected() {
        let options = BackendOptions::from(json!({ "progress_chars": "#" }));
        assert!(matches!(
            RichBackend::new().task_context(&options),
            Err(ProgressError::Backend { .. })
        ));
    }

    #[test]
    fn test_malformed_options_are_invalid() {
        let options = BackendOptions::from(json!({ "hidden": "yes" }));
        assert!(matches!(
            RichBackend::new().task_context(&options),
            Err(ProgressError::InvalidOptions { .. })
        ));
    }

    #[test]
    fn test_bar_callback_runs_full_fit() {
        let mut callback = RichBackend::new().bar_callback(&hidden()).unwrap();
        assert_eq!(callback.name(), "rich-progress");

        callback.on_fit_start(2);
        for epoch in 0..2 {
            callback.on_epoch_start(epoch, Some(3));
            for batch in 0..3 {
                callback.on_batch_end(epoch, batch, Some(0.1));
            }
            let mut metrics = EpochMetrics::new();
            metrics.insert("val_loss".to_string(), 0.2);
            callback.on_epoch_end(epoch, &metrics);
        }
        callback.on_fit_end();
    }
}
