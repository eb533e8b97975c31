//! tqdm-style terminal progress backend
//!
//! A single `indicatif` bar laid out like tqdm:
//! `desc:  42%|█████     | 42/100 it [00:01<00:02, 30.1/s]`.
//! Only wraps iterators; no task contexts, no training callback.

use crate::error::ProgressError;
use crate::progress::backend::{
    BackendKind, Capabilities, IterationSink, ProgressBackend, TrackSpec,
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Deserialize;

const BOUNDED_TEMPLATE: &str =
    "{msg}{percent:>3}%|{wide_bar}| {pos}/{len} {prefix} [{elapsed}<{eta}, {per_sec}]";
const UNBOUNDED_TEMPLATE: &str = "{msg}{pos} {prefix} [{elapsed}, {per_sec}]";
const UNICODE_CHARS: &str = "█▉▊▋▌▍▎▏ ";
const ASCII_CHARS: &str = "#9876543210 ";

/// Options understood by the tqdm backend
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TqdmOptions {
    /// Unit name shown after counts
    pub unit: String,
    /// Use ASCII fill characters
    pub ascii: bool,
    /// Keep the finished bar on screen
    pub leave: bool,
    /// Draw nothing
    pub disable: bool,
}

impl Default for TqdmOptions {
    fn default() -> Self {
        Self {
            unit: "it".to_string(),
            ascii: false,
            leave: true,
            disable: false,
        }
    }
}

/// Single-bar `indicatif` backend
pub struct TqdmBackend;

impl TqdmBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TqdmBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressBackend for TqdmBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Tqdm
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new(true, false, false)
    }

    fn iteration_sink(&self, spec: &TrackSpec) -> Result<Box<dyn IterationSink>, ProgressError> {
        let options: TqdmOptions = spec.options.parse(BackendKind::Tqdm)?;

        let template = if spec.total.is_some() {
            BOUNDED_TEMPLATE
        } else {
            UNBOUNDED_TEMPLATE
        };
        let chars = if options.ascii {
            ASCII_CHARS
        } else {
            UNICODE_CHARS
        };
        let style = ProgressStyle::with_template(template)
            .map_err(|e| ProgressError::backend(BackendKind::Tqdm, format!("invalid template: {e}")))?
            .progress_chars(chars);

        let target = if options.disable {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        };
        let bar = ProgressBar::with_draw_target(spec.total, target).with_style(style);
        bar.set_prefix(options.unit.clone());
        if let Some(description) = &spec.description {
            bar.set_message(format!("{description}: "));
        }

        Ok(Box::new(TqdmSink {
            bar,
            leave: options.leave,
        }))
    }
}

struct TqdmSink {
    bar: ProgressBar,
    leave: bool,
}

impl IterationSink for TqdmSink {
    fn advance(&mut self, n: u64) {
        self.bar.inc(n);
    }

    fn finish(&mut self) {
        if self.leave {
            self.bar.finish();
        } else {
            self.bar.finish_and_clear();
        }
    }

    fn abandon(&mut self) {
        if self.leave {
            self.bar.abandon();
        } else {
            self.bar.finish_and_clear();
        }
    }
}
