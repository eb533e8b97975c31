//! Capture log records emitted on the current thread
//!
//! A single capturing logger is installed process-wide on first use. Records
//! are collected per thread, so parallel tests do not see each other's
//! output.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::sync::Once;

/// A log record as seen by [`capture_logs`]
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
}

thread_local! {
    static CAPTURED: RefCell<Option<Vec<CapturedRecord>>> = const { RefCell::new(None) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        CAPTURED.with(|captured| {
            if let Some(records) = captured.borrow_mut().as_mut() {
                records.push(CapturedRecord {
                    level: record.level(),
                    target: record.target().to_string(),
                    message: record.args().to_string(),
                });
            }
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

fn install() {
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
}

/// Run `f` and return its result with every record it logged
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedRecord>) {
    install();
    CAPTURED.with(|captured| *captured.borrow_mut() = Some(Vec::new()));
    let result = f();
    let records = CAPTURED
        .with(|captured| captured.borrow_mut().take())
        .unwrap_or_default();
    (result, records)
}

/// Messages of the warning records in `records`
pub fn warnings(records: &[CapturedRecord]) -> Vec<&str> {
    records
        .iter()
        .filter(|record| record.level == Level::Warn)
        .map(|record| record.message.as_str())
        .collect()
}
