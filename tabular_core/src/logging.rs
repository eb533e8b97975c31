//! Logger setup for the library and its tools
//!
//! Records go to stderr as
//! `2024-05-01 12:00:00,123 - {tabular_core::progress::facade:71} - WARN - message`.
//! The level comes from `TABULAR_LOGLEVEL` (default `INFO`) unless an explicit
//! level is passed.

use chrono::{DateTime, Local};
use log::{Level, LevelFilter};
use std::io::Write;

/// Environment variable holding the log level
pub const LOG_LEVEL_ENV: &str = "TABULAR_LOGLEVEL";

const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

/// Resolve a level name, falling back to `INFO`
///
/// Accepts the `log` level names case-insensitively, plus the Python-style
/// `WARNING` and `CRITICAL` spellings.
pub fn resolve_level(value: Option<&str>) -> LevelFilter {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return DEFAULT_LEVEL;
    };

    match value.to_ascii_uppercase().as_str() {
        "WARNING" => LevelFilter::Warn,
        "CRITICAL" | "FATAL" => LevelFilter::Error,
        "NOTSET" => LevelFilter::Trace,
        other => other.parse().unwrap_or(DEFAULT_LEVEL),
    }
}

/// Level configured through [`LOG_LEVEL_ENV`]
pub fn level_from_env() -> LevelFilter {
    resolve_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref())
}

/// Render a single log line
pub fn render_line(
    timestamp: DateTime<Local>,
    target: &str,
    line: Option<u32>,
    level: Level,
    message: &str,
) -> String {
    let line = line.map(|l| l.to_string()).unwrap_or_else(|| "?".to_string());
    format!(
        "{} - {{{target}:{line}}} - {level} - {message}",
        timestamp.format("%Y-%m-%d %H:%M:%S,%3f")
    )
}

/// Install the stderr logger
///
/// `level` overrides the environment. Returns `false` when a logger was
/// already installed, in which case nothing changes.
pub fn init_logging(level: Option<LevelFilter>) -> bool {
    let level = level.unwrap_or_else(level_from_env);

    env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            let line = render_line(
                Local::now(),
                record.target(),
                record.line(),
                record.level(),
                &record.args().to_string(),
            );
            writeln!(buf, "{line}")
        })
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_resolve_level_default() {
        assert_eq!(resolve_level(None), LevelFilter::Info);
        assert_eq!(resolve_level(Some("")), LevelFilter::Info);
        assert_eq!(resolve_level(Some("verbose-ish")), LevelFilter::Info);
    }

    #[test]
    fn test_resolve_level_names() {
        assert_eq!(resolve_level(Some("DEBUG")), LevelFilter::Debug);
        assert_eq!(resolve_level(Some("debug")), LevelFilter::Debug);
        assert_eq!(resolve_level(Some(" warn ")), LevelFilter::Warn);
        assert_eq!(resolve_level(Some("WARNING")), LevelFilter::Warn);
        assert_eq!(resolve_level(Some("CRITICAL")), LevelFilter::Error);
        assert_eq!(resolve_level(Some("off")), LevelFilter::Off);
    }

    #[test]
    fn test_render_line_format() {
        let timestamp = Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap();
        let line = render_line(
            timestamp,
            "tabular_core::progress",
            Some(42),
            Level::Warn,
            "falling back",
        );
        assert_eq!(
            line,
            "2024-05-01 12:30:45,000 - {tabular_core::progress:42} - WARN - falling back"
        );
    }

    #[test]
    fn test_render_line_without_line_number() {
        let timestamp = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let line = render_line(timestamp, "app", None, Level::Info, "hi");
        assert!(line.ends_with("- {app:?} - INFO - hi"));
    }
}
