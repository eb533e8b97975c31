//! Formatting helpers shared by the text-based backends

use std::time::Duration;

/// Format duration as human-readable string
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{seconds}s")
    } else if seconds < 3600 {
        let minutes = seconds / 60;
        let remaining_seconds = seconds % 60;
        if remaining_seconds > 0 {
            format!("{minutes}m {remaining_seconds}s")
        } else {
            format!("{minutes}m")
        }
    } else {
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        if minutes > 0 {
            format!("{hours}h {minutes}m")
        } else {
            format!("{hours}h")
        }
    }
}

/// Format an elapsed [`Duration`], keeping sub-second precision for short runs
pub fn format_elapsed(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{:.2}s", elapsed.as_secs_f64())
    } else {
        format_duration(elapsed.as_secs())
    }
}

/// Format an item rate as `<n> it/s` or `<n> s/it` for slow loops
pub fn format_rate(items: u64, elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if items == 0 || secs <= 0.0 {
        return "? it/s".to_string();
    }

    let rate = items as f64 / secs;
    if rate >= 1.0 {
        format!("{rate:.1} it/s")
    } else {
        format!("{:.1} s/it", 1.0 / rate)
    }
}

/// Percentage of `position` over `total`, clamped to 100
pub fn percent(position: u64, total: u64) -> u64 {
    if total == 0 {
        return 100;
    }
    let percent = (u128::from(position) * 100 / u128::from(total)).min(100);
    percent as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(30), "30s");
        assert_eq!(format_duration(60), "1m");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(3600), "1h");
        assert_eq!(format_duration(3660), "1h 1m");
        assert_eq!(format_duration(7200), "2h");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(250)), "0.25s");
        assert_eq!(format_elapsed(Duration::from_secs(75)), "1m 15s");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0, Duration::from_secs(1)), "? it/s");
        assert_eq!(format_rate(10, Duration::ZERO), "? it/s");
        assert_eq!(format_rate(30, Duration::from_secs(2)), "15.0 it/s");
        assert_eq!(format_rate(1, Duration::from_secs(4)), "4.0 s/it");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 10), 0);
        assert_eq!(percent(5, 10), 50);
        assert_eq!(percent(12, 10), 100);
        assert_eq!(percent(3, 0), 100);
        assert_eq!(percent(u64::MAX / 2, u64::MAX), 49);
    }
}
