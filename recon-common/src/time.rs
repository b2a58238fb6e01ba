//! Timestamp utilities

use chrono::{DateTime, Local};

/// Current local timestamp
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// `2024-03-01 14:05:09`, used in run log lines
pub fn log_timestamp(ts: &DateTime<Local>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// `20240301_140509`, used inside generated file names
pub fn file_stamp(ts: &DateTime<Local>) -> String {
    ts.format("%Y%m%d_%H%M%S").to_string()
}

/// `2024-03-01_140509`, used for per-run log file names
pub fn run_stamp(ts: &DateTime<Local>) -> String {
    ts.format("%Y-%m-%d_%H%M%S").to_string()
}

/// Convert seconds to duration
pub fn secs_to_duration(secs: u64) -> std::time::Duration {
    std::time::Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    fn fixed() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 14, 5, 9).unwrap()
    }

    #[test]
    fn test_now_returns_recent_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
        assert!(timestamp.timestamp() < 4_102_444_800); // 2100-01-01 00:00:00 UTC
    }

    #[test]
    fn test_log_timestamp_format() {
        assert_eq!(log_timestamp(&fixed()), "2024-03-01 14:05:09");
    }

    #[test]
    fn test_file_stamp_format() {
        assert_eq!(file_stamp(&fixed()), "20240301_140509");
        assert_eq!(run_stamp(&fixed()), "2024-03-01_140509");
    }

    #[test]
    fn test_secs_to_duration() {
        assert_eq!(secs_to_duration(0), Duration::ZERO);
        assert_eq!(secs_to_duration(600), Duration::from_secs(600));
    }
}
