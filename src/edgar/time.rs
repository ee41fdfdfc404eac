//! EDGAR timestamps
//!
//! Logs carry separate `date` and `time` columns. Both are read as UTC and
//! collapsed into epoch seconds; output uses the same wall-clock layout.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use super::error::{LogError, LogResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a `date` / `time` column pair into epoch seconds
pub fn parse_timestamp(date: &str, time: &str) -> LogResult<i64> {
    let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).map_err(|e| {
        LogError::InvalidTimestamp {
            value: date.to_string(),
            reason: e.to_string(),
        }
    })?;
    let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT).map_err(|e| {
        LogError::InvalidTimestamp {
            value: time.to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(NaiveDateTime::new(date, time).and_utc().timestamp())
}

/// Format epoch seconds as `YYYY-MM-DD HH:MM:SS`.
///
/// Values outside chrono's range fall back to the raw number.
pub fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| secs.to_string())
}
