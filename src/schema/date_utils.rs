//! Module for handling date and timestamp parsing.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::config::DateFormatConfig;

const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Parse a date string with multiple format attempts
#[must_use]
pub fn parse_date_string(s: &str, config: &DateFormatConfig) -> Option<NaiveDate> {
    for format in &config.date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }

    if config.enable_format_detection {
        if let Some(detected_format) = detect_date_format(s) {
            if let Ok(date) = NaiveDate::parse_from_str(s, detected_format) {
                return Some(date);
            }
        }
    }

    None
}

/// Try to detect the date format based on string patterns
#[must_use]
pub fn detect_date_format(s: &str) -> Option<&'static str> {
    // YYYY-MM-DD
    if s.len() == 10 && s.chars().nth(4) == Some('-') && s.chars().nth(7) == Some('-') {
        return Some("%Y-%m-%d");
    }

    if s.contains('/') {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() == 3 {
            if parts[0].len() == 4 {
                return Some("%Y/%m/%d");
            } else if parts[2].len() == 4 {
                // Ambiguous day/month order defaults to European
                return Some("%d/%m/%Y");
            }
        }
    }

    if s.contains('.') {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() == 3 && parts[2].len() == 4 {
            return Some("%d.%m.%Y");
        }
    }

    if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
        return Some("%Y%m%d");
    }

    None
}

/// Parse a timestamp into nanoseconds since the Unix epoch.
///
/// Accepts RFC 3339, `%Y-%m-%d %H:%M:%S(.f)`, `%Y-%m-%dT%H:%M:%S(.f)`, or a bare
/// date (midnight). `None` outside the nanosecond range (years 1677 to 2262).
#[must_use]
pub fn parse_timestamp_nanos(s: &str, config: &DateFormatConfig) -> Option<i64> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return ts.timestamp_nanos_opt();
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return ts.and_utc().timestamp_nanos_opt();
        }
    }

    parse_date_string(s, config)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|ts| ts.and_utc().timestamp_nanos_opt())
}

/// Days since the Unix epoch, the Arrow `Date32` representation
#[must_use]
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Inverse of [`date_to_days`]
#[must_use]
pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}
