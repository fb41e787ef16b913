//! Human-friendly rendering of note timestamps.

use chrono::DateTime;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Describes how long ago `timestamp` was relative to `now` (both Unix
/// milliseconds), e.g. `"5 minutes ago"`.
///
/// Months are 30 days and years 365. Timestamps in the future read as "just now".
pub fn time_ago(timestamp: i64, now: i64) -> String {
    let seconds = now.saturating_sub(timestamp).max(0) / 1000;
    let days = seconds / DAY;

    let (count, unit) = if seconds < MINUTE {
        return "just now".to_string();
    } else if seconds < HOUR {
        (seconds / MINUTE, "minute")
    } else if seconds < DAY {
        (seconds / HOUR, "hour")
    } else if days < 30 {
        (days, "day")
    } else if days / 30 < 12 {
        (days / 30, "month")
    } else {
        ((days / 365).max(1), "year")
    };

    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Formats Unix milliseconds as `"dd Mon yyyy, HH:MM"` in UTC.
pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp_millis(timestamp)
        .map(|dt| dt.format("%d %b %Y, %H:%M").to_string())
        .unwrap_or_default()
}
