// src/utils.rs
use chrono::{DateTime, Utc};

/// Split newline-delimited text into trimmed, non-empty entries
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whole days elapsed between `then` and `now`; never negative
pub fn days_between(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_days().max(0)
}

/// Relative label shown next to posting and application dates
pub fn days_ago_label(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match days_between(then, now) {
        0 => "Today".to_string(),
        1 => "1 day ago".to_string(),
        n => format!("{} days ago", n),
    }
}

/// Label for an optional timestamp; documents without one read as unknown
pub fn optional_days_ago_label(then: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    then.map(|t| days_ago_label(t, now))
        .unwrap_or_else(|| "Unknown".to_string())
}
