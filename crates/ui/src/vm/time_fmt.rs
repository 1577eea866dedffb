use chrono::{DateTime, Duration, Utc};

/// `2024-03-09`, or an empty string when the backend sent no timestamp.
#[must_use]
pub fn format_date(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(String::new, |at| at.format("%Y-%m-%d").to_string())
}

/// `mm:ss` for a quiz countdown; negative values show as `00:00`.
#[must_use]
pub fn format_countdown(left: Duration) -> String {
    let secs = left.num_seconds().max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
