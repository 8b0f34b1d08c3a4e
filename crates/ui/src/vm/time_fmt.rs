use chrono::{DateTime, Utc};
use quiz_core::model::Countdown;

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// `HH:MM:SS` once an hour or more remains, `MM:SS` below that.
#[must_use]
pub fn format_remaining(seconds: u32) -> String {
    Countdown::new(seconds).to_string()
}
