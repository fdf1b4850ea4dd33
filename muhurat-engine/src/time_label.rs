//! Parsing for the backend's human-readable clock labels.
//!
//! The panchang backend renders times as `"7:45 AM"` or `"19:05"` depending
//! on the endpoint. Everything time-sensitive in this crate goes through
//! these helpers; a label that does not parse yields `None` and the caller
//! drops that window from the computation instead of failing the day.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

static TIME_LABEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*([AaPp][Mm])?\s*$").unwrap());

/// Parse `"H:MM"` or `"H:MM AM/PM"` into a clock time.
///
/// Meridian handling: `PM` with hour != 12 adds 12; `AM` with hour == 12
/// means midnight. Out-of-range hours or minutes reject.
pub fn parse_time_label(label: &str) -> Option<NaiveTime> {
    let caps = TIME_LABEL_PATTERN.captures(label)?;

    let mut hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = caps[2].parse().ok()?;

    match caps.get(3).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(meridian) => {
            if !(1..=12).contains(&hours) {
                return None;
            }
            if meridian == "pm" && hours != 12 {
                hours += 12;
            }
            if meridian == "am" && hours == 12 {
                hours = 0;
            }
        }
        None => {
            if hours > 23 {
                return None;
            }
        }
    }

    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Parse a label and anchor it to the given calendar day. The label only
/// carries hours and minutes; the date component is always the caller's.
pub fn anchor_time_label(label: &str, date: NaiveDate) -> Option<NaiveDateTime> {
    parse_time_label(label).map(|time| date.and_time(time))
}

/// Minute offset from midnight, for order comparisons on raw labels.
pub fn parse_minute_of_day(label: &str) -> Option<u32> {
    parse_time_label(label).map(|t| {
        use chrono::Timelike;
        t.hour() * 60 + t.minute()
    })
}

/// Render a clock time back into the 24-hour label form.
pub fn format_time_label(time: NaiveTime) -> String {
    time.format("%-H:%M").to_string()
}

/// Render a countdown as `HH:MM:SS`, floored to the second. Durations at or
/// below zero clamp to `00:00:00`; upstream is expected to refetch then.
pub fn format_countdown(remaining: Duration) -> String {
    let total_seconds = remaining.num_seconds().max(0);
    let hours = (total_seconds / 3600) % 24;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
