//! Live evaluation of a day's choghadiya windows.
//!
//! The window list for a date partitions the day and night hours; given a
//! wall-clock instant this module answers which window is active, which one
//! follows it, and how long the active one has left. The functions are pure
//! over an explicit `now` so the 1 Hz ticker just re-evaluates each second.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use panchang_api::domain::TimeWindow;

use crate::time_label::{anchor_time_label, format_countdown, parse_minute_of_day, parse_time_label};

/// Snapshot of the live window card: the active window, the one after it in
/// list order, and the `HH:MM:SS` countdown to the active window's end.
/// All three empty is a valid state (no data, or a gap in the partition).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoghadiyaStatus {
    pub current: Option<TimeWindow>,
    pub next: Option<TimeWindow>,
    pub remaining: Option<String>,
}

impl ChoghadiyaStatus {
    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}

/// Determine the active and next window at `now`.
///
/// A window whose end label is earlier than its start label crosses
/// midnight and is active on both sides of it. Windows with unparseable
/// labels are skipped. If source data overlaps (malformed upstream), the
/// first match in list order wins.
pub fn evaluate(windows: &[TimeWindow], now: NaiveDateTime) -> ChoghadiyaStatus {
    let Some(current_index) = windows.iter().position(|window| is_active(window, now)) else {
        return ChoghadiyaStatus::default();
    };

    let current = &windows[current_index];

    // The entry after the current one, in list order. The last window of the
    // list has no next; the following day's fetch owns the wrap-around.
    let next = windows.get(current_index + 1).cloned();

    let remaining = remaining_in(current, now).map(format_countdown);

    ChoghadiyaStatus {
        current: Some(current.clone()),
        next,
        remaining,
    }
}

/// Windows of `date` that have not started yet at `now`. For any date other
/// than `now`'s own day the whole list passes. Used by the muhurat list
/// view, which only shows slots still ahead of the user today.
pub fn upcoming_windows(windows: &[TimeWindow], date: NaiveDate, now: NaiveDateTime) -> Vec<TimeWindow> {
    if date != now.date() {
        return windows.to_vec();
    }
    let now_minute = {
        use chrono::Timelike;
        now.time().hour() * 60 + now.time().minute()
    };
    windows
        .iter()
        .filter(|window| matches!(parse_minute_of_day(&window.start), Some(start) if start > now_minute))
        .cloned()
        .collect()
}

fn is_active(window: &TimeWindow, now: NaiveDateTime) -> bool {
    let (Some(start), Some(end)) = (
        parse_time_label(&window.start),
        parse_time_label(&window.end),
    ) else {
        return false;
    };

    let time = now.time();
    if end < start {
        // Crosses midnight: active from start until 24:00 and again from
        // 00:00 until end.
        time >= start || time < end
    } else {
        time >= start && time < end
    }
}

fn remaining_in(window: &TimeWindow, now: NaiveDateTime) -> Option<Duration> {
    let mut end = anchor_time_label(&window.end, now.date())?;
    if end < now {
        end += Duration::days(1);
    }
    Some(end - now)
}
