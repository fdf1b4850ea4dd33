//! Month-aligned calendar grid construction.

use chrono::{Datelike, NaiveDate};
use panchang_api::domain::CalendarDay;

/// A month of day records laid out for a 7-column week grid starting on
/// Sunday. The first `start_offset` cells are empty placeholders so the
/// month's first day lands on its weekday column; renderers must treat
/// those as non-interactive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub start_offset: usize,
    cells: Vec<Option<CalendarDay>>,
}

/// Lay out one month of day records. Pure: fetching is the caller's job,
/// and the backend sends the days unpadded in date order.
pub fn build_month_grid(days: Vec<CalendarDay>, year: i32, month: u32) -> MonthGrid {
    let start_offset = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first| first.weekday().num_days_from_sunday() as usize)
        .unwrap_or(0);

    let mut cells: Vec<Option<CalendarDay>> = Vec::with_capacity(start_offset + days.len());
    cells.resize(start_offset, None);
    cells.extend(days.into_iter().map(Some));

    MonthGrid {
        year,
        month,
        start_offset,
        cells,
    }
}

impl MonthGrid {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Option<CalendarDay>] {
        &self.cells
    }

    /// Day record at a grid position; `None` for padding cells.
    pub fn day_at(&self, index: usize) -> Option<&CalendarDay> {
        self.cells.get(index).and_then(|cell| cell.as_ref())
    }

    /// Grid position of a date, if that date is in this month's data.
    pub fn position_of(&self, date: NaiveDate) -> Option<usize> {
        self.cells
            .iter()
            .position(|cell| cell.as_ref().is_some_and(|day| day.date == date))
    }

    /// The record for `today`, used to auto-select the current day when the
    /// grid being shown is the current month.
    pub fn today(&self, today: NaiveDate) -> Option<&CalendarDay> {
        self.position_of(today).and_then(|index| self.day_at(index))
    }
}
