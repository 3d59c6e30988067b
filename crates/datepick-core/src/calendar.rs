//! Pure calendar math: month grids, month arithmetic and canonical ISO dates.
//!
//! These functions have no locale or host dependencies and can be unit tested
//! directly. Locale-derived inputs (the first day of the week) are passed in
//! explicitly.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::Serialize;

use crate::error::{Error, Result};

/// Number of cells in a month grid (6 fixed weeks of 7 days).
pub const GRID_CELLS: usize = 42;

/// One cell of a month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Canonical `YYYY-MM-DD` value.
    pub iso: String,
    /// Whether the day belongs to the month the grid was built for.
    pub is_current_month: bool,
}

/// Format a date as canonical `YYYY-MM-DD`.
///
/// ```
/// use chrono::NaiveDate;
/// use datepick_core::format_iso;
///
/// let date = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
/// assert_eq!(format_iso(date), "2025-04-02");
/// ```
pub fn format_iso(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Parse a canonical `YYYY-MM-DD` value.
pub fn parse_iso(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| Error::date_parse(value, e.to_string()))
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Shift a month start by `delta` months.
///
/// Returns `None` when the result falls outside chrono's supported range.
pub fn add_months(month_start: NaiveDate, delta: i32) -> Option<NaiveDate> {
    let month_start = first_of_month(month_start);
    let magnitude = Months::new(delta.unsigned_abs());
    if delta >= 0 {
        month_start.checked_add_months(magnitude)
    } else {
        month_start.checked_sub_months(magnitude)
    }
}

/// Number of days in the given month (1-12).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    match add_months(first, 1) {
        Some(next) => next.signed_duration_since(first).num_days() as u32,
        None => 31,
    }
}

/// Build the 42-day grid for `month` (1-12) of `year`.
///
/// The grid starts at the last `first_day` on or before the 1st of the month
/// and advances one day per cell, so it always shows some trailing days of the
/// previous month (unless the 1st is itself `first_day`) and leading days of
/// the next month.
///
/// Returns an empty grid when `(year, month)` is not a valid month.
pub fn calendar_grid(year: i32, month: u32, first_day: Weekday) -> Vec<CalendarDay> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    let offset = (first.weekday().num_days_from_monday() + 7
        - first_day.num_days_from_monday())
        % 7;
    let Some(start) = first.checked_sub_days(Days::new(u64::from(offset))) else {
        return Vec::new();
    };

    start
        .iter_days()
        .take(GRID_CELLS)
        .map(|date| CalendarDay {
            date,
            iso: format_iso(date),
            is_current_month: date.month() == month && date.year() == year,
        })
        .collect()
}
