//! Grid and display-format properties checked across many months.

use chrono::{Datelike, Duration, Locale, NaiveDate, Weekday};
use datepick_core::calendar::{calendar_grid, days_in_month, format_iso, parse_iso};
use datepick_core::{DisplayFormat, GRID_CELLS};

fn months() -> impl Iterator<Item = (i32, u32)> {
    [1899, 1900, 1970, 1999, 2000, 2024, 2025, 2026, 2100, 2400]
        .into_iter()
        .flat_map(|year| (1..=12).map(move |month| (year, month)))
}

#[test]
fn test_grid_has_42_consecutive_days() {
    for first_day in [Weekday::Sun, Weekday::Mon] {
        for (year, month) in months() {
            let grid = calendar_grid(year, month, first_day);
            assert_eq!(grid.len(), GRID_CELLS, "{}-{}", year, month);

            for pair in grid.windows(2) {
                assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
            }
        }
    }
}

#[test]
fn test_current_month_cells_match_month_length() {
    for first_day in [Weekday::Sun, Weekday::Mon] {
        for (year, month) in months() {
            let grid = calendar_grid(year, month, first_day);
            let current = grid.iter().filter(|d| d.is_current_month).count() as u32;
            assert_eq!(current, days_in_month(year, month), "{}-{}", year, month);

            // Current-month cells form one contiguous run starting at the 1st
            let start = grid.iter().position(|d| d.is_current_month).unwrap();
            assert_eq!(grid[start].date.day(), 1);
            assert!(start < 7);
        }
    }
}

#[test]
fn test_first_cell_is_first_day_of_week() {
    for first_day in [Weekday::Sun, Weekday::Mon] {
        for (year, month) in months() {
            let grid = calendar_grid(year, month, first_day);
            assert_eq!(grid[0].date.weekday(), first_day, "{}-{}", year, month);
        }
    }
}

#[test]
fn test_grid_is_deterministic() {
    for (year, month) in months() {
        assert_eq!(
            calendar_grid(year, month, Weekday::Mon),
            calendar_grid(year, month, Weekday::Mon)
        );
    }
}

#[test]
fn test_iso_values_match_dates() {
    for (year, month) in months() {
        for day in calendar_grid(year, month, Weekday::Sun) {
            assert_eq!(day.iso, format_iso(day.date));
            assert_eq!(parse_iso(&day.iso).unwrap(), day.date);
        }
    }
}

#[test]
fn test_display_format_reads_back_its_own_output() {
    let formats = [
        DisplayFormat::for_locale(Locale::en_US),
        DisplayFormat::for_locale(Locale::de_DE),
        DisplayFormat::default(),
    ];
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

    for format in &formats {
        for date in start.iter_days().step_by(37).take(40) {
            let text = format.format(date);
            assert_eq!(text.len(), format.len(), "{} via {}", date, format);
            assert_eq!(format.parse(&text).unwrap(), date, "{} via {}", text, format);
        }
    }
}
