//! Per-dialog picker state and month-granular bounds.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use datepick_core::calendar::{add_months, first_of_month};
use datepick_core::config::RangeConfig;
use serde::Serialize;

use crate::invoker::Invoker;

/// Opaque handle identifying one picker dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DialogId(pub(crate) u64);

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dialog#{}", self.0)
    }
}

/// Paging unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    Month,
    Year,
}

impl PeriodUnit {
    fn months(self) -> i32 {
        match self {
            PeriodUnit::Month => 1,
            PeriodUnit::Year => 12,
        }
    }
}

/// Why a navigation request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsViolation {
    BelowMin,
    AboveMax,
}

/// Optional inclusive bounds, compared at month granularity.
///
/// A month is navigable when any of its days lies within `[min, max]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds {
    pub min: Option<NaiveDate>,
    pub max: Option<NaiveDate>,
}

impl Bounds {
    pub fn new(min: Option<NaiveDate>, max: Option<NaiveDate>) -> Self {
        Self { min, max }
    }

    fn min_month(&self) -> Option<NaiveDate> {
        self.min.map(first_of_month)
    }

    fn max_month(&self) -> Option<NaiveDate> {
        self.max.map(first_of_month)
    }

    /// Check whether `month` (any day within it) may be displayed.
    pub fn check_month(&self, month: NaiveDate) -> Result<(), BoundsViolation> {
        let month = first_of_month(month);
        if self.min_month().is_some_and(|min| month < min) {
            return Err(BoundsViolation::BelowMin);
        }
        if self.max_month().is_some_and(|max| month > max) {
            return Err(BoundsViolation::AboveMax);
        }
        Ok(())
    }

    /// Check a single date against the inclusive bounds.
    pub fn check_date(&self, date: NaiveDate) -> Result<(), BoundsViolation> {
        if self.min.is_some_and(|min| date < min) {
            return Err(BoundsViolation::BelowMin);
        }
        if self.max.is_some_and(|max| date > max) {
            return Err(BoundsViolation::AboveMax);
        }
        Ok(())
    }

    /// Clamp `month` into the navigable range; returns a month start.
    pub fn clamp_month(&self, month: NaiveDate) -> NaiveDate {
        let month = first_of_month(month);
        match self.check_month(month) {
            Ok(()) => month,
            Err(BoundsViolation::BelowMin) => self.min_month().unwrap_or(month),
            Err(BoundsViolation::AboveMax) => self.max_month().unwrap_or(month),
        }
    }

    /// First and last navigable month for the selector lists, falling back
    /// to the configured year range on unbounded sides.
    pub fn selector_span(&self, range: &RangeConfig) -> (NaiveDate, NaiveDate) {
        let default_min = NaiveDate::from_ymd_opt(range.min_year, 1, 1).unwrap_or(NaiveDate::MIN);
        let default_max = NaiveDate::from_ymd_opt(range.max_year, 12, 1).unwrap_or(NaiveDate::MAX);
        (
            self.min_month().unwrap_or(default_min),
            self.max_month().unwrap_or(default_max),
        )
    }
}

/// State of one open picker.
#[derive(Debug, Clone)]
pub struct PickerState {
    invoker: Invoker,
    selected: NaiveDate,
    view_month: NaiveDate,
    bounds: Bounds,
}

impl PickerState {
    /// Create state for a freshly opened picker. The viewed month starts at
    /// the selected date's month, clamped into the bounds.
    pub fn new(invoker: Invoker, selected: NaiveDate, bounds: Bounds) -> Self {
        Self {
            invoker,
            selected,
            view_month: bounds.clamp_month(selected),
            bounds,
        }
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    /// First day of the displayed month.
    pub fn view_month(&self) -> NaiveDate {
        self.view_month
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Select a date and show its month.
    ///
    /// Dates outside `[min, max]` are rejected and leave the state untouched.
    pub fn select(&mut self, date: NaiveDate) -> Result<(), BoundsViolation> {
        self.bounds.check_date(date)?;
        self.selected = date;
        self.view_month = first_of_month(date);
        Ok(())
    }

    /// Page the viewed month by `amount` units.
    ///
    /// Leaves the state untouched when the target month is out of bounds.
    pub fn page(&mut self, amount: i32, unit: PeriodUnit) -> Result<NaiveDate, BoundsViolation> {
        let delta = amount.saturating_mul(unit.months());
        let target = match add_months(self.view_month, delta) {
            Some(target) => target,
            None if delta < 0 => return Err(BoundsViolation::BelowMin),
            None => return Err(BoundsViolation::AboveMax),
        };

        self.bounds.check_month(target)?;
        self.view_month = target;
        Ok(target)
    }

    /// Jump to `month` (1-12) of the viewed year, clamped into the bounds.
    pub fn set_month(&mut self, month: u32) -> NaiveDate {
        if let Some(target) = NaiveDate::from_ymd_opt(self.view_month.year(), month, 1) {
            self.view_month = self.bounds.clamp_month(target);
        }
        self.view_month
    }

    /// Jump to `year` keeping the viewed month, clamped into the bounds.
    pub fn set_year(&mut self, year: i32) -> NaiveDate {
        if let Some(target) = NaiveDate::from_ymd_opt(year, self.view_month.month(), 1) {
            self.view_month = self.bounds.clamp_month(target);
        }
        self.view_month
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::{ButtonControl, Invoker};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state(selected: NaiveDate, bounds: Bounds) -> PickerState {
        PickerState::new(Invoker::Text(ButtonControl::new("")), selected, bounds)
    }

    fn year_2025() -> Bounds {
        Bounds::new(Some(ymd(2025, 1, 1)), Some(ymd(2025, 12, 31)))
    }

    #[test]
    fn test_new_views_selected_month() {
        let s = state(ymd(2025, 3, 15), Bounds::default());
        assert_eq!(s.selected(), ymd(2025, 3, 15));
        assert_eq!(s.view_month(), ymd(2025, 3, 1));
    }

    #[test]
    fn test_new_clamps_view_into_bounds() {
        let s = state(ymd(2030, 6, 1), year_2025());
        assert_eq!(s.selected(), ymd(2030, 6, 1));
        assert_eq!(s.view_month(), ymd(2025, 12, 1));
    }

    #[test]
    fn test_page_month_and_year() {
        let mut s = state(ymd(2025, 1, 31), Bounds::default());
        assert_eq!(s.page(1, PeriodUnit::Month), Ok(ymd(2025, 2, 1)));
        assert_eq!(s.page(-1, PeriodUnit::Year), Ok(ymd(2024, 2, 1)));
        assert_eq!(s.selected(), ymd(2025, 1, 31));
    }

    #[test]
    fn test_page_past_max_is_rejected() {
        let mut s = state(ymd(2025, 12, 10), year_2025());
        assert_eq!(s.page(1, PeriodUnit::Month), Err(BoundsViolation::AboveMax));
        assert_eq!(s.view_month(), ymd(2025, 12, 1));
    }

    #[test]
    fn test_page_past_min_is_rejected() {
        let mut s = state(ymd(2025, 1, 10), year_2025());
        assert_eq!(s.page(-1, PeriodUnit::Month), Err(BoundsViolation::BelowMin));
        assert_eq!(s.page(-1, PeriodUnit::Year), Err(BoundsViolation::BelowMin));
        assert_eq!(s.view_month(), ymd(2025, 1, 1));
    }

    #[test]
    fn test_mid_month_bounds_keep_boundary_month_navigable() {
        let bounds = Bounds::new(Some(ymd(2025, 3, 20)), Some(ymd(2025, 5, 5)));
        let mut s = state(ymd(2025, 4, 1), bounds);
        assert!(s.page(-1, PeriodUnit::Month).is_ok());
        assert_eq!(s.view_month(), ymd(2025, 3, 1));
        assert!(s.page(-1, PeriodUnit::Month).is_err());
    }

    #[test]
    fn test_paging_never_leaves_bounds() {
        let bounds = year_2025();
        let mut s = state(ymd(2025, 6, 15), bounds);
        for step in [1, 1, 1, 1, 1, 1, 1, 1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1] {
            let _ = s.page(step, PeriodUnit::Month);
            let _ = s.page(step, PeriodUnit::Year);
            assert!(bounds.check_month(s.view_month()).is_ok());
        }
    }

    #[test]
    fn test_set_month_and_year_clamp() {
        let mut s = state(ymd(2025, 6, 15), Bounds::new(Some(ymd(2025, 3, 1)), Some(ymd(2026, 2, 1))));
        assert_eq!(s.set_month(1), ymd(2025, 3, 1));
        assert_eq!(s.set_month(7), ymd(2025, 7, 1));
        assert_eq!(s.set_year(2026), ymd(2026, 2, 1));
        assert_eq!(s.set_month(13), ymd(2026, 2, 1));
    }

    #[test]
    fn test_select_moves_view() {
        let mut s = state(ymd(2025, 4, 10), Bounds::default());
        assert!(s.select(ymd(2025, 5, 2)).is_ok());
        assert_eq!(s.selected(), ymd(2025, 5, 2));
        assert_eq!(s.view_month(), ymd(2025, 5, 1));
    }

    #[test]
    fn test_select_outside_bounds_is_rejected() {
        let mut s = state(ymd(2025, 12, 10), year_2025());
        assert_eq!(s.select(ymd(2026, 1, 2)), Err(BoundsViolation::AboveMax));
        assert_eq!(s.select(ymd(2024, 12, 31)), Err(BoundsViolation::BelowMin));
        assert_eq!(s.selected(), ymd(2025, 12, 10));
        assert_eq!(s.view_month(), ymd(2025, 12, 1));
    }

    #[test]
    fn test_selector_span_defaults() {
        let range = RangeConfig::default();
        let (min, max) = Bounds::default().selector_span(&range);
        assert_eq!(min, ymd(1900, 1, 1));
        assert_eq!(max, ymd(2099, 12, 1));

        let (min, max) = year_2025().selector_span(&range);
        assert_eq!(min, ymd(2025, 1, 1));
        assert_eq!(max, ymd(2025, 12, 1));
    }
}
