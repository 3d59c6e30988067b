//! View renderer: projects picker state onto a host-agnostic view model.
//!
//! The renderer owns the calendar grid layers. Normally there is exactly one;
//! during a month slide there are two (outgoing and incoming) until the host
//! reports the end of the CSS-style transition.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate};
use datepick_core::calendar::{add_months, calendar_grid};
use datepick_core::config::RangeConfig;
use datepick_core::LocaleInfo;
use serde::Serialize;
use tracing::{debug, trace};

use crate::animation::{MonthSlide, SlideDirection, SlidePhase};
use crate::state::PickerState;
use crate::styles::{day, dialog};
use crate::view_mode::{SelectorKind, ViewMode, Visibility};

/// Weekday column header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayLabel {
    /// Single-letter label.
    pub narrow: String,
    /// Full name, used as the tooltip/title.
    pub long: String,
}

/// One of the 42 day cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub iso: String,
    pub day: u32,
    pub outside_month: bool,
    pub selected: bool,
    pub today: bool,
}

impl DayCell {
    pub fn classes(&self) -> Vec<&'static str> {
        let mut classes = Vec::new();
        if self.outside_month {
            classes.push(day::OUTSIDE);
        }
        if self.selected {
            classes.push(day::SELECTED);
        }
        if self.today {
            classes.push(day::TODAY);
        }
        classes
    }
}

/// A calendar grid for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridLayer {
    pub id: u64,
    pub month: NaiveDate,
    pub weekdays: Vec<WeekdayLabel>,
    pub cells: Vec<DayCell>,
}

impl GridLayer {
    /// Cells flagged selected.
    pub fn selected_cells(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter(|c| c.selected)
    }
}

/// Entry of the month or year selector list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorEntry {
    /// Month number (1-12) or year.
    pub value: i32,
    pub label: String,
    pub checked: bool,
}

/// Header texts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Headers {
    /// Selected-date summary.
    pub headline: String,
    /// Short month of the viewed month.
    pub month_label: String,
    /// Year (docked) or long month and year of the viewed month.
    pub year_label: String,
}

/// Free-text input contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextInputView {
    pub value: String,
    pub has_value: bool,
    /// Display pattern, for placeholders.
    pub pattern: String,
}

/// Everything a host needs to draw an open picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickerView {
    pub mode: ViewMode,
    pub visibility: Visibility,
    pub dialog_classes: Vec<&'static str>,
    pub headers: Headers,
    /// Grid layers in display order (left to right).
    pub layers: Vec<GridLayer>,
    /// Classes on the calendars container for the current slide phase.
    pub container_classes: Vec<&'static str>,
    pub months: Vec<SelectorEntry>,
    pub years: Vec<SelectorEntry>,
    pub input: Option<TextInputView>,
    pub input_mode_label: Option<String>,
    /// Horizontal shake translation in pixels.
    pub shake_offset: f64,
    /// Active selector auto-scroll and its offset.
    pub scroll: Option<(SelectorKind, f64)>,
}

/// Renderer settings fixed for a dialog's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub docked: bool,
    /// Whether the dialog has a calendars container to draw grids into.
    pub calendars: bool,
    pub text_input: bool,
    /// Animate ±1 month paging with a slide.
    pub slide: bool,
}

/// Renderer state for one dialog.
#[derive(Debug)]
pub struct Renderer {
    options: RenderOptions,
    layers: Vec<GridLayer>,
    current: Option<u64>,
    next_layer: u64,
    slide: Option<MonthSlide>,
    months: Vec<SelectorEntry>,
    years: Vec<SelectorEntry>,
    headers: Headers,
    input: Option<TextInputView>,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            layers: Vec::new(),
            current: None,
            next_layer: 0,
            slide: None,
            months: Vec::new(),
            years: Vec::new(),
            headers: Headers::default(),
            input: None,
        }
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Rebuild the month and year selector lists for a state's bounds.
    pub fn build_selectors(&mut self, state: &PickerState, range: &RangeConfig, locale: &LocaleInfo) {
        let (first, last) = state.bounds().selector_span(range);

        let mut months = BTreeSet::new();
        let mut cursor = Some(first);
        while let Some(month) = cursor.filter(|m| *m <= last) {
            months.insert(month.month());
            if months.len() == 12 {
                break;
            }
            cursor = add_months(month, 1);
        }

        self.months = months
            .into_iter()
            .map(|m| SelectorEntry {
                value: m as i32,
                label: locale.month_long(m),
                checked: false,
            })
            .collect();

        self.years = (first.year()..=last.year())
            .map(|y| SelectorEntry {
                value: y,
                label: y.to_string(),
                checked: false,
            })
            .collect();

        debug!(
            "Selector lists: {} months, {} years ({}..={})",
            self.months.len(),
            self.years.len(),
            first.year(),
            last.year()
        );
    }

    /// Redraw from `state`.
    ///
    /// `amount` is the paging step in months that led here. A step of ±1
    /// stages a slide; anything else redraws the current grid in place.
    pub fn render(&mut self, state: &PickerState, locale: &LocaleInfo, today: NaiveDate, amount: i32) {
        let month = state.view_month();

        if self.options.calendars {
            let direction = SlideDirection::from_amount(amount).filter(|_| amount.abs() == 1);
            match direction {
                Some(direction) if self.options.slide && self.slide.is_none() && self.current.is_some() => {
                    self.stage_slide(direction, state, locale, today)
                }
                _ => self.redraw_current(state, locale, today),
            }
        }

        self.headers = Headers {
            headline: locale.headline(state.selected()),
            month_label: locale.month_short_label(month),
            year_label: locale.year_label(month, self.options.docked),
        };

        if self.options.text_input {
            let value = locale.display_format().format(state.selected());
            self.input = Some(TextInputView {
                has_value: !value.is_empty(),
                value,
                pattern: locale.display_format().pattern().to_string(),
            });
        }

        let checked_month = month.month() as i32;
        for entry in &mut self.months {
            entry.checked = entry.value == checked_month;
        }
        for entry in &mut self.years {
            entry.checked = entry.value == month.year();
        }
    }

    /// First animation frame after staging: start sliding.
    pub fn on_animation_frame(&mut self) -> bool {
        match self.slide.as_mut() {
            Some(slide) if slide.phase == SlidePhase::Staged => {
                slide.phase = SlidePhase::Sliding;
                trace!("Month slide {:?} sliding", slide.direction);
                true
            }
            _ => false,
        }
    }

    /// The slide finished: drop the outgoing layer and reset positioning.
    pub fn on_transition_end(&mut self) -> bool {
        let Some(slide) = self.slide.take() else {
            return false;
        };
        self.layers.retain(|layer| layer.id != slide.outgoing);
        trace!("Month slide {:?} finished", slide.direction);
        true
    }

    pub fn is_transitioning(&self) -> bool {
        self.slide.is_some()
    }

    pub fn layers(&self) -> &[GridLayer] {
        &self.layers
    }

    /// The layer showing the viewed month.
    pub fn current_layer(&self) -> Option<&GridLayer> {
        let id = self.current?;
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn container_classes(&self) -> Vec<&'static str> {
        self.slide.map(|s| s.container_classes()).unwrap_or_default()
    }

    pub fn dialog_classes(&self) -> Vec<&'static str> {
        let mut classes = vec![dialog::ROOT];
        if self.options.docked {
            classes.push(dialog::DOCKED);
        }
        classes
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn months(&self) -> &[SelectorEntry] {
        &self.months
    }

    pub fn years(&self) -> &[SelectorEntry] {
        &self.years
    }

    pub fn selector(&self, kind: SelectorKind) -> &[SelectorEntry] {
        match kind {
            SelectorKind::Months => &self.months,
            SelectorKind::Years => &self.years,
        }
    }

    pub fn input(&self) -> Option<&TextInputView> {
        self.input.as_ref()
    }

    fn redraw_current(&mut self, state: &PickerState, locale: &LocaleInfo, today: NaiveDate) {
        let cells = build_cells(state, locale, today);
        let month = state.view_month();

        let existing = self
            .current
            .and_then(|id| self.layers.iter_mut().find(|layer| layer.id == id));

        match existing {
            Some(layer) => {
                layer.month = month;
                layer.cells = cells;
            }
            None => {
                let layer = self.new_layer(month, locale, cells);
                self.current = Some(layer.id);
                self.layers.push(layer);
            }
        }
    }

    fn stage_slide(
        &mut self,
        direction: SlideDirection,
        state: &PickerState,
        locale: &LocaleInfo,
        today: NaiveDate,
    ) {
        let Some(outgoing) = self.current else {
            return;
        };
        let cells = build_cells(state, locale, today);
        let layer = self.new_layer(state.view_month(), locale, cells);
        self.current = Some(layer.id);

        match direction {
            SlideDirection::Forward => self.layers.push(layer),
            SlideDirection::Backward => self.layers.insert(0, layer),
        }
        self.slide = Some(MonthSlide::new(direction, outgoing));
        trace!("Month slide {:?} staged", direction);
    }

    fn new_layer(&mut self, month: NaiveDate, locale: &LocaleInfo, cells: Vec<DayCell>) -> GridLayer {
        self.next_layer += 1;
        GridLayer {
            id: self.next_layer,
            month,
            weekdays: weekday_labels(locale, month),
            cells,
        }
    }
}

fn weekday_labels(locale: &LocaleInfo, reference: NaiveDate) -> Vec<WeekdayLabel> {
    let first_day = locale.first_day_of_week();
    let offset = (reference.weekday().num_days_from_monday() + 7
        - first_day.num_days_from_monday())
        % 7;
    let start = reference
        .checked_sub_days(Days::new(u64::from(offset)))
        .unwrap_or(reference);

    start
        .iter_days()
        .take(7)
        .map(|date| WeekdayLabel {
            narrow: locale.weekday_narrow(date),
            long: locale.weekday_long(date),
        })
        .collect()
}

fn build_cells(state: &PickerState, locale: &LocaleInfo, today: NaiveDate) -> Vec<DayCell> {
    let month = state.view_month();
    calendar_grid(month.year(), month.month(), locale.first_day_of_week())
        .into_iter()
        .map(|day| DayCell {
            day: day.date.day(),
            outside_month: !day.is_current_month,
            selected: day.date == state.selected(),
            today: day.date == today,
            iso: day.iso,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::{ButtonControl, Invoker};
    use crate::state::{Bounds, PeriodUnit};
    use chrono::Locale;
    use datepick_core::FirstDayPreference;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn locale() -> LocaleInfo {
        LocaleInfo::new(Locale::en_US, "en_US", FirstDayPreference::Auto)
    }

    fn options() -> RenderOptions {
        RenderOptions {
            docked: false,
            calendars: true,
            text_input: true,
            slide: true,
        }
    }

    fn state(selected: NaiveDate, bounds: Bounds) -> PickerState {
        PickerState::new(Invoker::Text(ButtonControl::new("")), selected, bounds)
    }

    #[test]
    fn test_render_marks_selected_and_today() {
        let s = state(ymd(2025, 3, 15), Bounds::default());
        let mut r = Renderer::new(options());
        r.render(&s, &locale(), ymd(2025, 3, 3), 0);

        let layer = r.current_layer().unwrap();
        assert_eq!(layer.cells.len(), 42);
        let selected: Vec<_> = layer.selected_cells().collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].iso, "2025-03-15");
        assert_eq!(selected[0].classes(), vec![day::SELECTED]);

        let today = layer.cells.iter().find(|c| c.today).unwrap();
        assert_eq!(today.iso, "2025-03-03");

        // Sunday start: March 2025 begins on Saturday, so Feb 23 leads
        assert_eq!(layer.cells[0].iso, "2025-02-23");
        assert_eq!(layer.cells[0].classes(), vec![day::OUTSIDE]);
    }

    #[test]
    fn test_weekday_labels_follow_first_day() {
        let s = state(ymd(2025, 3, 15), Bounds::default());
        let mut r = Renderer::new(options());
        r.render(&s, &locale(), ymd(2025, 3, 3), 0);

        let weekdays = &r.current_layer().unwrap().weekdays;
        assert_eq!(weekdays.len(), 7);
        assert_eq!(weekdays[0].narrow, "S");
        assert_eq!(weekdays[0].long, "Sunday");
        assert_eq!(weekdays[1].long, "Monday");

        let de = LocaleInfo::new(Locale::de_DE, "de_DE", FirstDayPreference::Auto);
        let mut r = Renderer::new(options());
        r.render(&s, &de, ymd(2025, 3, 3), 0);
        assert_eq!(r.current_layer().unwrap().weekdays[0].long, "Montag");
    }

    #[test]
    fn test_headers_modal_and_docked() {
        let s = state(ymd(2025, 3, 15), Bounds::default());
        let mut r = Renderer::new(options());
        r.render(&s, &locale(), ymd(2025, 1, 1), 0);
        assert_eq!(r.headers().headline, "Sat, Mar 15");
        assert_eq!(r.headers().month_label, "Mar");
        assert_eq!(r.headers().year_label, "March 2025");
        assert_eq!(r.dialog_classes(), vec![dialog::ROOT]);

        let mut r = Renderer::new(RenderOptions { docked: true, ..options() });
        r.render(&s, &locale(), ymd(2025, 1, 1), 0);
        assert_eq!(r.headers().year_label, "2025");
        assert_eq!(r.dialog_classes(), vec![dialog::ROOT, dialog::DOCKED]);
    }

    #[test]
    fn test_text_input_mirrors_selected() {
        let s = state(ymd(2025, 3, 15), Bounds::default());
        let mut r = Renderer::new(options());
        r.render(&s, &locale(), ymd(2025, 1, 1), 0);
        let input = r.input().unwrap();
        assert_eq!(input.value, "03/15/2025");
        assert!(input.has_value);
        assert_eq!(input.pattern, "MM/DD/YYYY");

        let mut r = Renderer::new(RenderOptions { text_input: false, ..options() });
        r.render(&s, &locale(), ymd(2025, 1, 1), 0);
        assert!(r.input().is_none());
    }

    #[test]
    fn test_selectors_full_range() {
        let s = state(ymd(2025, 3, 15), Bounds::default());
        let mut r = Renderer::new(options());
        r.build_selectors(&s, &RangeConfig::default(), &locale());
        r.render(&s, &locale(), ymd(2025, 1, 1), 0);

        assert_eq!(r.months().len(), 12);
        assert_eq!(r.months()[0].label, "January");
        assert_eq!(r.years().len(), 200);
        assert_eq!(r.years().first().unwrap().value, 1900);

        let checked: Vec<_> = r.months().iter().filter(|e| e.checked).collect();
        assert_eq!(checked.len(), 1);
        assert_eq!(checked[0].value, 3);
        let checked: Vec<_> = r.years().iter().filter(|e| e.checked).collect();
        assert_eq!(checked[0].value, 2025);
    }

    #[test]
    fn test_selectors_bounded_subset() {
        // Nov 2024 - Feb 2025 spans the year boundary
        let bounds = Bounds::new(Some(ymd(2024, 11, 20)), Some(ymd(2025, 2, 3)));
        let s = state(ymd(2025, 1, 10), bounds);
        let mut r = Renderer::new(options());
        r.build_selectors(&s, &RangeConfig::default(), &locale());

        let values: Vec<_> = r.months().iter().map(|e| e.value).collect();
        assert_eq!(values, vec![1, 2, 11, 12]);
        let years: Vec<_> = r.years().iter().map(|e| e.value).collect();
        assert_eq!(years, vec![2024, 2025]);
    }

    #[test]
    fn test_month_slide_lifecycle() {
        let mut s = state(ymd(2025, 3, 15), Bounds::default());
        let mut r = Renderer::new(options());
        let loc = locale();
        r.render(&s, &loc, ymd(2025, 1, 1), 0);
        let first = r.current_layer().unwrap().id;

        s.page(1, PeriodUnit::Month).unwrap();
        r.render(&s, &loc, ymd(2025, 1, 1), 1);
        assert!(r.is_transitioning());
        assert_eq!(r.layers().len(), 2);
        assert_eq!(r.layers()[0].id, first);
        assert_eq!(r.layers()[1].month, ymd(2025, 4, 1));
        assert_eq!(r.container_classes().len(), 2);

        assert!(r.on_animation_frame());
        assert!(!r.on_animation_frame());
        assert_eq!(r.container_classes(), vec![crate::styles::slide::MOVE_LEFT]);

        assert!(r.on_transition_end());
        assert!(!r.is_transitioning());
        assert_eq!(r.layers().len(), 1);
        assert_eq!(r.current_layer().unwrap().month, ymd(2025, 4, 1));
        assert!(r.container_classes().is_empty());
    }

    #[test]
    fn test_backward_slide_prepends() {
        let mut s = state(ymd(2025, 3, 15), Bounds::default());
        let mut r = Renderer::new(options());
        let loc = locale();
        r.render(&s, &loc, ymd(2025, 1, 1), 0);

        s.page(-1, PeriodUnit::Month).unwrap();
        r.render(&s, &loc, ymd(2025, 1, 1), -1);
        assert_eq!(r.layers()[0].month, ymd(2025, 2, 1));
        assert_eq!(r.layers()[1].month, ymd(2025, 3, 1));
    }

    #[test]
    fn test_year_paging_redraws_in_place() {
        let mut s = state(ymd(2025, 3, 15), Bounds::default());
        let mut r = Renderer::new(options());
        let loc = locale();
        r.render(&s, &loc, ymd(2025, 1, 1), 0);

        s.page(1, PeriodUnit::Year).unwrap();
        r.render(&s, &loc, ymd(2025, 1, 1), 12);
        assert!(!r.is_transitioning());
        assert_eq!(r.layers().len(), 1);
        assert_eq!(r.current_layer().unwrap().month, ymd(2026, 3, 1));
    }

    #[test]
    fn test_slide_disabled_redraws_in_place() {
        let mut s = state(ymd(2025, 3, 15), Bounds::default());
        let mut r = Renderer::new(RenderOptions { slide: false, ..options() });
        let loc = locale();
        r.render(&s, &loc, ymd(2025, 1, 1), 0);
        s.page(1, PeriodUnit::Month).unwrap();
        r.render(&s, &loc, ymd(2025, 1, 1), 1);
        assert!(!r.is_transitioning());
        assert_eq!(r.layers().len(), 1);
    }

    #[test]
    fn test_no_calendars_container_skips_grid() {
        let s = state(ymd(2025, 3, 15), Bounds::default());
        let mut r = Renderer::new(RenderOptions { calendars: false, ..options() });
        r.render(&s, &locale(), ymd(2025, 1, 1), 0);
        assert!(r.layers().is_empty());
        assert_eq!(r.headers().headline, "Sat, Mar 15");
    }
}
