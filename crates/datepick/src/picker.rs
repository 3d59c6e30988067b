//! Dialog lifecycle and the per-dialog side table.
//!
//! A [`DatePicker`] owns one entry per initialized dialog, keyed by
//! [`DialogId`]. Hosts forward their dialog events here:
//!
//! - `initialize` once, when the dialog element appears
//! - `before_open` when it is about to show
//! - `click`, `key` and `blur_text_input` while open
//! - `animation_frame`, `transition_end` and `tick` from the frame loop
//! - `on_close` with the dialog's return value
//! - `remove` when the element is torn down

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use datepick_core::{Config, LocaleInfo};
use tracing::{debug, info, trace};

use crate::animation::{ShakeAnimation, Tick};
use crate::invoker::ControlRegistry;
use crate::navigation::{
    Action, ClickTarget, KeyEvent, KeyOutcome, NavOutcome, interpret_click, interpret_key,
};
use crate::render::{PickerView, RenderOptions, Renderer};
use crate::state::{Bounds, DialogId, PeriodUnit, PickerState};
use crate::view_mode::{
    InputModeToggle, SelectorKind, SelectorMetrics, UniformRows, ViewMode, ViewModeController,
};

/// Structure a host dialog declares when it is initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogLayout {
    /// Element id invokers link to.
    pub element_id: String,
    /// The dialog has its form and content area. Required.
    pub has_content: bool,
    pub has_calendars: bool,
    pub has_month_list: bool,
    pub has_year_list: bool,
    pub has_text_input: bool,
    pub input_mode_toggle: Option<InputModeToggle>,
    /// Compact display mode (year-only year label).
    pub docked: bool,
}

impl DialogLayout {
    /// A dialog with every section present.
    pub fn new(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
            has_content: true,
            has_calendars: true,
            has_month_list: true,
            has_year_list: true,
            has_text_input: true,
            input_mode_toggle: Some(InputModeToggle::new("edit", "calendar_today")),
            docked: false,
        }
    }

    pub fn docked(mut self) -> Self {
        self.docked = true;
        self
    }
}

/// Everything kept for one dialog.
struct DialogEntry {
    layout: DialogLayout,
    renderer: Renderer,
    modes: ViewModeController,
    /// Present while the dialog has a resolved invoker.
    state: Option<PickerState>,
    shake: Option<ShakeAnimation>,
}

/// Shared, read-only inputs for applying an action.
struct Context<'a> {
    config: &'a Config,
    locale: &'a LocaleInfo,
    metrics: &'a dyn SelectorMetrics,
    today: NaiveDate,
}

impl DialogEntry {
    fn new(layout: DialogLayout, options: RenderOptions) -> Self {
        let modes = ViewModeController::new(layout.input_mode_toggle.clone());
        Self {
            layout,
            renderer: Renderer::new(options),
            modes,
            state: None,
            shake: None,
        }
    }

    fn list_len(&self, kind: SelectorKind) -> Option<usize> {
        let present = match kind {
            SelectorKind::Months => self.layout.has_month_list,
            SelectorKind::Years => self.layout.has_year_list,
        };
        present.then(|| self.renderer.selector(kind).len())
    }

    fn apply(&mut self, action: Action, ctx: &Context<'_>) -> NavOutcome {
        let Some(state) = self.state.as_mut() else {
            return NavOutcome::Ignored;
        };

        match action {
            Action::Select(date) => match state.select(date) {
                Ok(()) => {
                    self.renderer.render(state, ctx.locale, ctx.today, 0);
                    NavOutcome::Selected
                }
                Err(violation) => {
                    debug!("Ignoring selection of {} ({:?})", date, violation);
                    NavOutcome::Rejected(violation)
                }
            },
            Action::Page { amount, unit } => {
                if self.renderer.is_transitioning() {
                    debug!("Month slide in flight, paging refused");
                    return NavOutcome::Busy;
                }
                match state.page(amount, unit) {
                    Ok(month) => {
                        trace!("Paged to {}", month);
                        let slide_amount = if unit == PeriodUnit::Month { amount } else { 0 };
                        self.renderer.render(state, ctx.locale, ctx.today, slide_amount);
                        NavOutcome::Paged
                    }
                    Err(violation) => {
                        debug!("Paging by {} {:?} refused ({:?})", amount, unit, violation);
                        let anim = &ctx.config.animation;
                        self.shake = Some(ShakeAnimation::new(
                            violation,
                            anim.shake_offset_px,
                            Duration::from_millis(anim.shake_ms),
                        ));
                        NavOutcome::Rejected(violation)
                    }
                }
            }
            Action::ToggleList(kind) => {
                let len = self.list_len(kind);
                let mode = self.modes.request(kind.mode(), len);
                if mode == kind.mode() {
                    let entries = self.renderer.selector(kind);
                    if let Some(index) = entries.iter().position(|e| e.checked) {
                        let geometry = ctx.metrics.geometry(kind, index, entries.len());
                        let duration = Duration::from_millis(ctx.config.animation.scroll_ms);
                        self.modes.start_scroll(geometry, duration);
                    }
                }
                NavOutcome::ViewChanged(mode)
            }
            Action::ToggleInput => {
                NavOutcome::ViewChanged(self.modes.toggle_input(self.layout.has_text_input))
            }
            Action::SetMonth(month) => {
                state.set_month(month);
                self.renderer.render(state, ctx.locale, ctx.today, 0);
                self.modes.reset();
                NavOutcome::Paged
            }
            Action::SetYear(year) => {
                state.set_year(year);
                self.renderer.render(state, ctx.locale, ctx.today, 0);
                self.modes.reset();
                NavOutcome::Paged
            }
        }
    }
}

/// Date picker engine: lifecycle, interaction and view model for every
/// dialog a host registers.
pub struct DatePicker {
    config: Config,
    locale: LocaleInfo,
    dialogs: HashMap<DialogId, DialogEntry>,
    next_id: u64,
    today: Box<dyn Fn() -> NaiveDate>,
    metrics: Box<dyn SelectorMetrics>,
}

impl DatePicker {
    pub fn new(config: Config, locale: LocaleInfo) -> Self {
        let metrics = UniformRows {
            row_height: f64::from(config.animation.selector_row_height),
            viewport_height: f64::from(config.animation.selector_viewport_height),
        };
        Self {
            config,
            locale,
            dialogs: HashMap::new(),
            next_id: 0,
            today: Box::new(|| Local::now().date_naive()),
            metrics: Box::new(metrics),
        }
    }

    /// Build a picker with the locale named by the config.
    pub fn from_config(config: Config) -> datepick_core::Result<Self> {
        let locale = LocaleInfo::from_config(&config.locale)?;
        Ok(Self::new(config, locale))
    }

    /// Replace the clock used for "today".
    pub fn with_today<F>(mut self, today: F) -> Self
    where
        F: Fn() -> NaiveDate + 'static,
    {
        self.today = Box::new(today);
        self
    }

    /// Replace the selector list geometry source.
    pub fn with_metrics<M>(mut self, metrics: M) -> Self
    where
        M: SelectorMetrics + 'static,
    {
        self.metrics = Box::new(metrics);
        self
    }

    pub fn locale(&self) -> &LocaleInfo {
        &self.locale
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a dialog.
    ///
    /// Returns `None` when the dialog lacks its content area. Initializing
    /// the same element twice returns the existing id.
    pub fn initialize(&mut self, layout: DialogLayout) -> Option<DialogId> {
        if !layout.has_content {
            debug!("Dialog '{}' has no content area, not initializing", layout.element_id);
            return None;
        }
        if let Some(id) = self.dialog_id(&layout.element_id) {
            return Some(id);
        }

        self.next_id += 1;
        let id = DialogId(self.next_id);
        let options = RenderOptions {
            docked: layout.docked || self.config.display.docked,
            calendars: layout.has_calendars,
            text_input: layout.has_text_input,
            slide: self.config.animation.slide_ms > 0,
        };
        debug!("Initialized {} for '{}'", id, layout.element_id);
        self.dialogs.insert(id, DialogEntry::new(layout, options));
        Some(id)
    }

    /// Look up a dialog by element id.
    pub fn dialog_id(&self, element_id: &str) -> Option<DialogId> {
        self.dialogs
            .iter()
            .find(|(_, entry)| entry.layout.element_id == element_id)
            .map(|(id, _)| *id)
    }

    /// Prepare a dialog that is about to open.
    ///
    /// Resolves the invoker, reads its date and bounds, rebuilds the
    /// selector lists and shows the calendar. Returns `false` (and leaves
    /// the dialog without state) when no invoker is linked.
    pub fn before_open(&mut self, id: DialogId, controls: &ControlRegistry) -> bool {
        let today = (self.today)();
        let Some(entry) = self.dialogs.get_mut(&id) else {
            return false;
        };

        let Some(invoker) = controls.find_invoker(&entry.layout.element_id) else {
            debug!("No invoker linked to '{}'", entry.layout.element_id);
            entry.state = None;
            return false;
        };

        let selected = invoker.initial_date(&self.locale).unwrap_or(today);
        let (min, max) = invoker.bounds();
        let state = PickerState::new(invoker, selected, Bounds::new(min, max));

        entry.renderer = Renderer::new(entry.renderer.options());
        entry.renderer.build_selectors(&state, &self.config.range, &self.locale);
        entry.renderer.render(&state, &self.locale, today, 0);
        entry.modes.reset();
        entry.shake = None;

        info!(
            "Opening {} at {} (view {}, min {:?}, max {:?})",
            id,
            state.selected(),
            state.view_month(),
            min,
            max
        );
        entry.state = Some(state);
        true
    }

    /// Handle the dialog closing with its return value.
    ///
    /// A non-empty `result` commits the selected date to the invoker; an
    /// empty one (cancel) leaves the invoker untouched. Returns whether a
    /// commit happened.
    pub fn on_close(&mut self, id: DialogId, result: &str) -> bool {
        let Some(state) = self.dialogs.get(&id).and_then(|e| e.state.as_ref()) else {
            return false;
        };
        if result.is_empty() {
            debug!("{} cancelled", id);
            return false;
        }

        info!("{} closed, committing {}", id, state.selected());
        state.invoker().commit(state.selected(), &self.locale);
        true
    }

    /// Forget a torn-down dialog. Later events for `id` are no-ops.
    pub fn remove(&mut self, id: DialogId) -> bool {
        self.dialogs.remove(&id).is_some()
    }

    pub fn click(&mut self, id: DialogId, target: &ClickTarget) -> NavOutcome {
        match interpret_click(target) {
            Some(action) => self.apply(id, action),
            None => NavOutcome::Ignored,
        }
    }

    pub fn key(&mut self, id: DialogId, event: KeyEvent) -> KeyOutcome {
        let interpreted = interpret_key(event);
        let outcome = match interpreted.action {
            Some(action) => self.apply(id, action),
            None if interpreted.prevent_default => NavOutcome::Suppressed,
            None => NavOutcome::Ignored,
        };
        KeyOutcome {
            prevent_default: interpreted.prevent_default,
            outcome,
        }
    }

    /// The free-text input lost focus with `text`.
    ///
    /// Text that does not match the display pattern is ignored.
    pub fn blur_text_input(&mut self, id: DialogId, text: &str) -> NavOutcome {
        match self.locale.display_format().parse(text) {
            Ok(date) => self.apply(id, Action::Select(date)),
            Err(e) => {
                debug!("Ignoring free-text entry: {}", e);
                NavOutcome::Ignored
            }
        }
    }

    /// The host's next animation frame after a month slide was staged.
    pub fn animation_frame(&mut self, id: DialogId) -> bool {
        self.dialogs
            .get_mut(&id)
            .is_some_and(|e| e.renderer.on_animation_frame())
    }

    /// The calendars container finished its slide transition.
    pub fn transition_end(&mut self, id: DialogId) -> bool {
        self.dialogs
            .get_mut(&id)
            .is_some_and(|e| e.renderer.on_transition_end())
    }

    /// A selector list finished its height transition.
    pub fn list_transition_end(&mut self, id: DialogId) {
        if let Some(entry) = self.dialogs.get_mut(&id) {
            entry.modes.finish_scroll();
        }
    }

    /// Advance the shake and scroll tasks of a dialog.
    pub fn tick(&mut self, id: DialogId, now: Instant) -> Tick {
        let Some(entry) = self.dialogs.get_mut(&id) else {
            return Tick::Done;
        };

        let mut result = entry.modes.tick_scroll(now);
        if let Some(shake) = entry.shake.as_mut() {
            match shake.tick(now) {
                Tick::Continue => result = Tick::Continue,
                Tick::Done => entry.shake = None,
            }
        }
        result
    }

    /// View model of an open dialog.
    pub fn view(&self, id: DialogId) -> Option<PickerView> {
        let entry = self.dialogs.get(&id)?;
        if entry.state.is_none() {
            return None;
        }

        let mode = entry.modes.mode();
        let r = &entry.renderer;
        Some(PickerView {
            mode,
            visibility: mode.visibility(),
            dialog_classes: r.dialog_classes(),
            headers: r.headers().clone(),
            layers: r.layers().to_vec(),
            container_classes: r.container_classes(),
            months: if entry.layout.has_month_list { r.months().to_vec() } else { Vec::new() },
            years: if entry.layout.has_year_list { r.years().to_vec() } else { Vec::new() },
            input: r.input().cloned(),
            input_mode_label: entry.modes.toggle_label().map(str::to_string),
            shake_offset: entry.shake.as_ref().map_or(0.0, |s| s.offset()),
            scroll: entry.modes.scroll_offset(),
        })
    }

    pub fn state(&self, id: DialogId) -> Option<&PickerState> {
        self.dialogs.get(&id)?.state.as_ref()
    }

    pub fn mode(&self, id: DialogId) -> Option<ViewMode> {
        self.dialogs.get(&id).map(|e| e.modes.mode())
    }

    pub fn is_transitioning(&self, id: DialogId) -> bool {
        self.dialogs
            .get(&id)
            .is_some_and(|e| e.renderer.is_transitioning())
    }

    fn apply(&mut self, id: DialogId, action: Action) -> NavOutcome {
        let today = (self.today)();
        let Some(entry) = self.dialogs.get_mut(&id) else {
            return NavOutcome::Ignored;
        };
        let ctx = Context {
            config: &self.config,
            locale: &self.locale,
            metrics: self.metrics.as_ref(),
            today,
        };
        entry.apply(action, &ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::{ButtonControl, InputControl, InputKind, Invoker, TextControl};
    use crate::navigation::Key;
    use chrono::Locale;
    use datepick_core::FirstDayPreference;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn picker() -> DatePicker {
        let locale = LocaleInfo::new(Locale::en_US, "en_US", FirstDayPreference::Auto);
        DatePicker::new(Config::default(), locale).with_today(|| ymd(2025, 6, 10))
    }

    #[test]
    fn test_initialize_requires_content() {
        let mut p = picker();
        let layout = DialogLayout {
            has_content: false,
            ..DialogLayout::new("dp")
        };
        assert_eq!(p.initialize(layout), None);
        assert_eq!(p.dialog_id("dp"), None);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut p = picker();
        let a = p.initialize(DialogLayout::new("dp")).unwrap();
        let b = p.initialize(DialogLayout::new("dp")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, p.initialize(DialogLayout::new("other")).unwrap());
    }

    #[test]
    fn test_open_without_invoker_is_noop() {
        let mut p = picker();
        let id = p.initialize(DialogLayout::new("dp")).unwrap();
        let controls = ControlRegistry::new();
        assert!(!p.before_open(id, &controls));
        assert!(p.state(id).is_none());
        assert!(p.view(id).is_none());
        assert_eq!(p.click(id, &ClickTarget::MonthLabel), NavOutcome::Ignored);
    }

    #[test]
    fn test_open_with_unparsable_value_uses_today() {
        let mut p = picker();
        let id = p.initialize(DialogLayout::new("dp")).unwrap();
        let mut controls = ControlRegistry::new();
        controls.register(Invoker::Text(ButtonControl::new("Pick a date")), Some("dp"));

        assert!(p.before_open(id, &controls));
        assert_eq!(p.state(id).unwrap().selected(), ymd(2025, 6, 10));
        assert_eq!(p.mode(id), Some(ViewMode::Calendar));
    }

    #[test]
    fn test_text_invoker_commit_uses_display_format() {
        let mut p = picker();
        let id = p.initialize(DialogLayout::new("dp")).unwrap();
        let button = ButtonControl::new("March 15, 2025");
        let mut controls = ControlRegistry::new();
        controls.register(Invoker::Text(button.clone()), Some("dp"));

        p.before_open(id, &controls);
        p.click(id, &ClickTarget::Day("2025-03-20".into()));
        assert!(p.on_close(id, "ok"));
        assert_eq!(button.text(), "03/20/2025");
    }

    #[test]
    fn test_blur_text_input() {
        let mut p = picker();
        let id = p.initialize(DialogLayout::new("dp")).unwrap();
        let mut controls = ControlRegistry::new();
        controls.register(
            Invoker::Value(InputControl::new(InputKind::Date, "2025-03-15")),
            Some("dp"),
        );
        p.before_open(id, &controls);

        assert_eq!(p.blur_text_input(id, "04/02/2025"), NavOutcome::Selected);
        assert_eq!(p.state(id).unwrap().selected(), ymd(2025, 4, 2));
        assert_eq!(p.state(id).unwrap().view_month(), ymd(2025, 4, 1));

        assert_eq!(p.blur_text_input(id, "4/2/2025"), NavOutcome::Ignored);
        assert_eq!(p.state(id).unwrap().selected(), ymd(2025, 4, 2));
    }

    #[test]
    fn test_remove_makes_events_noops() {
        let mut p = picker();
        let id = p.initialize(DialogLayout::new("dp")).unwrap();
        let mut controls = ControlRegistry::new();
        controls.register(
            Invoker::Value(InputControl::new(InputKind::Date, "2025-03-15")),
            Some("dp"),
        );
        p.before_open(id, &controls);

        assert!(p.remove(id));
        assert!(!p.remove(id));
        assert_eq!(p.click(id, &ClickTarget::Day("2025-03-01".into())), NavOutcome::Ignored);
        assert!(!p.on_close(id, "ok"));
        assert_eq!(p.tick(id, Instant::now()), Tick::Done);
    }

    #[test]
    fn test_key_suppression_without_action() {
        let mut p = picker();
        let id = p.initialize(DialogLayout::new("dp")).unwrap();
        let out = p.key(id, KeyEvent::new(Key::Space).on_date_input());
        assert!(out.prevent_default);
        assert_eq!(out.outcome, NavOutcome::Suppressed);
    }
}
