//! Interaction handling: maps host clicks and key presses to picker actions.
//!
//! Interpretation is pure. [`crate::picker::DatePicker`] applies the
//! resulting [`Action`] to the dialog's state and reports a [`NavOutcome`].

use chrono::NaiveDate;
use datepick_core::calendar::parse_iso;
use serde::Serialize;
use tracing::debug;

use crate::state::{BoundsViolation, PeriodUnit};
use crate::view_mode::{SelectorKind, ViewMode};

/// Which paging control group a previous/next button belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingGroup {
    Month,
    Year,
}

impl PagingGroup {
    fn unit(self) -> PeriodUnit {
        match self {
            PagingGroup::Month => PeriodUnit::Month,
            PagingGroup::Year => PeriodUnit::Year,
        }
    }
}

/// The part of the dialog a click landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    /// Day cell carrying its ISO value.
    Day(String),
    MonthLabel,
    YearLabel,
    InputModeToggle,
    /// Month selector entry (1-12).
    MonthEntry(u32),
    YearEntry(i32),
    /// Previous (`forward == false`) or next button.
    Paging { group: PagingGroup, forward: bool },
    Other,
}

/// Keys the picker reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Char(char),
    PageUp,
    PageDown,
    Other,
}

/// A key press inside the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub shift: bool,
    /// The focused element is a date-typed input.
    pub target_is_date_input: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            shift: false,
            target_is_date_input: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn on_date_input(mut self) -> Self {
        self.target_is_date_input = true;
        self
    }
}

/// A state change requested by an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Select(NaiveDate),
    Page { amount: i32, unit: PeriodUnit },
    ToggleList(SelectorKind),
    ToggleInput,
    SetMonth(u32),
    SetYear(i32),
}

/// What an interaction did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavOutcome {
    /// Nothing to do (unknown target, no state for the dialog, bad input).
    Ignored,
    /// A date was selected.
    Selected,
    /// The viewed month changed.
    Paged,
    /// Paging was refused; a shake plays.
    Rejected(BoundsViolation),
    /// Paging was refused because a month slide is in flight.
    Busy,
    /// The view mode changed (or was re-requested).
    ViewChanged(ViewMode),
    /// The key's default action must be suppressed and nothing else happens.
    Suppressed,
}

/// Result of a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The host must cancel the key's default behavior.
    pub prevent_default: bool,
    pub outcome: NavOutcome,
}

/// Interpreted key: whether to prevent the default plus an optional action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyAction {
    pub prevent_default: bool,
    pub action: Option<Action>,
}

/// Map a click to an action. Day cells without a usable ISO value map to
/// nothing.
pub fn interpret_click(target: &ClickTarget) -> Option<Action> {
    match target {
        ClickTarget::Day(iso) => match parse_iso(iso) {
            Ok(date) => Some(Action::Select(date)),
            Err(e) => {
                debug!("Ignoring day click: {}", e);
                None
            }
        },
        ClickTarget::MonthLabel => Some(Action::ToggleList(SelectorKind::Months)),
        ClickTarget::YearLabel => Some(Action::ToggleList(SelectorKind::Years)),
        ClickTarget::InputModeToggle => Some(Action::ToggleInput),
        ClickTarget::MonthEntry(month) => Some(Action::SetMonth(*month)),
        ClickTarget::YearEntry(year) => Some(Action::SetYear(*year)),
        ClickTarget::Paging { group, forward } => Some(Action::Page {
            amount: if *forward { 1 } else { -1 },
            unit: group.unit(),
        }),
        ClickTarget::Other => None,
    }
}

/// Map a key press to an action.
///
/// `M` and `Y` toggle the lists; `PageUp`/`PageDown` page forward/back by a
/// month, or a year with Shift. Enter and Space on a date input are
/// suppressed so the host does not open its native picker.
pub fn interpret_key(event: KeyEvent) -> KeyAction {
    let unit = if event.shift { PeriodUnit::Year } else { PeriodUnit::Month };
    let (prevent_default, action) = match event.key {
        Key::Enter | Key::Space => (event.target_is_date_input, None),
        Key::Char('M') => (false, Some(Action::ToggleList(SelectorKind::Months))),
        Key::Char('Y') => (false, Some(Action::ToggleList(SelectorKind::Years))),
        Key::PageUp => (false, Some(Action::Page { amount: 1, unit })),
        Key::PageDown => (false, Some(Action::Page { amount: -1, unit })),
        Key::Char(_) | Key::Other => (false, None),
    };
    KeyAction {
        prevent_default,
        action,
    }
}
