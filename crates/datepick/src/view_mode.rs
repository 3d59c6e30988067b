//! View-mode state machine: calendar grid, month list, year list or
//! free-text entry, exactly one at a time.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::animation::{ScrollAnimation, Tick};

/// The four mutually exclusive picker views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Calendar,
    Months,
    Years,
    TextInput,
}

impl ViewMode {
    /// Which sections are shown in this mode.
    pub fn visibility(self) -> Visibility {
        let text = self == ViewMode::TextInput;
        Visibility {
            calendars: self == ViewMode::Calendar,
            input: text,
            month_paging: !text,
            year_paging: !text,
            months: self == ViewMode::Months,
            years: self == ViewMode::Years,
        }
    }

    pub fn selector(self) -> Option<SelectorKind> {
        match self {
            ViewMode::Months => Some(SelectorKind::Months),
            ViewMode::Years => Some(SelectorKind::Years),
            _ => None,
        }
    }
}

/// Per-section visibility derived from a [`ViewMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub calendars: bool,
    pub input: bool,
    pub month_paging: bool,
    pub year_paging: bool,
    pub months: bool,
    pub years: bool,
}

/// One of the two selector lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKind {
    Months,
    Years,
}

impl SelectorKind {
    pub fn mode(self) -> ViewMode {
        match self {
            SelectorKind::Months => ViewMode::Months,
            SelectorKind::Years => ViewMode::Years,
        }
    }
}

/// Input-mode toggle label. Shows `alt` while the text input is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputModeToggle {
    icon: String,
    alt: String,
}

impl InputModeToggle {
    pub fn new(icon: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            alt: alt.into(),
        }
    }

    pub fn label(&self, mode: ViewMode) -> &str {
        if mode == ViewMode::TextInput {
            &self.alt
        } else {
            &self.icon
        }
    }
}

/// Scroll geometry of a selector list, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollGeometry {
    /// Top of the checked entry within the list.
    pub offset_top: f64,
    /// Height of one entry.
    pub row_height: f64,
    /// Visible height of the scroll container.
    pub viewport_height: f64,
    /// Full height of the list content.
    pub scroll_height: f64,
}

impl ScrollGeometry {
    /// Distance that brings the checked entry near the vertical center.
    ///
    /// `None` when the entry is already above the center line.
    pub fn scroll_target(&self) -> Option<f64> {
        let center_top = (self.viewport_height - self.row_height) / 2.0;
        if self.offset_top <= center_top {
            return None;
        }

        let max_distance = (self.scroll_height - self.viewport_height).max(0.0);
        let distance = (self.offset_top - center_top - self.row_height / 2.0).min(max_distance);
        (distance > 0.0).then_some(distance)
    }
}

/// Source of selector list geometry. Hosts with real layout supply their own.
pub trait SelectorMetrics {
    fn geometry(&self, kind: SelectorKind, checked_index: usize, len: usize) -> ScrollGeometry;
}

/// Lists of equally tall rows in a fixed-height viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformRows {
    pub row_height: f64,
    pub viewport_height: f64,
}

impl SelectorMetrics for UniformRows {
    fn geometry(&self, _kind: SelectorKind, checked_index: usize, len: usize) -> ScrollGeometry {
        ScrollGeometry {
            offset_top: checked_index as f64 * self.row_height,
            row_height: self.row_height,
            viewport_height: self.viewport_height,
            scroll_height: len as f64 * self.row_height,
        }
    }
}

/// Tracks the active view and the selector auto-scroll task.
#[derive(Debug, Default)]
pub struct ViewModeController {
    mode: ViewMode,
    toggle: Option<InputModeToggle>,
    scroll: Option<(SelectorKind, ScrollAnimation)>,
}

impl ViewModeController {
    pub fn new(toggle: Option<InputModeToggle>) -> Self {
        Self {
            mode: ViewMode::Calendar,
            toggle,
            scroll: None,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Back to the calendar grid, dropping any scroll task.
    pub fn reset(&mut self) {
        self.set_mode(ViewMode::Calendar);
    }

    /// Request `target`.
    ///
    /// A selector list that is absent (`None`), empty or already showing
    /// falls back to the calendar, so requesting a list twice closes it.
    pub fn request(&mut self, target: ViewMode, list_len: Option<usize>) -> ViewMode {
        let target = match target.selector() {
            Some(_) if self.mode == target => ViewMode::Calendar,
            Some(kind) if list_len.unwrap_or(0) == 0 => {
                debug!("{:?} list unavailable, showing calendar", kind);
                ViewMode::Calendar
            }
            _ => target,
        };
        self.set_mode(target);
        self.mode
    }

    /// Switch between the calendar and the text input.
    pub fn toggle_input(&mut self, has_input: bool) -> ViewMode {
        let target = if self.mode == ViewMode::TextInput {
            ViewMode::Calendar
        } else if has_input {
            ViewMode::TextInput
        } else {
            return self.mode;
        };
        self.set_mode(target);
        self.mode
    }

    /// Current toggle label, if the dialog has a toggle.
    pub fn toggle_label(&self) -> Option<&str> {
        self.toggle.as_ref().map(|t| t.label(self.mode))
    }

    /// Start scrolling the active list toward its checked entry.
    ///
    /// Returns whether a scroll task was started.
    pub fn start_scroll(&mut self, geometry: ScrollGeometry, duration: Duration) -> bool {
        let Some(kind) = self.mode.selector() else {
            return false;
        };
        match geometry.scroll_target() {
            Some(distance) => {
                debug!("Scrolling {:?} list by {:.1}px", kind, distance);
                self.scroll = Some((kind, ScrollAnimation::new(distance, duration)));
                true
            }
            None => false,
        }
    }

    pub fn tick_scroll(&mut self, now: Instant) -> Tick {
        let Some((_, scroll)) = self.scroll.as_mut() else {
            return Tick::Done;
        };
        scroll.tick(now)
    }

    /// The list finished its height transition: snap to the final offset.
    pub fn finish_scroll(&mut self) {
        if let Some((_, scroll)) = self.scroll.as_mut() {
            scroll.finish();
        }
    }

    /// Scroll offset of the active list, if a scroll task exists.
    pub fn scroll_offset(&self) -> Option<(SelectorKind, f64)> {
        self.scroll.as_ref().map(|(kind, s)| (*kind, s.offset()))
    }

    fn set_mode(&mut self, mode: ViewMode) {
        if self.mode != mode {
            debug!("View mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        self.scroll = None;
    }
}
