//! Shared style class constants for the date picker view model.
//!
//! Hosts apply these class names to their widgets; the names are the only
//! contract between the engine's view model and the host's stylesheet.
//!
//! # Usage
//!
//! ```ignore
//! use datepick::styles::{day, slide};
//!
//! for class in cell.classes() {
//!     element.add_class(class);
//! }
//! ```

/// Dialog-level classes.
pub mod dialog {
    /// Date picker dialog root (`.datepicker`).
    pub const ROOT: &str = "datepicker";

    /// Docked display mode (`.datepicker--docked`).
    pub const DOCKED: &str = "datepicker--docked";
}

/// Day cell state classes.
pub mod day {
    /// Day belongs to the previous or next month (`.datepicker__day--outside`).
    pub const OUTSIDE: &str = "datepicker__day--outside";

    /// Currently selected day (`.datepicker__day--selected`).
    pub const SELECTED: &str = "datepicker__day--selected";

    /// Today's date (`.datepicker__day--today`).
    pub const TODAY: &str = "datepicker__day--today";
}

/// Month slide transition classes, applied to the calendars container.
pub mod slide {
    /// Disable transitions while staging or resetting (`.datepicker--no-transition`).
    pub const NO_TRANSITION: &str = "datepicker--no-transition";

    /// Staged for a forward slide: the old layer is in view, the new one to its right
    /// (`.datepicker__calendars--start-left`).
    pub const START_LEFT: &str = "datepicker__calendars--start-left";

    /// Staged for a backward slide: the new layer sits to the left
    /// (`.datepicker__calendars--start-right`).
    pub const START_RIGHT: &str = "datepicker__calendars--start-right";

    /// Sliding forward (`.datepicker__calendars--move-left`).
    pub const MOVE_LEFT: &str = "datepicker__calendars--move-left";

    /// Sliding backward (`.datepicker__calendars--move-right`).
    pub const MOVE_RIGHT: &str = "datepicker__calendars--move-right";
}

/// View section classes.
pub mod view {
    /// Hidden view section (`.datepicker__view--hidden`).
    pub const HIDDEN: &str = "datepicker__view--hidden";
}
