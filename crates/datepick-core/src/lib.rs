//! Core library for datepick.
//!
//! Everything in this crate is free of host widget toolkits: calendar math,
//! the locale-aware display date format, locale services, configuration
//! parsing and logging setup. The picker engine itself lives in the
//! `datepick` crate.

pub mod calendar;
pub mod config;
pub mod date_format;
pub mod error;
pub mod locale;
pub mod logging;

pub use calendar::{CalendarDay, GRID_CELLS, calendar_grid, format_iso, parse_iso};
pub use config::{Config, ConfigLoadResult};
pub use date_format::DisplayFormat;
pub use error::{Error, Result};
pub use locale::{FirstDayPreference, LocaleInfo, first_day_of_week};
