//! Locale services: resolved locale, week info and localized names.
//!
//! The locale does not change while a picker is in use, so the process-wide
//! instance is resolved once (from configuration or the environment) and then
//! shared read-only.

use std::env;
use std::sync::OnceLock;

use chrono::{Locale, NaiveDate, NaiveTime, Weekday};
use tracing::{debug, warn};

use crate::config::LocaleConfig;
use crate::date_format::DisplayFormat;
use crate::error::{Error, Result};

/// Regions whose weeks start on Sunday.
const SUNDAY_REGIONS: &[&str] = &["US", "CA", "MX"];

static GLOBAL_LOCALE: OnceLock<LocaleInfo> = OnceLock::new();

/// Configured first day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstDayPreference {
    /// Derive from the locale's region.
    #[default]
    Auto,
    Sunday,
    Monday,
}

impl FirstDayPreference {
    /// Parse a config value (`auto`, `sunday`, `monday`).
    pub fn from_config_str(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(Self::Auto),
            "sunday" => Some(Self::Sunday),
            "monday" => Some(Self::Monday),
            _ => None,
        }
    }
}

/// Resolved locale plus the derived values the picker needs.
#[derive(Debug, Clone)]
pub struct LocaleInfo {
    tag: String,
    locale: Locale,
    first_day: Weekday,
    display_format: DisplayFormat,
}

impl LocaleInfo {
    /// Build locale info for an explicit locale.
    pub fn new(locale: Locale, tag: &str, first_day: FirstDayPreference) -> Self {
        let first_day = match first_day {
            FirstDayPreference::Auto => first_day_for_tag(tag),
            FirstDayPreference::Sunday => Weekday::Sun,
            FirstDayPreference::Monday => Weekday::Mon,
        };

        Self {
            tag: tag.to_string(),
            locale,
            first_day,
            display_format: DisplayFormat::for_locale(locale),
        }
    }

    /// Resolve a locale tag such as `de_DE`, `en-US` or `fr_FR.UTF-8`.
    pub fn from_tag(tag: &str, first_day: FirstDayPreference) -> Result<Self> {
        let normalized = normalize_tag(tag);
        let locale = Locale::try_from(normalized.as_str())
            .map_err(|_| Error::UnknownLocale(tag.to_string()))?;
        Ok(Self::new(locale, &normalized, first_day))
    }

    /// Resolve from the `[locale]` config section.
    ///
    /// `name = "auto"` reads the environment; an unknown or missing
    /// environment locale falls back to `en_US`.
    pub fn from_config(config: &LocaleConfig) -> Result<Self> {
        let first_day =
            FirstDayPreference::from_config_str(&config.first_day_of_week).unwrap_or_default();

        if config.name != "auto" {
            return Self::from_tag(&config.name, first_day);
        }

        match environment_tag() {
            Some(tag) => Self::from_tag(&tag, first_day).or_else(|e| {
                debug!("Environment locale not usable ({}), using en_US", e);
                Ok(Self::new(Locale::en_US, "en_US", first_day))
            }),
            None => Ok(Self::new(Locale::en_US, "en_US", first_day)),
        }
    }

    /// The process-wide locale, resolved from the environment on first use
    /// unless `init_global` ran earlier.
    pub fn global() -> &'static LocaleInfo {
        GLOBAL_LOCALE.get_or_init(|| {
            Self::from_config(&LocaleConfig::default())
                .unwrap_or_else(|_| Self::new(Locale::en_US, "en_US", FirstDayPreference::Auto))
        })
    }

    /// Install the process-wide locale.
    ///
    /// Must run before the first `global()` call to take effect.
    pub fn init_global(info: LocaleInfo) {
        if GLOBAL_LOCALE.set(info).is_err() {
            warn!("Locale already initialized, ignoring init_global call");
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// First day of the week (Sunday or Monday).
    pub fn first_day_of_week(&self) -> Weekday {
        self.first_day
    }

    /// Numeric display pattern for the free-text input.
    pub fn display_format(&self) -> &DisplayFormat {
        &self.display_format
    }

    /// Format a date with a strftime pattern using localized names.
    pub fn format(&self, date: NaiveDate, fmt: &str) -> String {
        date.and_time(NaiveTime::MIN)
            .and_utc()
            .format_localized(fmt, self.locale)
            .to_string()
    }

    /// Single-letter weekday label for grid headers.
    pub fn weekday_narrow(&self, date: NaiveDate) -> String {
        self.format(date, "%a")
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }

    /// Full weekday name.
    pub fn weekday_long(&self, date: NaiveDate) -> String {
        self.format(date, "%A")
    }

    /// Full name of a month (1-12).
    pub fn month_long(&self, month: u32) -> String {
        match NaiveDate::from_ymd_opt(2000, month, 1) {
            Some(date) => self.format(date, "%B"),
            None => String::new(),
        }
    }

    /// Short selected-date summary, e.g. `Sat, Mar 15`.
    pub fn headline(&self, date: NaiveDate) -> String {
        self.format(date, "%a, %b %-d")
    }

    /// Short month label, e.g. `Mar`.
    pub fn month_short_label(&self, date: NaiveDate) -> String {
        self.format(date, "%b")
    }

    /// Year label: the year alone in docked mode, month and year otherwise.
    pub fn year_label(&self, date: NaiveDate, docked: bool) -> String {
        if docked {
            self.format(date, "%Y")
        } else {
            self.format(date, "%B %Y")
        }
    }
}

/// First day of the week for the process-wide locale.
pub fn first_day_of_week() -> Weekday {
    LocaleInfo::global().first_day_of_week()
}

/// Sunday for US, Canadian and Mexican regions, Monday elsewhere.
pub fn first_day_for_tag(tag: &str) -> Weekday {
    let region = normalize_tag(tag)
        .split_once('_')
        .map(|(_, region)| region.to_ascii_uppercase());

    match region {
        Some(region) if SUNDAY_REGIONS.contains(&region.as_str()) => Weekday::Sun,
        _ => Weekday::Mon,
    }
}

/// Strip encoding and modifier suffixes and use `_` as the separator.
fn normalize_tag(tag: &str) -> String {
    let base = tag.trim();
    let base = base.split(['.', '@']).next().unwrap_or(base);
    base.replace('-', "_")
}

/// Locale tag from `LC_ALL`, `LC_TIME` or `LANG`, skipping `C`/`POSIX`.
fn environment_tag() -> Option<String> {
    ["LC_ALL", "LC_TIME", "LANG"]
        .iter()
        .filter_map(|key| env::var(key).ok())
        .map(|value| normalize_tag(&value))
        .find(|value| !value.is_empty() && value != "C" && value != "POSIX")
}
