//! Configuration types and parsing.
//!
//! The `Config` type is the user-facing schema: locale selection, default
//! selector ranges, display mode and animation timings. It stays simple and
//! serialization-friendly; derived values (resolved locale, display pattern)
//! live in `LocaleInfo`.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use toml::Table;

use crate::error::{Error, Result};

/// Known valid values for locale.first_day_of_week.
const VALID_FIRST_DAYS: &[&str] = &["auto", "sunday", "monday"];

/// Embedded default configuration TOML, compiled into the binary.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../../config.toml");

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Path where config was found, if any.
    pub source: Option<PathBuf>,
    /// Whether defaults were used (no config file found).
    pub used_defaults: bool,
}

impl ConfigLoadResult {
    fn from_file(path: &Path) -> Result<Self> {
        Ok(Self {
            config: Config::load(path)?,
            source: Some(path.to_path_buf()),
            used_defaults: false,
        })
    }

    fn defaults() -> Result<Self> {
        Ok(Self {
            config: Config::from_default_toml()?,
            source: None,
            used_defaults: true,
        })
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Locale selection and week layout.
    pub locale: LocaleConfig,

    /// Selector list range used when the invoker declares no bounds.
    pub range: RangeConfig,

    /// Display mode options.
    pub display: DisplayConfig,

    /// Animation timings and selector geometry.
    pub animation: AnimationConfig,
}

impl Config {
    /// Load configuration from the embedded default TOML string.
    pub fn from_default_toml() -> Result<Self> {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TOML)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, merging with embedded defaults.
    ///
    /// Returns an error if the file doesn't exist or can't be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::load_with_defaults(&content)
    }

    /// Load configuration from a TOML string, merging with embedded defaults.
    ///
    /// Both documents are parsed as tables and deep-merged (user values win)
    /// before deserializing.
    pub fn load_with_defaults(user_toml: &str) -> Result<Self> {
        let mut base: Table = toml::from_str(DEFAULT_CONFIG_TOML)?;
        let user: Table = toml::from_str(user_toml)?;

        deep_merge_toml(&mut base, user);

        let config: Config = base.try_into()?;
        Ok(config)
    }

    /// Load `explicit_path`, or the first file in [`Self::config_search_paths`].
    ///
    /// An explicit path must exist. Embedded defaults are used only when no
    /// candidate file exists at all.
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<ConfigLoadResult> {
        if let Some(path) = explicit_path {
            return ConfigLoadResult::from_file(path);
        }

        // The first existing file decides; a broken one is reported, not skipped.
        let search_paths = Self::config_search_paths();
        if let Some(path) = search_paths.iter().find(|p| p.exists()) {
            return ConfigLoadResult::from_file(path).inspect_err(|e| {
                tracing::error!("Config file {:?} exists but failed to load: {}", path, e);
            });
        }

        tracing::info!("No config file found, using built-in default config");
        tracing::debug!("Searched: {:?}", search_paths);
        ConfigLoadResult::defaults()
    }

    /// Candidate config locations, most specific first:
    /// `$XDG_CONFIG_HOME/datepick`, `~/.config/datepick`, then `./config.toml`.
    pub fn config_search_paths() -> Vec<PathBuf> {
        let xdg = env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
        let home = env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"));

        xdg.into_iter()
            .chain(home)
            .map(|dir| dir.join("datepick").join("config.toml"))
            .chain(std::iter::once(PathBuf::from("config.toml")))
            .collect()
    }

    /// Validate the configuration, returning every invalid value at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if !VALID_FIRST_DAYS.contains(&self.locale.first_day_of_week.as_str()) {
            errors.push(format!(
                "locale.first_day_of_week: invalid value '{}', expected one of: {}",
                self.locale.first_day_of_week,
                VALID_FIRST_DAYS.join(", ")
            ));
        }

        if self.locale.name.trim().is_empty() {
            errors.push("locale.name: must be 'auto' or a locale like 'de_DE'".to_string());
        }

        if self.range.min_year > self.range.max_year {
            errors.push(format!(
                "range: min_year ({}) must not be greater than max_year ({})",
                self.range.min_year, self.range.max_year
            ));
        }

        if !(1..=9999).contains(&self.range.min_year) || !(1..=9999).contains(&self.range.max_year)
        {
            errors.push("range: years must be between 1 and 9999".to_string());
        }

        if self.animation.shake_ms == 0 {
            errors.push("animation.shake_ms: must be greater than 0".to_string());
        }

        if self.animation.selector_row_height == 0 {
            errors.push("animation.selector_row_height: must be greater than 0".to_string());
        }

        if self.animation.selector_viewport_height < self.animation.selector_row_height {
            errors.push(format!(
                "animation.selector_viewport_height: {} is smaller than one row ({})",
                self.animation.selector_viewport_height, self.animation.selector_row_height
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigValidation(errors))
        }
    }

    /// Human-readable summary of the configuration.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        lines.push("Locale:".to_string());
        lines.push(format!("  name: {}", self.locale.name));
        lines.push(format!(
            "  first_day_of_week: {}",
            self.locale.first_day_of_week
        ));

        lines.push("\nRange:".to_string());
        lines.push(format!(
            "  years: {}-{}",
            self.range.min_year, self.range.max_year
        ));

        lines.push("\nDisplay:".to_string());
        lines.push(format!(
            "  mode: {}",
            if self.display.docked { "docked" } else { "modal" }
        ));

        lines.push("\nAnimation:".to_string());
        lines.push(format!(
            "  slide: {}ms, shake: {}ms ({}px), scroll: {}ms",
            self.animation.slide_ms,
            self.animation.shake_ms,
            self.animation.shake_offset_px,
            self.animation.scroll_ms
        ));
        lines.push(format!(
            "  selector rows: {}px in {}px viewport",
            self.animation.selector_row_height, self.animation.selector_viewport_height
        ));

        lines.join("\n")
    }
}

/// Deep merge two TOML tables, with `overlay` values taking precedence.
///
/// For nested tables, recursively merges. For arrays and other values,
/// the overlay value completely replaces the base value.
fn deep_merge_toml(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (value, base.get_mut(&key)) {
            (toml::Value::Table(section), Some(toml::Value::Table(existing))) => {
                deep_merge_toml(existing, section);
            }
            // Scalars, arrays and new sections replace whatever was there.
            (value, _) => {
                base.insert(key, value);
            }
        }
    }
}

/// Locale configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocaleConfig {
    /// "auto" (read LC_ALL / LC_TIME / LANG) or a locale such as "de_DE".
    pub name: String,

    /// "auto" derives the first weekday from the locale's region.
    pub first_day_of_week: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            name: "auto".to_string(),
            first_day_of_week: "auto".to_string(),
        }
    }
}

/// Year range for the month/year selectors of unbounded pickers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RangeConfig {
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            min_year: 1900,
            max_year: 2099,
        }
    }
}

/// Display options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Docked pickers show the year alone in the year label.
    pub docked: bool,
}

/// Animation timings in milliseconds and selector list geometry in pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Month slide transition duration. 0 disables the slide.
    pub slide_ms: u64,

    /// Bounds-rejection shake duration.
    pub shake_ms: u64,

    /// Horizontal shake distance.
    pub shake_offset_px: f64,

    /// Auto-scroll duration when opening a selector list.
    pub scroll_ms: u64,

    /// Height of one selector row.
    pub selector_row_height: u32,

    /// Visible height of the selector list viewport.
    pub selector_viewport_height: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            slide_ms: 300,
            shake_ms: 500,
            shake_offset_px: 8.0,
            scroll_ms: 300,
            selector_row_height: 48,
            selector_viewport_height: 288,
        }
    }
}
