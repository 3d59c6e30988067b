//! Error types shared across the datepick crates.

use std::path::PathBuf;

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("invalid configuration:\n  {}", .0.join("\n  "))]
    ConfigValidation(Vec<String>),

    #[error("cannot parse '{input}' as a date: {reason}")]
    DateParse { input: String, reason: String },

    #[error("unknown locale '{0}'")]
    UnknownLocale(String),
}

impl Error {
    pub(crate) fn date_parse(input: &str, reason: impl Into<String>) -> Self {
        Self::DateParse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
