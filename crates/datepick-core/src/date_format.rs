//! Locale numeric date pattern used by the free-text date input.
//!
//! A `DisplayFormat` is a pattern such as `MM/DD/YYYY` or `DD.MM.YYYY`: the
//! letters `D`, `M` and `Y` mark digit positions and every other character is
//! a literal separator. The same pattern both formats the picker's selected
//! date and parses the user's typed text back.

use std::fmt;

use chrono::{Datelike, Locale, NaiveDate, NaiveTime};

use crate::calendar::parse_iso;
use crate::error::{Error, Result};

/// Pattern used when a locale has no purely numeric date representation.
pub const FALLBACK_PATTERN: &str = "YYYY-MM-DD";

/// Reference date used to discover the locale's field order. Day, month and
/// year are all distinguishable (15, 1, 2025).
const REFERENCE_DATE: (i32, u32, u32) = (2025, 1, 15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Day,
    Month,
    Year,
}

impl Field {
    fn letter(self) -> char {
        match self {
            Field::Day => 'D',
            Field::Month => 'M',
            Field::Year => 'Y',
        }
    }

    fn from_letter(c: char) -> Option<Self> {
        match c {
            'D' => Some(Field::Day),
            'M' => Some(Field::Month),
            'Y' => Some(Field::Year),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFormat {
    pattern: String,
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self {
            pattern: FALLBACK_PATTERN.to_string(),
        }
    }
}

impl fmt::Display for DisplayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl DisplayFormat {
    /// Build a format from an explicit pattern.
    ///
    /// The pattern must contain exactly one run each of `DD`, `MM` and `YYYY`.
    pub fn from_pattern(pattern: &str) -> Result<Self> {
        let mut runs = Vec::new();
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            if let Some(field) = Field::from_letter(c) {
                let mut width = 1;
                while chars.peek() == Some(&c) {
                    chars.next();
                    width += 1;
                }
                runs.push((field, width));
            }
        }

        let expected = [(Field::Day, 2), (Field::Month, 2), (Field::Year, 4)];
        let well_formed = runs.len() == 3 && expected.iter().all(|e| runs.contains(e));
        if !well_formed {
            return Err(Error::date_parse(
                pattern,
                "pattern needs exactly one DD, MM and YYYY",
            ));
        }

        Ok(Self {
            pattern: pattern.to_string(),
        })
    }

    /// Derive the numeric pattern for a locale.
    ///
    /// Formats the reference date with the locale's date representation and
    /// maps each digit run back to its field. Two-digit years are widened to
    /// four. Locales whose representation contains letters (month names, era
    /// markers) fall back to ISO order.
    pub fn for_locale(locale: Locale) -> Self {
        let (y, m, d) = REFERENCE_DATE;
        let Some(reference) = NaiveDate::from_ymd_opt(y, m, d) else {
            return Self::default();
        };
        let sample = reference
            .and_time(NaiveTime::MIN)
            .and_utc()
            .format_localized("%x", locale)
            .to_string();

        Self::from_sample(sample.trim()).unwrap_or_default()
    }

    /// Map a formatted reference date back to a pattern.
    fn from_sample(sample: &str) -> Option<Self> {
        if sample.chars().any(char::is_alphabetic) {
            return None;
        }

        let mut pattern = String::new();
        let mut digits = String::new();
        let flush = |digits: &mut String, pattern: &mut String| -> Option<()> {
            if digits.is_empty() {
                return Some(());
            }
            let field = match digits.trim_start_matches('0') {
                "15" => Field::Day,
                "1" => Field::Month,
                "25" | "2025" => Field::Year,
                _ => return None,
            };
            let width = if field == Field::Year { 4 } else { 2 };
            pattern.extend(std::iter::repeat_n(field.letter(), width));
            digits.clear();
            Some(())
        };

        for c in sample.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
            } else {
                flush(&mut digits, &mut pattern)?;
                pattern.push(c);
            }
        }
        flush(&mut digits, &mut pattern)?;

        Self::from_pattern(pattern.trim()).ok()
    }

    /// The pattern string, e.g. `DD.MM.YYYY`.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Number of characters a value in this format occupies.
    pub fn len(&self) -> usize {
        self.pattern.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Format a date with this pattern.
    pub fn format(&self, date: NaiveDate) -> String {
        let day = format!("{:02}", date.day());
        let month = format!("{:02}", date.month());
        let year = format!("{:04}", date.year());
        let (mut d, mut m, mut y) = (day.chars(), month.chars(), year.chars());

        self.pattern
            .chars()
            .map(|c| match Field::from_letter(c) {
                Some(Field::Day) => d.next().unwrap_or('0'),
                Some(Field::Month) => m.next().unwrap_or('0'),
                Some(Field::Year) => y.next().unwrap_or('0'),
                None => c,
            })
            .collect()
    }

    /// Parse text typed in this format.
    ///
    /// The text must have exactly the pattern's length; each pattern letter
    /// takes the character at the same position and separators are skipped.
    pub fn parse(&self, text: &str) -> Result<NaiveDate> {
        let text = text.trim();
        if text.chars().count() != self.len() {
            return Err(Error::date_parse(
                text,
                format!("expected {} characters ({})", self.len(), self.pattern),
            ));
        }

        let (mut day, mut month, mut year) = (String::new(), String::new(), String::new());
        for (p, c) in self.pattern.chars().zip(text.chars()) {
            match Field::from_letter(p) {
                Some(Field::Day) => day.push(c),
                Some(Field::Month) => month.push(c),
                Some(Field::Year) => year.push(c),
                None => {}
            }
        }

        let number = |s: &str| -> Result<u32> {
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::date_parse(text, format!("'{s}' is not a number")));
            }
            s.parse::<u32>()
                .map_err(|_| Error::date_parse(text, format!("'{s}' is not a number")))
        };
        let (d, m, y) = (number(&day)?, number(&month)?, number(&year)?);

        NaiveDate::from_ymd_opt(y as i32, m, d)
            .ok_or_else(|| Error::date_parse(text, "no such calendar day"))
    }
}

/// Leniently parse a date written by a host control.
///
/// Accepts, in order: an ISO date, an ISO date-time (time ignored), the
/// locale display pattern, US `M/D/YYYY`, and English month-name forms.
pub fn parse_loose(text: &str, display: &DisplayFormat) -> Result<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::date_parse(text, "empty value"));
    }

    if let Ok(date) = parse_iso(text) {
        return Ok(date);
    }
    if let Some((date_part, _time)) = text.split_once('T')
        && let Ok(date) = parse_iso(date_part)
    {
        return Ok(date);
    }
    if let Ok(date) = display.parse(text) {
        return Ok(date);
    }

    const LOOSE_FORMATS: &[&str] = &["%m/%d/%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"];
    LOOSE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .ok_or_else(|| Error::date_parse(text, "unrecognized date"))
}
