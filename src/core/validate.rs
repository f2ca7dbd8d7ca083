//! Date and date-time format checks
//!
//! Format checks for the validation phase. A date-only value must be exactly
//! ten characters of `YYYY-MM-DD`; a date-time value must match an ISO-8601
//! profile (optional era sign, `T` separator, `HH:MM:SS`, optional fractional
//! seconds, optional `Z` or `±HH:MM` offset). Checks only ever report; they
//! never reject a record.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

/// ISO-8601 date-time profile accepted for date-time fields.
///
/// Hour 00–23, minute/second 00–59, month 01–12, day 01–31; the offset may be
/// `Z`, `±HH:MM`, or `±HHMM`.
const ISO8601_PATTERN: &str = r"^(-?(?:[1-9][0-9]*)?[0-9]{4})-(1[0-2]|0[1-9])-(3[01]|0[1-9]|[12][0-9])T(2[0-3]|[01][0-9]):([0-5][0-9]):([0-5][0-9])(\.[0-9]+)?(Z|[+-](?:2[0-3]|[01][0-9]):?[0-5][0-9])?$";

/// Compiled date-time matcher, built once per processor.
#[derive(Debug, Clone)]
pub struct DateTimeFormat {
    pattern: Regex,
}

impl DateTimeFormat {
    pub fn new() -> Self {
        // The pattern is a constant; compilation cannot fail.
        Self {
            pattern: Regex::new(ISO8601_PATTERN).expect("ISO8601 pattern compiles"),
        }
    }

    /// Whether the value matches the ISO-8601 profile.
    pub fn matches(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }

    /// Parse a matching value into a UTC instant, for the future-timestamp
    /// check. Values without an offset are taken as UTC.
    pub fn parse_utc(&self, value: &str) -> Option<DateTime<Utc>> {
        if !self.matches(value) {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
            .ok()?;
        Some(naive.and_utc())
    }
}

impl Default for DateTimeFormat {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a value is a valid date-only string.
///
/// Exactly ten characters and parseable as `%Y-%m-%d`; `"2022-1-1"` fails the
/// length check, `"01-2022-01"` fails the parse.
pub fn is_valid_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
