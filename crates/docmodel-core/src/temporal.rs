//! # Temporal Types — Date-Only Values and Datetime Parsing
//!
//! `date` fields hold a [`DateOnly`]: a calendar date with no time of day
//! and no zone. `datetime` and `timestamp` fields hold a
//! `chrono::DateTime<Utc>`.
//!
//! ## Coercion Rules
//!
//! The validation engine coerces stored strings into these value types
//! before type-checking:
//!
//! - `date` + `"2026-01-15"` → `DateOnly(2026-01-15)`.
//! - `date` + datetime value → the datetime's UTC calendar date.
//! - `datetime` + RFC 3339 string → the instant, converted to UTC.
//!
//! Strings that cannot be parsed are left untouched so the type check
//! reports them.
//!
//! ## Wire Format
//!
//! `DateOnly` serializes as `YYYY-MM-DD`. Datetimes serialize as RFC 3339
//! UTC with millisecond precision and a `Z` suffix
//! (`2026-01-15T12:00:00.000Z`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Accepted layouts for datetimes that carry no offset; read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// A calendar date without time of day or zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateOnly(NaiveDate);

impl DateOnly {
    /// Build from year, month, day.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Wrap a `chrono::NaiveDate`.
    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Truncate a datetime to its UTC calendar date.
    pub fn from_datetime(dt: &DateTime<Utc>) -> Self {
        Self(dt.date_naive())
    }

    /// Parse a `YYYY-MM-DD` date.
    ///
    /// A full datetime string is also accepted and truncated to its UTC
    /// calendar date.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDate`] when neither form parses.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let trimmed = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(Self(date));
        }
        parse_datetime(trimmed)
            .map(|dt| Self::from_datetime(&dt))
            .map_err(|_| CoreError::InvalidDate {
                input: s.to_string(),
            })
    }

    /// Access the inner `NaiveDate`.
    pub fn as_naive(&self) -> &NaiveDate {
        &self.0
    }

    /// Render as `YYYY-MM-DD`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for DateOnly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl FromStr for DateOnly {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse a datetime string into a UTC instant.
///
/// Accepts, in order: RFC 3339 with any offset (converted to UTC), an
/// offset-less date-time (read as UTC), and a bare `YYYY-MM-DD` (midnight
/// UTC).
///
/// # Errors
///
/// Returns [`CoreError::InvalidDateTime`] when no accepted layout matches.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, CoreError> {
    let trimmed = s.trim();
    let rfc_err = match DateTime::parse_from_rfc3339(trimmed) {
        Ok(dt) => return Ok(dt.with_timezone(&Utc)),
        Err(e) => e,
    };

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(CoreError::InvalidDateTime {
        input: s.to_string(),
        reason: rfc_err.to_string(),
    })
}

/// Render a datetime as RFC 3339 UTC with millisecond precision.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_only_parse() {
        let d = DateOnly::parse("2026-01-15").unwrap();
        assert_eq!(d, DateOnly::from_ymd(2026, 1, 15).unwrap());
        assert_eq!(d.to_iso8601(), "2026-01-15");
    }

    #[test]
    fn test_date_only_parse_truncates_datetime() {
        let d = DateOnly::parse("2026-01-15T23:30:00Z").unwrap();
        assert_eq!(d.to_iso8601(), "2026-01-15");
    }

    #[test]
    fn test_date_only_parse_uses_utc_date() {
        // 01:00 at +05:00 is still the previous day in UTC.
        let d = DateOnly::parse("2026-01-15T01:00:00+05:00").unwrap();
        assert_eq!(d.to_iso8601(), "2026-01-14");
    }

    #[test]
    fn test_date_only_rejects_garbage() {
        assert!(DateOnly::parse("not-a-date").is_err());
        assert!(DateOnly::parse("2026-02-30").is_err());
        assert!(DateOnly::parse("").is_err());
    }

    #[test]
    fn test_date_only_from_datetime() {
        let dt = Utc.with_ymd_and_hms(2026, 6, 30, 23, 59, 59).unwrap();
        assert_eq!(DateOnly::from_datetime(&dt).to_iso8601(), "2026-06-30");
    }

    #[test]
    fn test_date_only_serde_is_plain_string() {
        let d = DateOnly::from_ymd(2026, 1, 1).unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "\"2026-01-01\"");
        let back: DateOnly = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_parse_datetime_rfc3339_offset_converted() {
        let dt = parse_datetime("2026-01-15T17:00:00+05:00").unwrap();
        assert_eq!(format_datetime(&dt), "2026-01-15T12:00:00.000Z");
    }

    #[test]
    fn test_parse_datetime_naive_read_as_utc() {
        let dt = parse_datetime("2026-01-15T12:00:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap());
        let dt = parse_datetime("2026-01-15 12:00:00.250").unwrap();
        assert_eq!(format_datetime(&dt), "2026-01-15T12:00:00.250Z");
    }

    #[test]
    fn test_parse_datetime_bare_date_is_midnight() {
        let dt = parse_datetime("2026-01-15").unwrap();
        assert_eq!(format_datetime(&dt), "2026-01-15T00:00:00.000Z");
    }

    #[test]
    fn test_parse_datetime_invalid() {
        let err = parse_datetime("yesterday").unwrap_err();
        assert!(matches!(err, CoreError::InvalidDateTime { .. }));
    }

    #[test]
    fn test_format_datetime_millis() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_datetime(&dt), "2026-01-01T00:00:00.000Z");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any valid calendar date survives render-then-parse.
        #[test]
        fn date_only_text_is_stable(days in 0i64..200_000) {
            let base = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
            let date = DateOnly::from_naive(base + chrono::Duration::days(days));
            prop_assert_eq!(DateOnly::parse(&date.to_iso8601()).unwrap(), date);
        }

        /// Parsing never panics on arbitrary input.
        #[test]
        fn parse_datetime_never_panics(s in ".{0,40}") {
            let _ = parse_datetime(&s);
            let _ = DateOnly::parse(&s);
        }
    }
}
