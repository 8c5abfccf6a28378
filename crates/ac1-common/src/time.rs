//! Time handling for AC1 datasets.
//!
//! AC1 writes `time_coverage_start`, `time_coverage_end` and `date_created`
//! in the compact form `YYYYMMDDTHHMMSS` (UTC, zero-padded, no separators)
//! instead of the dotted ISO-8601 form. The TIME coordinate itself is stored
//! as seconds since the Unix epoch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::TimeParseError;

/// Units of the AC1 TIME coordinate.
pub const AC1_TIME_UNITS: &str = "seconds since 1970-01-01T00:00:00Z";

/// chrono format string of the compact timestamp.
pub const COMPACT_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Format an instant as `YYYYMMDDTHHMMSS`.
pub fn format_compact(dt: &DateTime<Utc>) -> String {
    dt.format(COMPACT_FORMAT).to_string()
}

/// Parse a strict `YYYYMMDDTHHMMSS` timestamp.
pub fn parse_compact(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let well_formed = s.len() == 15
        && s.as_bytes()[8] == b'T'
        && s
            .bytes()
            .enumerate()
            .all(|(i, b)| i == 8 || b.is_ascii_digit());
    if !well_formed {
        return Err(TimeParseError::InvalidCompact(s.to_string()));
    }
    NaiveDateTime::parse_from_str(s, COMPACT_FORMAT)
        .map(|ndt| Utc.from_utc_datetime(&ndt))
        .map_err(|_| TimeParseError::InvalidCompact(s.to_string()))
}

/// Convert epoch seconds to an instant, rounded to the nearest second.
pub fn from_epoch_seconds(secs: f64) -> Result<DateTime<Utc>, TimeParseError> {
    if !secs.is_finite() {
        return Err(TimeParseError::OutOfRange(secs));
    }
    DateTime::<Utc>::from_timestamp(secs.round() as i64, 0).ok_or(TimeParseError::OutOfRange(secs))
}

/// Step of a CF `<unit> since <reference>` time encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeStep {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeStep {
    pub fn seconds(&self) -> f64 {
        match self {
            TimeStep::Seconds => 1.0,
            TimeStep::Minutes => 60.0,
            TimeStep::Hours => 3600.0,
            TimeStep::Days => 86400.0,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Some(TimeStep::Seconds),
            "min" | "mins" | "minute" | "minutes" => Some(TimeStep::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(TimeStep::Hours),
            "d" | "day" | "days" => Some(TimeStep::Days),
            _ => None,
        }
    }
}

/// Parsed CF time units, e.g. `days since 1950-01-01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUnits {
    pub step: TimeStep,
    pub reference: DateTime<Utc>,
}

impl TimeUnits {
    /// The AC1 TIME encoding.
    pub fn ac1() -> Self {
        Self {
            step: TimeStep::Seconds,
            reference: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn parse(units: &str) -> Result<Self, TimeParseError> {
        let invalid = || TimeParseError::InvalidUnits(units.to_string());
        let (step, reference) = units.trim().split_once(" since ").ok_or_else(invalid)?;
        let step = TimeStep::parse(step.trim()).ok_or_else(invalid)?;
        let reference = parse_reference(reference.trim()).ok_or_else(invalid)?;
        Ok(Self { step, reference })
    }

    /// Seconds since the Unix epoch for a value in these units.
    pub fn to_epoch_seconds(&self, value: f64) -> f64 {
        self.reference.timestamp() as f64 + value * self.step.seconds()
    }

    pub fn is_ac1(&self) -> bool {
        *self == Self::ac1()
    }
}

fn parse_reference(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim_end_matches(" UTC");

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = s.trim_end_matches('Z');
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_compact_zero_padded() {
        let dt = Utc.with_ymd_and_hms(2004, 4, 2, 0, 0, 0).unwrap();
        assert_eq!(format_compact(&dt), "20040402T000000");
        let dt = Utc.with_ymd_and_hms(2023, 2, 11, 12, 5, 9).unwrap();
        assert_eq!(format_compact(&dt), "20230211T120509");
    }

    #[test]
    fn test_parse_compact_strict() {
        let dt = parse_compact("20040402T120000").unwrap();
        assert_eq!(format_compact(&dt), "20040402T120000");

        assert!(parse_compact("2004-04-02T12:00:00Z").is_err());
        assert!(parse_compact("20040402T1200").is_err());
        assert!(parse_compact("20041302T120000").is_err());
        assert!(parse_compact("2004040 T120000").is_err());
    }

    #[test]
    fn test_time_units_days_since_1950() {
        let units = TimeUnits::parse("days since 1950-01-01").unwrap();
        assert_eq!(units.step, TimeStep::Days);
        // 1970-01-01 is 7305 days after 1950-01-01
        assert_eq!(units.to_epoch_seconds(7305.0), 0.0);
        assert_eq!(units.to_epoch_seconds(7305.5), 43200.0);
    }

    #[test]
    fn test_time_units_ac1() {
        let units = TimeUnits::parse(AC1_TIME_UNITS).unwrap();
        assert!(units.is_ac1());
        assert_eq!(units.to_epoch_seconds(42.0), 42.0);

        let hours = TimeUnits::parse("hours since 2004-04-01 00:00:00").unwrap();
        assert!(!hours.is_ac1());
        assert_eq!(
            from_epoch_seconds(hours.to_epoch_seconds(36.0)).unwrap(),
            Utc.with_ymd_and_hms(2004, 4, 2, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_time_units_invalid() {
        assert!(TimeUnits::parse("sverdrup").is_err());
        assert!(TimeUnits::parse("fortnights since 1970-01-01").is_err());
        assert!(TimeUnits::parse("days since yesterday").is_err());
    }

    #[test]
    fn test_from_epoch_seconds_rejects_nan() {
        assert!(from_epoch_seconds(f64::NAN).is_err());
    }
}
