use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DecodeError, ValidationError};

/// Format of a declared bare calendar date
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Exact format of absolute timestamps on the OSS wire
const REMOTE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A bare calendar date (`YYYY-MM-DD`) as used in lifecycle blocks.
///
/// OSS only accepts absolute dates at midnight UTC, so the time of day never
/// survives a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Parse a declared `YYYY-MM-DD` date for the named field
    pub fn parse(field: &str, value: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        };

        let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;

        // chrono accepts unpadded fields and a leading sign
        if date.format(DATE_FORMAT).to_string() != value {
            return Err(invalid());
        }

        Ok(Self(date))
    }

    /// Parse a remote `YYYY-MM-DDTHH:MM:SS.sssZ` timestamp, discarding the time of day
    pub fn from_remote_timestamp(field: &str, value: &str) -> Result<Self, DecodeError> {
        let invalid = |reason: String| DecodeError::Timestamp {
            field: field.to_string(),
            value: value.to_string(),
            reason,
        };

        let ts = NaiveDateTime::parse_from_str(value, REMOTE_TIMESTAMP_FORMAT)
            .map_err(|e| invalid(e.to_string()))?;

        // chrono treats the fractional part as optional and variable width
        if ts.format(REMOTE_TIMESTAMP_FORMAT).to_string() != value {
            return Err(invalid(
                "expected exactly YYYY-MM-DDTHH:MM:SS.sssZ".to_string(),
            ));
        }

        Ok(Self(ts.date()))
    }

    /// Render as the remote timestamp at midnight UTC
    pub fn to_remote_timestamp(&self) -> String {
        format!("{}T00:00:00.000Z", self)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse("date", &value)
    }
}

impl From<CalendarDate> for String {
    fn from(value: CalendarDate) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_date() {
        let date = CalendarDate::parse("date", "2020-11-11").unwrap();
        assert_eq!(date.to_string(), "2020-11-11");
        assert_eq!(date.to_remote_timestamp(), "2020-11-11T00:00:00.000Z");
    }

    #[test]
    fn test_reject_malformed_bare_date() {
        assert!(CalendarDate::parse("date", "2020/11/11").is_err());
        assert!(CalendarDate::parse("date", "2020-13-01").is_err());
        assert!(CalendarDate::parse("date", "").is_err());
        assert!(CalendarDate::parse("date", "2020-1-1").is_err());
        assert!(CalendarDate::parse("date", "2020-01-1").is_err());
        assert!(CalendarDate::parse("date", "+2020-01-01").is_err());
        assert_eq!(
            CalendarDate::parse("created_before_date", "tomorrow"),
            Err(ValidationError::InvalidDate {
                field: "created_before_date".to_string(),
                value: "tomorrow".to_string(),
            })
        );
    }

    #[test]
    fn test_remote_timestamp_truncates_time_of_day() {
        let date =
            CalendarDate::from_remote_timestamp("Date", "2015-11-11T13:45:10.123Z").unwrap();
        assert_eq!(date.to_string(), "2015-11-11");
    }

    #[test]
    fn test_remote_timestamp_requires_exact_format() {
        // no milliseconds
        assert!(CalendarDate::from_remote_timestamp("Date", "2015-11-11T00:00:00Z").is_err());
        // offset instead of Z
        assert!(
            CalendarDate::from_remote_timestamp("Date", "2015-11-11T00:00:00.000+08:00").is_err()
        );
        // bare date
        assert!(CalendarDate::from_remote_timestamp("Date", "2015-11-11").is_err());
    }
}
