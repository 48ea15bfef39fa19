//! Timestamp wire formats

use crate::error::{ShapeError, ShapeResult};
use crate::shape_type::ShapeType;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Wire representation selected by the `timestampFormat` trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimestampFormat {
    /// Seconds since the Unix epoch, with optional fractional part
    #[default]
    EpochSeconds,
    /// RFC 3339 date-time in UTC, e.g. `1985-04-12T23:20:50.52Z`
    DateTime,
    /// IMF-fixdate, e.g. `Tue, 29 Apr 2014 18:30:38 GMT`
    HttpDate,
}

impl TimestampFormat {
    /// Render a timestamp as text in this format
    pub fn format(&self, value: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::EpochSeconds => {
                if value.timestamp_subsec_nanos() == 0 {
                    value.timestamp().to_string()
                } else {
                    to_epoch_seconds(value).to_string()
                }
            }
            TimestampFormat::DateTime => value.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            TimestampFormat::HttpDate => value.format(HTTP_DATE_FORMAT).to_string(),
        }
    }

    /// Parse text produced in this format
    pub fn parse(&self, text: &str) -> ShapeResult<DateTime<Utc>> {
        match self {
            TimestampFormat::EpochSeconds => {
                let seconds: f64 = text
                    .parse()
                    .map_err(|_| ShapeError::Deserialization(format!("invalid epoch seconds `{text}`")))?;
                from_epoch_seconds(seconds)
            }
            TimestampFormat::DateTime => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| ShapeError::Deserialization(format!("invalid date-time `{text}`: {e}"))),
            TimestampFormat::HttpDate => DateTime::parse_from_rfc2822(text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| ShapeError::Deserialization(format!("invalid http-date `{text}`: {e}"))),
        }
    }

    /// Whether this format is written as a number rather than a string
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::EpochSeconds)
    }
}

impl std::fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimestampFormat::EpochSeconds => write!(f, "epoch-seconds"),
            TimestampFormat::DateTime => write!(f, "date-time"),
            TimestampFormat::HttpDate => write!(f, "http-date"),
        }
    }
}

/// Seconds since the epoch as a float
pub fn to_epoch_seconds(value: &DateTime<Utc>) -> f64 {
    value.timestamp() as f64 + f64::from(value.timestamp_subsec_nanos()) / 1e9
}

/// Build a timestamp from fractional epoch seconds
///
/// The fraction is kept to microsecond precision.
pub fn from_epoch_seconds(seconds: f64) -> ShapeResult<DateTime<Utc>> {
    if !seconds.is_finite() {
        return Err(ShapeError::OutOfRange {
            value: seconds.to_string(),
            target: ShapeType::Timestamp,
        });
    }
    let mut whole = seconds.floor();
    let mut micros = ((seconds - whole) * 1e6).round() as u32;
    if micros >= 1_000_000 {
        whole += 1.0;
        micros = 0;
    }
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return Err(ShapeError::OutOfRange {
            value: seconds.to_string(),
            target: ShapeType::Timestamp,
        });
    }
    DateTime::from_timestamp(whole as i64, micros * 1_000).ok_or_else(|| ShapeError::OutOfRange {
        value: seconds.to_string(),
        target: ShapeType::Timestamp,
    })
}

/// Build a timestamp from whole epoch seconds
pub fn from_epoch_integer(seconds: i64) -> ShapeResult<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| ShapeError::OutOfRange {
        value: seconds.to_string(),
        target: ShapeType::Timestamp,
    })
}

#[cfg(test)]
#[path = "timestamp/timestamp_tests.rs"]
mod timestamp_tests;
