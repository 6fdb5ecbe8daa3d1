//! Replication value handling
//!
//! Bookmarks are stored as ISO 8601 strings. Providers disagree on how a
//! timestamp is spelled in a request, so values are parsed leniently and
//! re-encoded per stream with a [`ValueFormat`].

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Naive layouts accepted in addition to RFC 3339
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only layouts, interpreted as midnight UTC
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Encoding of a replication value inside a request parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    /// `2020-01-01T00:00:00Z`
    #[default]
    Iso8601,
    /// `2020-01-01 00:00:00.000000`
    DatetimeMicros,
}

impl ValueFormat {
    /// Format a datetime for a request parameter
    pub fn format(&self, dt: DateTime<Utc>) -> String {
        match self {
            Self::Iso8601 => format_iso8601(dt),
            Self::DatetimeMicros => dt.format("%Y-%m-%d %H:%M:%S.000000").to_string(),
        }
    }
}

/// Parse a datetime string into UTC
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(DateTime::from_naive_utc_and_offset(ndt, Utc));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(nd) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(ndt) = nd.and_hms_opt(0, 0, 0) {
                return Ok(DateTime::from_naive_utc_and_offset(ndt, Utc));
            }
        }
    }

    Err(Error::decode(format!("Invalid datetime format: {s}")))
}

/// Parse a JSON replication value as a datetime
pub fn parse_value(value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_datetime(s),
        other => Err(Error::decode(format!(
            "Replication value is not a datetime string: {other}"
        ))),
    }
}

/// Canonical bookmark spelling: RFC 3339 in UTC with a `Z` suffix
pub fn format_iso8601(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Normalize a replication value for storage.
///
/// Datetime strings are rewritten to [`format_iso8601`]; anything else is
/// kept as-is.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::String(s) => match parse_datetime(s) {
            Ok(dt) => Value::String(format_iso8601(dt)),
            Err(_) => value.clone(),
        },
        other => other.clone(),
    }
}

/// Compare two replication values.
///
/// Datetimes compare chronologically, numbers numerically and other strings
/// lexically. Mixed or structured values are incomparable.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => match (parse_datetime(x), parse_datetime(y)) {
            (Ok(dx), Ok(dy)) => Some(dx.cmp(&dy)),
            _ => Some(x.cmp(y)),
        },
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        _ => None,
    }
}
