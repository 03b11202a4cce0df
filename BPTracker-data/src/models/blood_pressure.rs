use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Format used for timestamps stored as text (SQLite).
///
/// Fixed width, so lexicographic order matches chronological order.
pub const STORAGE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Years that render as exactly four digits in [`STORAGE_TIMESTAMP_FORMAT`]
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1..=9999;

/// Storage model for a blood pressure reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressureReading {
    /// Identifier assigned by the store
    pub id: i64,

    /// Systolic blood pressure in mmHg
    pub systolic: i32,

    /// Diastolic blood pressure in mmHg
    pub diastolic: i32,

    /// Heart rate in beats per minute
    pub heart_rate: i32,

    /// When the reading was taken (UTC, microsecond precision)
    pub timestamp: NaiveDateTime,
}

/// Input data for inserting a new blood pressure reading.
/// The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBloodPressureRequest {
    pub systolic: i32,
    pub diastolic: i32,
    pub heart_rate: i32,
    pub timestamp: NaiveDateTime,
}

impl CreateBloodPressureRequest {
    /// Attach a store-assigned id
    pub fn into_reading(self, id: i64) -> BloodPressureReading {
        BloodPressureReading {
            id,
            systolic: self.systolic,
            diastolic: self.diastolic,
            heart_rate: self.heart_rate,
            timestamp: self.timestamp,
        }
    }
}

/// Render a timestamp in the text form used by SQLite storage
pub fn format_storage_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(STORAGE_TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp from text.
///
/// Accepts RFC 3339 with an offset (converted to UTC) and naive ISO-8601
/// with either a `T` or a space separator, optionally with fractional
/// seconds. Naive values are taken to be UTC. The UTC year must lie in
/// [`SUPPORTED_YEARS`].
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();

    let parsed = match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc).naive_utc()),
        Err(_) => ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok()),
    };

    let parsed = parsed.ok_or_else(|| format!("Invalid timestamp format: {}", value))?;

    if !SUPPORTED_YEARS.contains(&parsed.year()) {
        return Err(format!(
            "Timestamp year must be between {} and {}: {}",
            SUPPORTED_YEARS.start(),
            SUPPORTED_YEARS.end(),
            value
        ));
    }

    Ok(parsed)
}

/// Drop sub-microsecond precision so values survive both backends unchanged
pub fn to_storage_precision(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp.trunc_subsecs(6)
}
