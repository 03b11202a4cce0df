use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use bp_tracker_data::models::blood_pressure::parse_timestamp;
use bp_tracker_domain::entities::blood_pressure as domain;

/// Public representation of a blood pressure reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BloodPressureReading {
    /// Unique identifier for the reading
    #[schema(example = 1)]
    pub id: i64,

    /// Systolic blood pressure (the higher number)
    #[schema(example = 120)]
    pub systolic: i32,

    /// Diastolic blood pressure (the lower number)
    #[schema(example = 80)]
    pub diastolic: i32,

    /// Heart rate in beats per minute
    #[schema(example = 72)]
    pub heart_rate: i32,

    /// When the reading was taken (UTC)
    pub timestamp: DateTime<Utc>,
}

/// Request payload for creating a new blood pressure reading
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBloodPressureRequest {
    /// Systolic blood pressure, 40 to 300
    #[schema(minimum = 40, maximum = 300, example = 120)]
    pub systolic: i32,

    /// Diastolic blood pressure, 20 to 200
    #[schema(minimum = 20, maximum = 200, example = 80)]
    pub diastolic: i32,

    /// Heart rate in beats per minute, 20 to 250
    #[schema(minimum = 20, maximum = 250, example = 72)]
    pub heart_rate: i32,

    /// When the reading was taken. Defaults to current time if not provided.
    /// Values without an offset are taken as UTC.
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Response body for the reading list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadingListResponse {
    /// Readings, newest first
    pub readings: Vec<BloodPressureReading>,
}

/// Query parameters for listing readings
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListReadingsParams {
    /// Number of newest readings to skip (default: 0)
    #[param(minimum = 0)]
    pub skip: Option<u64>,

    /// Maximum number of readings to return (default: 100, max: 100)
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<u32>,
}

impl ListReadingsParams {
    /// Fill in defaults for absent parameters
    pub fn into_window(self) -> domain::ReadingWindow {
        let defaults = domain::ReadingWindow::default();
        domain::ReadingWindow {
            skip: self.skip.unwrap_or(defaults.skip),
            limit: self.limit.unwrap_or(defaults.limit),
        }
    }
}

fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;

    raw.map(|value| {
        parse_timestamp(&value)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(serde::de::Error::custom)
    })
    .transpose()
}

/// Convert a domain reading to its public form
pub fn convert_to_public_reading(reading: domain::BloodPressureReading) -> BloodPressureReading {
    BloodPressureReading {
        id: reading.id,
        systolic: reading.systolic,
        diastolic: reading.diastolic,
        heart_rate: reading.heart_rate,
        timestamp: reading.timestamp,
    }
}

/// Convert a public create request to the domain request
pub fn convert_to_domain_request(request: CreateBloodPressureRequest) -> domain::CreateBloodPressureRequest {
    domain::CreateBloodPressureRequest {
        systolic: request.systolic,
        diastolic: request.diastolic,
        heart_rate: request.heart_rate,
        timestamp: request.timestamp,
    }
}
