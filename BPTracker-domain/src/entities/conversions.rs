//! Conversion functions between domain entities and data models.
//! Named convert_to_[target_layer]_[model_name].

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::entities::blood_pressure::{BloodPressureReading, CreateBloodPressureRequest};
use bp_tracker_data::models::blood_pressure as data;

/// Convert from data model to domain entity for blood pressure reading
pub fn convert_to_domain_reading(data_reading: data::BloodPressureReading) -> BloodPressureReading {
    BloodPressureReading {
        id: data_reading.id,
        systolic: data_reading.systolic,
        diastolic: data_reading.diastolic,
        heart_rate: data_reading.heart_rate,
        timestamp: convert_to_domain_timestamp(data_reading.timestamp),
    }
}

/// Convert a validated domain request into the data model.
///
/// `timestamp` is the resolved reading time; it is stored at microsecond
/// precision.
pub fn convert_to_data_create_request(
    domain_request: &CreateBloodPressureRequest,
    timestamp: DateTime<Utc>,
) -> data::CreateBloodPressureRequest {
    data::CreateBloodPressureRequest {
        systolic: domain_request.systolic,
        diastolic: domain_request.diastolic,
        heart_rate: domain_request.heart_rate,
        timestamp: data::to_storage_precision(timestamp.naive_utc()),
    }
}

/// Stored timestamps are naive UTC
pub fn convert_to_domain_timestamp(timestamp: NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_create_request_truncates_to_microseconds() {
        let request = CreateBloodPressureRequest {
            systolic: 120,
            diastolic: 80,
            heart_rate: 70,
            timestamp: None,
        };
        let precise = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();

        let data_request = convert_to_data_create_request(&request, precise);

        assert_eq!(data_request.timestamp.nanosecond(), 123_456_000);
        assert_eq!(data_request.systolic, 120);
    }

    #[test]
    fn test_domain_reading_is_utc() {
        let naive = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap().naive_utc();
        let reading = convert_to_domain_reading(data::BloodPressureReading {
            id: 9,
            systolic: 130,
            diastolic: 85,
            heart_rate: 66,
            timestamp: naive,
        });

        assert_eq!(reading.id, 9);
        assert_eq!(reading.timestamp.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }
}
