use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default page size for listing readings
pub const DEFAULT_LIMIT: u32 = 100;

/// Domain model for a blood pressure reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressureReading {
    /// Unique identifier assigned on creation
    pub id: i64,

    /// Systolic blood pressure (the higher number)
    pub systolic: i32,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: i32,

    /// Heart rate in beats per minute
    pub heart_rate: i32,

    /// When the reading was taken
    pub timestamp: DateTime<Utc>,
}

/// Request payload for creating a new blood pressure reading.
///
/// Only the per-field bounds are checked; systolic is not required to exceed
/// diastolic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateBloodPressureRequest {
    /// Systolic blood pressure (the higher number)
    #[validate(range(min = 40, max = 300, message = "Systolic must be between 40 and 300"))]
    pub systolic: i32,

    /// Diastolic blood pressure (the lower number)
    #[validate(range(min = 20, max = 200, message = "Diastolic must be between 20 and 200"))]
    pub diastolic: i32,

    /// Heart rate in beats per minute
    #[validate(range(min = 20, max = 250, message = "Heart rate must be between 20 and 250"))]
    pub heart_rate: i32,

    /// When the reading was taken. Defaults to current time if not provided.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Page of readings to list: skip the newest `skip`, return at most `limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ReadingWindow {
    pub skip: u64,

    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: u32,
}

impl Default for ReadingWindow {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(systolic: i32, diastolic: i32, heart_rate: i32) -> CreateBloodPressureRequest {
        CreateBloodPressureRequest {
            systolic,
            diastolic,
            heart_rate,
            timestamp: None,
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(request(40, 20, 20).validate().is_ok());
        assert!(request(300, 200, 250).validate().is_ok());

        assert!(request(39, 80, 70).validate().is_err());
        assert!(request(301, 80, 70).validate().is_err());
        assert!(request(120, 19, 70).validate().is_err());
        assert!(request(120, 201, 70).validate().is_err());
        assert!(request(120, 80, 19).validate().is_err());
        assert!(request(120, 80, 251).validate().is_err());
    }

    #[test]
    fn test_no_cross_field_rule() {
        assert!(request(80, 120, 70).validate().is_ok());
    }

    #[test]
    fn test_window_bounds() {
        assert!(ReadingWindow::default().validate().is_ok());
        assert!(ReadingWindow { skip: 0, limit: 1 }.validate().is_ok());
        assert!(ReadingWindow { skip: u64::MAX, limit: 100 }.validate().is_ok());
        assert!(ReadingWindow { skip: 0, limit: 0 }.validate().is_err());
        assert!(ReadingWindow { skip: 0, limit: 101 }.validate().is_err());
    }
}
