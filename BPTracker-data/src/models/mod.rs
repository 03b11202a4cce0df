// Storage models
pub mod blood_pressure;

pub use blood_pressure::{BloodPressureReading, CreateBloodPressureRequest};
