// Public entities for the BPTracker API
// Data structures that cross the HTTP boundary

// Blood pressure readings
pub mod blood_pressure;

// Error responses
pub mod common;
