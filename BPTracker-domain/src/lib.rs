// BPTracker Domain
// Validation and business rules for blood pressure readings

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the database module from bp_tracker_data for convenience
pub use bp_tracker_data::database;
