pub mod health;
pub mod blood_pressure;

// Re-export handlers for easier imports
pub use blood_pressure::{
    create_reading, delete_all_readings, delete_reading, get_reading, list_readings,
};
pub use health::{health_check, root};
