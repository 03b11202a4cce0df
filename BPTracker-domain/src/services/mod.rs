// Services that implement business logic
pub mod blood_pressure;

pub use blood_pressure::{
    create_reading_service, ReadingService, ReadingServiceError, ReadingServiceTrait,
};
