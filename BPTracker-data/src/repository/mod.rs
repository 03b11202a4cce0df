// Repository module structure
pub mod errors;
mod blood_pressure;
mod storage;

#[cfg(any(test, feature = "mock"))]
mod in_memory;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use blood_pressure::{ReadingRepository, ReadingRepositoryTrait};
pub use storage::DatabaseStorage;

#[cfg(any(test, feature = "mock"))]
pub use in_memory::InMemoryReadingRepository;
