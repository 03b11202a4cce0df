use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use validator::{Validate, ValidationErrors};

use crate::entities::blood_pressure::{BloodPressureReading, CreateBloodPressureRequest, ReadingWindow};
use crate::entities::conversions;
use bp_tracker_data::database::DatabasePool;
use bp_tracker_data::repository::{ReadingRepository, ReadingRepositoryTrait, RepositoryError};

/// Reading service errors
#[derive(Debug, Error)]
pub enum ReadingServiceError {
    /// One message per rejected field
    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// No reading with the given id
    #[error("Reading not found: {0}")]
    NotFound(i64),

    /// Storage failure
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Trait for blood pressure reading operations
#[async_trait]
pub trait ReadingServiceTrait: Send + Sync {
    /// Get a page of readings, newest first
    async fn list_readings(
        &self,
        window: ReadingWindow,
    ) -> Result<Vec<BloodPressureReading>, ReadingServiceError>;

    /// Validate and store a new reading
    async fn create_reading(
        &self,
        request: CreateBloodPressureRequest,
    ) -> Result<BloodPressureReading, ReadingServiceError>;

    /// Get a blood pressure reading by ID
    async fn get_reading(&self, id: i64) -> Result<BloodPressureReading, ReadingServiceError>;

    /// Delete a blood pressure reading by ID
    async fn delete_reading(&self, id: i64) -> Result<(), ReadingServiceError>;

    /// Delete every reading and return how many were removed
    async fn delete_all_readings(&self) -> Result<u64, ReadingServiceError>;
}

/// Blood pressure reading service
pub struct ReadingService<R: ReadingRepositoryTrait> {
    repository: R,
}

impl<R: ReadingRepositoryTrait> ReadingService<R> {
    /// Create a new reading service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> ReadingServiceError {
        error!("Repository operation failed: {}", err);
        ReadingServiceError::Repository(err.to_string())
    }
}

/// Flatten validator output into sorted "field: message" lines
fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |err| match &err.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{}: invalid value", field),
            })
        })
        .collect();

    messages.sort();
    messages
}

fn validate<T: Validate>(value: &T) -> Result<(), ReadingServiceError> {
    value.validate().map_err(|errors| {
        let messages = validation_messages(&errors);
        warn!("Rejected input: {}", messages.join("; "));
        ReadingServiceError::Validation(messages)
    })
}

#[async_trait]
impl<R: ReadingRepositoryTrait> ReadingServiceTrait for ReadingService<R> {
    async fn list_readings(
        &self,
        window: ReadingWindow,
    ) -> Result<Vec<BloodPressureReading>, ReadingServiceError> {
        validate(&window)?;

        let data_readings = self
            .repository
            .list(window.skip, window.limit)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        Ok(data_readings
            .into_iter()
            .map(conversions::convert_to_domain_reading)
            .collect())
    }

    async fn create_reading(
        &self,
        request: CreateBloodPressureRequest,
    ) -> Result<BloodPressureReading, ReadingServiceError> {
        validate(&request)?;

        let timestamp = request.timestamp.unwrap_or_else(Utc::now);
        let data_request = conversions::convert_to_data_create_request(&request, timestamp);

        let data_reading = self
            .repository
            .create(data_request)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!("Created blood pressure reading id={}", data_reading.id);
        Ok(conversions::convert_to_domain_reading(data_reading))
    }

    async fn get_reading(&self, id: i64) -> Result<BloodPressureReading, ReadingServiceError> {
        self.repository
            .get_by_id(id)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .map(conversions::convert_to_domain_reading)
            .ok_or(ReadingServiceError::NotFound(id))
    }

    async fn delete_reading(&self, id: i64) -> Result<(), ReadingServiceError> {
        let deleted = self
            .repository
            .delete(id)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        if !deleted {
            return Err(ReadingServiceError::NotFound(id));
        }

        info!("Deleted blood pressure reading id={}", id);
        Ok(())
    }

    async fn delete_all_readings(&self) -> Result<u64, ReadingServiceError> {
        let removed = self
            .repository
            .delete_all()
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!("Deleted all blood pressure readings ({} removed)", removed);
        Ok(removed)
    }
}

/// Create the reading service over the database behind `pool`
pub fn create_reading_service(pool: DatabasePool) -> ReadingService<ReadingRepository> {
    ReadingService::new(ReadingRepository::new(pool))
}
