use async_trait::async_trait;
use tracing::{debug, info};

use crate::database::DatabasePool;
use crate::models::blood_pressure::{BloodPressureReading, CreateBloodPressureRequest};
use super::errors::RepositoryError;
use super::storage::DatabaseStorage;

/// Repository trait for blood pressure readings
#[async_trait]
pub trait ReadingRepositoryTrait: Send + Sync {
    /// Get a window of readings ordered by timestamp descending (id descending on ties)
    async fn list(&self, skip: u64, limit: u32) -> Result<Vec<BloodPressureReading>, RepositoryError>;

    /// Insert a new reading; the store assigns its id
    async fn create(&self, request: CreateBloodPressureRequest) -> Result<BloodPressureReading, RepositoryError>;

    /// Get a blood pressure reading by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<BloodPressureReading>, RepositoryError>;

    /// Delete a reading; `false` when no reading had that id
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;

    /// Delete every reading and return how many were removed
    async fn delete_all(&self) -> Result<u64, RepositoryError>;
}

/// Repository for blood pressure readings backed by the configured database
#[derive(Debug, Clone)]
pub struct ReadingRepository {
    pool: DatabasePool,
}

impl ReadingRepository {
    /// Create a new repository over an open pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingRepositoryTrait for ReadingRepository {
    async fn list(&self, skip: u64, limit: u32) -> Result<Vec<BloodPressureReading>, RepositoryError> {
        let readings = DatabaseStorage::list(&self.pool, skip, limit).await?;
        debug!("Fetched {} blood pressure readings", readings.len());
        Ok(readings)
    }

    async fn create(&self, request: CreateBloodPressureRequest) -> Result<BloodPressureReading, RepositoryError> {
        DatabaseStorage::insert(&self.pool, request).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<BloodPressureReading>, RepositoryError> {
        DatabaseStorage::get_by_id(&self.pool, id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        DatabaseStorage::delete(&self.pool, id).await
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let removed = DatabaseStorage::delete_all(&self.pool).await?;
        info!("Deleted {} blood pressure readings", removed);
        Ok(removed)
    }
}
