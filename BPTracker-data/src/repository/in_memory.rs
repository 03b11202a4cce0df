use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::models::blood_pressure::{BloodPressureReading, CreateBloodPressureRequest};
use super::blood_pressure::ReadingRepositoryTrait;
use super::errors::RepositoryError;

#[derive(Debug, Default)]
struct Store {
    readings: BTreeMap<i64, BloodPressureReading>,
    last_id: i64,
}

/// In-memory repository for blood pressure readings.
///
/// Mirrors the ordering and id assignment of the SQL backends so services can
/// be tested without a database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReadingRepository {
    store: Arc<Mutex<Store>>,
}

impl InMemoryReadingRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with predefined readings, keeping their ids
    pub fn with_readings(readings: Vec<BloodPressureReading>) -> Self {
        let last_id = readings.iter().map(|r| r.id).max().unwrap_or(0);
        let readings = readings.into_iter().map(|r| (r.id, r)).collect();

        Self {
            store: Arc::new(Mutex::new(Store { readings, last_id })),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Store>, RepositoryError> {
        self.store
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))
    }
}

#[async_trait]
impl ReadingRepositoryTrait for InMemoryReadingRepository {
    async fn list(&self, skip: u64, limit: u32) -> Result<Vec<BloodPressureReading>, RepositoryError> {
        let store = self.lock()?;

        let mut readings: Vec<BloodPressureReading> = store.readings.values().cloned().collect();
        readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        Ok(readings
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(limit as usize)
            .collect())
    }

    async fn create(&self, request: CreateBloodPressureRequest) -> Result<BloodPressureReading, RepositoryError> {
        let mut store = self.lock()?;

        store.last_id += 1;
        let reading = request.into_reading(store.last_id);
        store.readings.insert(reading.id, reading.clone());

        Ok(reading)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<BloodPressureReading>, RepositoryError> {
        Ok(self.lock()?.readings.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.readings.remove(&id).is_some())
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let mut store = self.lock()?;
        let removed = store.readings.len() as u64;
        store.readings.clear();
        Ok(removed)
    }
}
