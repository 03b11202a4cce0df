//! One-shot copy of every reading from one store into another.
//!
//! Ids are preserved and the target's id sequence is moved past the highest
//! copied id, all inside a single target transaction. Any failure rolls the
//! whole batch back. The source is only read.

use thiserror::Error;
use tracing::{debug, error, info};

use crate::database::{DatabaseError, DatabasePool, SqlitePool};
use crate::models::blood_pressure::{format_storage_timestamp, BloodPressureReading};
use crate::repository::{DatabaseStorage, RepositoryError};

/// Outcome of a successful migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    /// Number of readings copied
    pub migrated: u64,
    /// Id the target will hand out to the next created reading
    pub next_id: i64,
}

/// Error type for the migration
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Target schema could not be created
    #[error("Failed to prepare target schema: {0}")]
    Schema(#[from] DatabaseError),

    /// Reading from the source failed
    #[error("Failed to read source readings: {0}")]
    Source(RepositoryError),

    /// Writing to the target failed; nothing was committed
    #[error("Failed to write target readings, rolled back: {0}")]
    Target(RepositoryError),

    /// Source id does not fit the target's id column
    #[error("Reading id {0} does not fit the target id column")]
    IdOutOfRange(i64),
}

fn target_err<E: Into<RepositoryError>>(e: E) -> MigrationError {
    MigrationError::Target(e.into())
}

/// Copy every reading from `source` into `target`, preserving ids
pub async fn migrate_readings(
    source: &DatabasePool,
    target: &DatabasePool,
) -> Result<MigrationReport, MigrationError> {
    info!("Starting blood pressure readings migration");

    target.run_schema_setup().await?;

    let readings = DatabaseStorage::fetch_all_by_id(source)
        .await
        .map_err(MigrationError::Source)?;
    info!("Read {} readings from source", readings.len());

    let result = match target {
        DatabasePool::SQLite(pool) => copy_into_sqlite(pool, &readings),
        #[cfg(feature = "postgres")]
        DatabasePool::PostgreSQL(pool) => copy_into_postgres(pool, &readings).await,
    };

    let next_id = result.map_err(|e| {
        error!("Migration failed: {}", e);
        e
    })?;

    let report = MigrationReport {
        migrated: readings.len() as u64,
        next_id,
    };

    info!(
        "Migration completed: {} readings copied, next id is {}",
        report.migrated, report.next_id
    );
    Ok(report)
}

fn copy_into_sqlite(
    pool: &SqlitePool,
    readings: &[BloodPressureReading],
) -> Result<i64, MigrationError> {
    let mut conn = pool.get().map_err(target_err)?;
    let tx = conn.transaction().map_err(target_err)?;

    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO blood_pressure_readings (id, systolic, diastolic, heart_rate, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .map_err(target_err)?;

        for reading in readings {
            debug!("Copying reading id={}", reading.id);
            stmt.execute((
                reading.id,
                reading.systolic,
                reading.diastolic,
                reading.heart_rate,
                format_storage_timestamp(&reading.timestamp),
            ))
            .map_err(target_err)?;
        }
    }

    // INTEGER PRIMARY KEY already continues at max(id) + 1
    let next_id: i64 = tx
        .query_row(
            "SELECT COALESCE(MAX(id), 0) + 1 FROM blood_pressure_readings",
            [],
            |row| row.get(0),
        )
        .map_err(target_err)?;

    tx.commit().map_err(target_err)?;
    Ok(next_id)
}

#[cfg(feature = "postgres")]
async fn copy_into_postgres(
    pool: &deadpool_postgres::Pool,
    readings: &[BloodPressureReading],
) -> Result<i64, MigrationError> {
    let mut client = pool.get().await.map_err(target_err)?;
    let pg_client: &mut tokio_postgres::Client = &mut client;
    let tx = pg_client.transaction().await.map_err(target_err)?;

    let stmt = tx
        .prepare(
            "INSERT INTO blood_pressure_readings (id, systolic, diastolic, heart_rate, timestamp)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .await
        .map_err(target_err)?;

    for reading in readings {
        let id = i32::try_from(reading.id).map_err(|_| MigrationError::IdOutOfRange(reading.id))?;
        debug!("Copying reading id={}", id);

        tx.execute(
            &stmt,
            &[
                &id,
                &reading.systolic,
                &reading.diastolic,
                &reading.heart_rate,
                &reading.timestamp,
            ],
        )
        .await
        .map_err(target_err)?;
    }

    let row = tx
        .query_one(
            "SELECT setval(
                pg_get_serial_sequence('blood_pressure_readings', 'id'),
                (SELECT COALESCE(MAX(id), 0) + 1 FROM blood_pressure_readings),
                false
            )",
            &[],
        )
        .await
        .map_err(target_err)?;
    let next_id: i64 = row.try_get(0).map_err(target_err)?;

    tx.commit().await.map_err(target_err)?;
    Ok(next_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateBloodPressureRequest;
    use crate::repository::{ReadingRepository, ReadingRepositoryTrait};
    use chrono::NaiveDate;

    fn reading(id: i64) -> BloodPressureReading {
        BloodPressureReading {
            id,
            systolic: 110 + id as i32,
            diastolic: 70 + id as i32,
            heart_rate: 60 + id as i32,
            timestamp: NaiveDate::from_ymd_opt(2024, 4, id as u32)
                .unwrap()
                .and_hms_micro_opt(6, 15, 0, 500_001)
                .unwrap(),
        }
    }

    async fn seeded_source(ids: std::ops::RangeInclusive<i64>) -> DatabasePool {
        let source = DatabasePool::sqlite_in_memory().unwrap();
        let repo = ReadingRepository::new(source.clone());
        for id in ids {
            let created = repo
                .create(CreateBloodPressureRequest {
                    systolic: reading(id).systolic,
                    diastolic: reading(id).diastolic,
                    heart_rate: reading(id).heart_rate,
                    timestamp: reading(id).timestamp,
                })
                .await
                .unwrap();
            assert_eq!(created.id, id);
        }
        source
    }

    #[tokio::test]
    async fn test_migration_preserves_rows_and_continues_ids() {
        let source = seeded_source(1..=5).await;
        let target = DatabasePool::sqlite_in_memory().unwrap();

        let report = migrate_readings(&source, &target).await.unwrap();
        assert_eq!(report, MigrationReport { migrated: 5, next_id: 6 });

        let copied = DatabaseStorage::fetch_all_by_id(&target).await.unwrap();
        let expected: Vec<BloodPressureReading> = (1..=5).map(reading).collect();
        assert_eq!(copied, expected);

        let repo = ReadingRepository::new(target);
        let created = repo
            .create(CreateBloodPressureRequest {
                systolic: 120,
                diastolic: 80,
                heart_rate: 70,
                timestamp: reading(6).timestamp,
            })
            .await
            .unwrap();
        assert_eq!(created.id, 6);
    }

    #[tokio::test]
    async fn test_migration_of_empty_source() {
        let source = DatabasePool::sqlite_in_memory().unwrap();
        let target = DatabasePool::sqlite_in_memory().unwrap();

        let report = migrate_readings(&source, &target).await.unwrap();
        assert_eq!(report, MigrationReport { migrated: 0, next_id: 1 });
    }

    #[tokio::test]
    async fn test_conflicting_id_rolls_back_whole_batch() {
        let source = seeded_source(1..=5).await;
        let target = seeded_source(1..=3).await;
        ReadingRepository::new(target.clone()).delete(1).await.unwrap();
        ReadingRepository::new(target.clone()).delete(2).await.unwrap();

        let result = migrate_readings(&source, &target).await;
        assert!(matches!(result, Err(MigrationError::Target(_))));

        let remaining = DatabaseStorage::fetch_all_by_id(&target).await.unwrap();
        assert_eq!(remaining, vec![reading(3)]);
    }

    #[tokio::test]
    async fn test_rerun_is_rejected() {
        let source = seeded_source(1..=2).await;
        let target = DatabasePool::sqlite_in_memory().unwrap();

        migrate_readings(&source, &target).await.unwrap();
        assert!(migrate_readings(&source, &target).await.is_err());
        assert_eq!(DatabaseStorage::fetch_all_by_id(&target).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_read_only_source_file() {
        let path = std::env::temp_dir().join(format!("bptracker-migrate-{}.db", std::process::id()));
        let path_str = path.to_string_lossy().to_string();
        let _ = std::fs::remove_file(&path);

        {
            let config = crate::database::DatabaseConfig {
                db_type: crate::database::DatabaseType::Sqlite,
                sqlite_path: path_str.clone(),
                max_connections: 1,
                ..Default::default()
            };
            let writable = DatabasePool::connect(&config).await.unwrap();
            let repo = ReadingRepository::new(writable);
            repo.create(CreateBloodPressureRequest {
                systolic: reading(1).systolic,
                diastolic: reading(1).diastolic,
                heart_rate: reading(1).heart_rate,
                timestamp: reading(1).timestamp,
            })
            .await
            .unwrap();
        }

        let source = DatabasePool::sqlite_read_only(&path_str).unwrap();
        let target = DatabasePool::sqlite_in_memory().unwrap();
        let report = migrate_readings(&source, &target).await.unwrap();
        assert_eq!(report.migrated, 1);

        let write_attempt = ReadingRepository::new(source).delete_all().await;
        assert!(write_attempt.is_err());

        let _ = std::fs::remove_file(&path);
    }
}
