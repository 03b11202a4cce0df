use rusqlite::types::Type;
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::blood_pressure::{
    format_storage_timestamp, parse_timestamp, BloodPressureReading, CreateBloodPressureRequest,
};
use super::errors::RepositoryError;

const SELECT_READING: &str =
    "SELECT id, systolic, diastolic, heart_rate, timestamp FROM blood_pressure_readings";

/// Database storage operations for blood pressure readings
pub struct DatabaseStorage;

impl DatabaseStorage {
    /// Get one page of readings, newest first
    pub async fn list(
        pool: &DatabasePool,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<BloodPressureReading>, RepositoryError> {
        debug!("Listing blood pressure readings: skip={}, limit={}", skip, limit);

        // Both backends take a signed 64-bit OFFSET; past i64::MAX nothing is left anyway
        let offset = i64::try_from(skip).unwrap_or(i64::MAX);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let mut stmt = conn.prepare(&format!(
                    "{} ORDER BY timestamp DESC, id DESC LIMIT ?1 OFFSET ?2",
                    SELECT_READING
                ))?;

                let readings = stmt
                    .query_map([i64::from(limit), offset], sqlite_row_to_reading)?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(readings)
            }

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = pool.get().await?;

                let rows = client
                    .query(
                        &format!(
                            "{} ORDER BY timestamp DESC, id DESC LIMIT $1 OFFSET $2",
                            SELECT_READING
                        ),
                        &[&i64::from(limit), &offset],
                    )
                    .await?;

                rows.iter().map(postgres_row_to_reading).collect()
            }
        }
    }

    /// Insert a reading and return it with the id the store assigned
    pub async fn insert(
        pool: &DatabasePool,
        request: CreateBloodPressureRequest,
    ) -> Result<BloodPressureReading, RepositoryError> {
        debug!("Storing blood pressure reading taken at {}", request.timestamp);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                conn.execute(
                    "INSERT INTO blood_pressure_readings (systolic, diastolic, heart_rate, timestamp)
                     VALUES (?1, ?2, ?3, ?4)",
                    (
                        request.systolic,
                        request.diastolic,
                        request.heart_rate,
                        format_storage_timestamp(&request.timestamp),
                    ),
                )?;

                let id = conn.last_insert_rowid();
                debug!("Stored blood pressure reading: id={}", id);
                Ok(request.into_reading(id))
            }

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = pool.get().await?;

                let row = client
                    .query_one(
                        "INSERT INTO blood_pressure_readings (systolic, diastolic, heart_rate, timestamp)
                         VALUES ($1, $2, $3, $4) RETURNING id",
                        &[
                            &request.systolic,
                            &request.diastolic,
                            &request.heart_rate,
                            &request.timestamp,
                        ],
                    )
                    .await?;

                let id = i64::from(row.try_get::<_, i32>(0)?);
                debug!("Stored blood pressure reading: id={}", id);
                Ok(request.into_reading(id))
            }
        }
    }

    /// Get a reading by ID from the database
    pub async fn get_by_id(
        pool: &DatabasePool,
        id: i64,
    ) -> Result<Option<BloodPressureReading>, RepositoryError> {
        debug!("Getting blood pressure reading by ID from database: id={}", id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", SELECT_READING))?;
                let mut rows = stmt.query_map([id], sqlite_row_to_reading)?;
                let reading = rows.next().transpose()?;

                Ok(reading)
            }

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                // SERIAL ids are 32-bit; anything wider cannot exist
                let Ok(id) = i32::try_from(id) else {
                    return Ok(None);
                };

                let client = pool.get().await?;
                let row = client
                    .query_opt(&format!("{} WHERE id = $1", SELECT_READING), &[&id])
                    .await?;

                row.as_ref().map(postgres_row_to_reading).transpose()
            }
        }
    }

    /// Delete a reading; returns whether a row was removed
    pub async fn delete(pool: &DatabasePool, id: i64) -> Result<bool, RepositoryError> {
        debug!("Deleting blood pressure reading: id={}", id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let affected =
                    conn.execute("DELETE FROM blood_pressure_readings WHERE id = ?1", [id])?;
                Ok(affected > 0)
            }

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let Ok(id) = i32::try_from(id) else {
                    return Ok(false);
                };

                let client = pool.get().await?;
                let affected = client
                    .execute("DELETE FROM blood_pressure_readings WHERE id = $1", &[&id])
                    .await?;
                Ok(affected > 0)
            }
        }
    }

    /// Delete every reading; returns the number of rows removed
    pub async fn delete_all(pool: &DatabasePool) -> Result<u64, RepositoryError> {
        debug!("Deleting all blood pressure readings");

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let affected = conn.execute("DELETE FROM blood_pressure_readings", [])?;
                Ok(affected as u64)
            }

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = pool.get().await?;
                let affected = client
                    .execute("DELETE FROM blood_pressure_readings", &[])
                    .await?;
                Ok(affected)
            }
        }
    }

    /// Every reading in ascending id order
    pub async fn fetch_all_by_id(
        pool: &DatabasePool,
    ) -> Result<Vec<BloodPressureReading>, RepositoryError> {
        debug!("Reading all blood pressure readings in id order");

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_READING))?;
                let readings = stmt
                    .query_map([], sqlite_row_to_reading)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(readings)
            }

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = pool.get().await?;
                let rows = client
                    .query(&format!("{} ORDER BY id", SELECT_READING), &[])
                    .await?;
                rows.iter().map(postgres_row_to_reading).collect()
            }
        }
    }
}

/// Map a SQLite row (id, systolic, diastolic, heart_rate, timestamp)
fn sqlite_row_to_reading(row: &rusqlite::Row<'_>) -> rusqlite::Result<BloodPressureReading> {
    let raw_timestamp: String = row.get(4)?;
    let timestamp = parse_timestamp(&raw_timestamp)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, e.into()))?;

    Ok(BloodPressureReading {
        id: row.get(0)?,
        systolic: row.get(1)?,
        diastolic: row.get(2)?,
        heart_rate: row.get(3)?,
        timestamp,
    })
}

/// Map a PostgreSQL row (id, systolic, diastolic, heart_rate, timestamp)
#[cfg(feature = "postgres")]
fn postgres_row_to_reading(
    row: &tokio_postgres::Row,
) -> Result<BloodPressureReading, RepositoryError> {
    Ok(BloodPressureReading {
        id: i64::from(row.try_get::<_, i32>(0)?),
        systolic: row.try_get(1)?,
        diastolic: row.try_get(2)?,
        heart_rate: row.try_get(3)?,
        timestamp: row.try_get(4)?,
    })
}
