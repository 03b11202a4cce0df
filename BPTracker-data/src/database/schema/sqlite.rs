use rusqlite::Connection;
use tracing::info;

use crate::database::DatabaseError;

/// Create the SQLite schema if it does not exist yet
pub fn run_schema(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Running SQLite schema setup");

    create_blood_pressure_table(conn)?;
    create_blood_pressure_index(conn)?;

    info!("SQLite schema setup completed successfully");
    Ok(())
}

/// Create the blood pressure readings table.
/// Timestamps are stored as fixed-width UTC text so they sort chronologically.
fn create_blood_pressure_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating blood_pressure_readings table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS blood_pressure_readings (
            id INTEGER PRIMARY KEY,
            systolic INTEGER NOT NULL,
            diastolic INTEGER NOT NULL,
            heart_rate INTEGER NOT NULL,
            timestamp TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| DatabaseError::SchemaError(format!("Failed to create table: {}", e)))?;

    Ok(())
}

/// Create index on timestamp for efficient listing
fn create_blood_pressure_index(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating index on timestamp");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_blood_pressure_readings_timestamp
        ON blood_pressure_readings (timestamp)",
        [],
    )
    .map_err(|e| DatabaseError::SchemaError(format!("Failed to create index: {}", e)))?;

    Ok(())
}
