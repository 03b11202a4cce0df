use tokio_postgres::Client;
use tracing::info;

use crate::database::DatabaseError;

/// Create the PostgreSQL schema if it does not exist yet
pub async fn run_schema(client: &Client) -> Result<(), DatabaseError> {
    info!("Running PostgreSQL schema setup");

    create_blood_pressure_table(client).await?;
    create_blood_pressure_index(client).await?;

    info!("PostgreSQL schema setup completed successfully");
    Ok(())
}

/// Create the blood pressure readings table
async fn create_blood_pressure_table(client: &Client) -> Result<(), DatabaseError> {
    info!("Creating blood_pressure_readings table if not exists");

    client
        .execute(
            "CREATE TABLE IF NOT EXISTS blood_pressure_readings (
                id SERIAL PRIMARY KEY,
                systolic INTEGER NOT NULL,
                diastolic INTEGER NOT NULL,
                heart_rate INTEGER NOT NULL,
                timestamp TIMESTAMP NOT NULL
            )",
            &[],
        )
        .await
        .map_err(|e| DatabaseError::SchemaError(format!("Failed to create table: {}", e)))?;

    Ok(())
}

/// Create index on timestamp for efficient listing
async fn create_blood_pressure_index(client: &Client) -> Result<(), DatabaseError> {
    info!("Creating index on timestamp");

    client
        .execute(
            "CREATE INDEX IF NOT EXISTS idx_blood_pressure_readings_timestamp
            ON blood_pressure_readings (timestamp)",
            &[],
        )
        .await
        .map_err(|e| DatabaseError::SchemaError(format!("Failed to create index: {}", e)))?;

    Ok(())
}
