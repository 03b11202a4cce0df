// BPTracker Data
// Storage schema, connection pools, the readings repository and the
// SQLite to PostgreSQL data migration.

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;

// One-shot copy of readings between stores
pub mod migration;

pub use database::{DatabaseConfig, DatabaseError, DatabasePool, DatabaseType};
pub use migration::{migrate_readings, MigrationError, MigrationReport};
