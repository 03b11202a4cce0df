//! Database connection module for BPTracker
//!
//! Two backends are supported:
//! - PostgreSQL (default, behind the `postgres` feature)
//! - SQLite (file-based or in-memory)
//!
//! A [`DatabasePool`] is created once at start-up and handed to whoever needs
//! it; every operation checks a connection out and returns it when the guard
//! drops.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::{error, info};

use super::schema;

/// Default SQLite database file, relative to the working directory
pub const DEFAULT_SQLITE_PATH: &str = "bptracker.db";

/// Special SQLite path selecting a private in-memory database
pub const IN_MEMORY_SQLITE_PATH: &str = ":memory:";

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite database (file-based or in-memory)
    Sqlite,
    /// PostgreSQL database
    #[cfg(feature = "postgres")]
    PostgreSQL,
}

impl FromStr for DatabaseType {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            #[cfg(feature = "postgres")]
            "postgresql" | "postgres" => Ok(DatabaseType::PostgreSQL),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

impl Default for DatabaseType {
    #[cfg(feature = "postgres")]
    fn default() -> Self {
        DatabaseType::PostgreSQL
    }

    #[cfg(not(feature = "postgres"))]
    fn default() -> Self {
        DatabaseType::Sqlite
    }
}

/// r2d2 pool of SQLite connections
pub type SqlitePool = r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>;

/// Database connection pool for the configured backend
#[derive(Clone)]
pub enum DatabasePool {
    /// SQLite connection pool
    SQLite(Arc<SqlitePool>),

    /// PostgreSQL connection pool
    #[cfg(feature = "postgres")]
    PostgreSQL(Arc<deadpool_postgres::Pool>),
}

impl fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabasePool::SQLite(pool) => f
                .debug_struct("DatabasePool::SQLite")
                .field("connections", &pool.state().connections)
                .finish(),
            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => f
                .debug_struct("DatabasePool::PostgreSQL")
                .field("size", &pool.status().size)
                .finish(),
        }
    }
}

/// Database error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Invalid or inconsistent configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// SQLite connection pool error
    #[error("SQLite connection pool error: {0}")]
    SqlitePoolError(#[from] r2d2::Error),

    /// PostgreSQL error
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    PostgresError(#[from] tokio_postgres::Error),

    /// PostgreSQL connection pool error
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL connection pool error: {0}")]
    PostgresPoolError(String),

    /// Unsupported database type
    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    /// Schema setup error
    #[error("Database schema error: {0}")]
    SchemaError(String),
}

/// PostgreSQL connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresSettings {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub dbname: String,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            dbname: "bptracker".to_string(),
        }
    }
}

impl PostgresSettings {
    /// Connection URL with the password masked, for logging
    pub fn display_url(&self) -> String {
        format!(
            "postgresql://{}:***@{}:{}/{}",
            self.user, self.host, self.port, self.dbname
        )
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database type (sqlite, postgresql)
    pub db_type: DatabaseType,
    /// Path to the SQLite database file, or `:memory:`
    pub sqlite_path: String,
    /// PostgreSQL connection settings
    pub postgres: PostgresSettings,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection checkout timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::default(),
            sqlite_path: DEFAULT_SQLITE_PATH.to_string(),
            postgres: PostgresSettings::default(),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a database configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to the defaults; set but malformed numeric
    /// values are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DatabaseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let db_type = match lookup("DB_TYPE") {
            Some(raw) => raw.parse::<DatabaseType>()?,
            None => defaults.db_type,
        };

        let postgres = PostgresSettings {
            user: lookup("POSTGRES_USER").unwrap_or(defaults.postgres.user),
            password: lookup("POSTGRES_PASSWORD").unwrap_or(defaults.postgres.password),
            host: lookup("POSTGRES_HOST").unwrap_or(defaults.postgres.host),
            port: parse_var(&lookup, "POSTGRES_PORT", defaults.postgres.port)?,
            dbname: lookup("POSTGRES_DB").unwrap_or(defaults.postgres.dbname),
        };

        let sqlite_path = lookup("DB_SQLITE_PATH").unwrap_or(defaults.sqlite_path);
        let max_connections = parse_var(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?;
        let timeout_seconds = parse_var(&lookup, "DB_TIMEOUT_SECONDS", defaults.timeout_seconds)?;

        if max_connections == 0 {
            return Err(DatabaseError::ConfigError(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        match db_type {
            DatabaseType::Sqlite => info!("Using SQLite database at: {}", sqlite_path),
            #[cfg(feature = "postgres")]
            DatabaseType::PostgreSQL => info!("Using PostgreSQL database at: {}", postgres.display_url()),
        }

        info!(
            "Database configuration: max_connections={}, timeout={}s",
            max_connections, timeout_seconds
        );

        Ok(DatabaseConfig {
            db_type,
            sqlite_path,
            postgres,
            max_connections,
            timeout_seconds,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, DatabaseError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            DatabaseError::ConfigError(format!("{} must be a number, got '{}'", key, raw))
        }),
        None => Ok(default),
    }
}

impl DatabasePool {
    /// Open the configured database and make sure the schema exists
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        info!("Initializing database pool with type: {:?}", config.db_type);

        let pool = match config.db_type {
            DatabaseType::Sqlite if config.sqlite_path == IN_MEMORY_SQLITE_PATH => {
                return Self::sqlite_in_memory();
            }
            DatabaseType::Sqlite => initialize_sqlite_pool(config)?,
            #[cfg(feature = "postgres")]
            DatabaseType::PostgreSQL => initialize_postgres_pool(config)?,
        };

        pool.run_schema_setup().await?;
        Ok(pool)
    }

    /// Create a private in-memory SQLite database with the schema in place.
    ///
    /// Every in-memory connection is its own database, so the pool holds
    /// exactly one connection.
    pub fn sqlite_in_memory() -> Result<Self, DatabaseError> {
        info!("Initializing in-memory SQLite database");

        let manager = r2d2_sqlite::SqliteConnectionManager::memory();
        let pool = r2d2::Pool::builder().max_size(1).build(manager)?;

        let conn = pool.get()?;
        schema::run_sqlite_schema(&conn)?;
        drop(conn);

        Ok(DatabasePool::SQLite(Arc::new(pool)))
    }

    /// Open an existing SQLite file without write access
    pub fn sqlite_read_only(path: &str) -> Result<Self, DatabaseError> {
        info!("Opening SQLite database read-only at: {}", path);

        if !Path::new(path).is_file() {
            return Err(DatabaseError::ConfigError(format!(
                "SQLite database not found at {}",
                path
            )));
        }

        let manager = r2d2_sqlite::SqliteConnectionManager::file(path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX);
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)?;

        Ok(DatabasePool::SQLite(Arc::new(pool)))
    }

    /// Create the readings table and its index if they are missing
    pub async fn run_schema_setup(&self) -> Result<(), DatabaseError> {
        info!("Running database schema setup");

        match self {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                schema::run_sqlite_schema(&conn)?;
            }
            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = pool
                    .get()
                    .await
                    .map_err(|e| DatabaseError::PostgresPoolError(e.to_string()))?;
                schema::run_postgres_schema(&client).await?;
            }
        }

        info!("Database schema setup completed successfully");
        Ok(())
    }

    /// Round-trip a trivial query to prove the database is reachable
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        match self {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            }
            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = pool
                    .get()
                    .await
                    .map_err(|e| DatabaseError::PostgresPoolError(e.to_string()))?;
                client.query_one("SELECT 1", &[]).await?;
            }
        }

        Ok(())
    }

    /// Human-readable description of the backing database
    pub fn describe(&self) -> String {
        match self {
            DatabasePool::SQLite(pool) => {
                let location = match pool.get() {
                    Ok(conn) => match conn.query_row("PRAGMA database_list", [], |row| {
                        row.get::<_, String>(2)
                    }) {
                        Ok(path) if path.is_empty() => "SQLite in-memory database".to_string(),
                        Ok(path) => format!("SQLite database at {}", path),
                        Err(_) => "SQLite database (path unknown)".to_string(),
                    },
                    Err(e) => {
                        error!("Failed to get SQLite connection: {}", e);
                        return format!("SQLite connection error: {}", e);
                    }
                };

                let state = pool.state();
                format!(
                    "{} (connections: active={}, idle={})",
                    location, state.connections, state.idle_connections
                )
            }
            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let status = pool.status();
                format!(
                    "PostgreSQL database (size={}, available={})",
                    status.size, status.available
                )
            }
        }
    }
}

/// Initialize a file-backed SQLite connection pool
fn initialize_sqlite_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    let sqlite_path = &config.sqlite_path;
    info!("Initializing SQLite database at: {}", sqlite_path);

    if let Some(parent) = Path::new(sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::ConfigError(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let manager = r2d2_sqlite::SqliteConnectionManager::file(sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    let pool = r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)?;

    info!("SQLite connection pool created successfully");
    Ok(DatabasePool::SQLite(Arc::new(pool)))
}

/// Initialize PostgreSQL connection pool
#[cfg(feature = "postgres")]
fn initialize_postgres_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    use deadpool_postgres::{Config, ManagerConfig, PoolConfig, RecyclingMethod, Runtime};

    let settings = &config.postgres;
    info!("Initializing PostgreSQL pool for {}", settings.display_url());

    let mut pool_config = Config::new();
    pool_config.user = Some(settings.user.clone());
    pool_config.password = Some(settings.password.clone());
    pool_config.host = Some(settings.host.clone());
    pool_config.port = Some(settings.port);
    pool_config.dbname = Some(settings.dbname.clone());
    pool_config.connect_timeout = Some(Duration::from_secs(config.timeout_seconds));
    pool_config.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    pool_config.pool = Some(PoolConfig {
        max_size: config.max_connections as usize,
        ..Default::default()
    });

    let pool = pool_config
        .create_pool(Some(Runtime::Tokio1), tokio_postgres::NoTls)
        .map_err(|e| {
            DatabaseError::PostgresPoolError(format!("Failed to create PostgreSQL pool: {}", e))
        })?;

    Ok(DatabasePool::PostgreSQL(Arc::new(pool)))
}
