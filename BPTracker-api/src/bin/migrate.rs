//! Copy every blood pressure reading from the local SQLite database into
//! PostgreSQL, keeping ids and moving the id sequence past them.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bp_tracker_data::database::{DatabaseConfig, DatabasePool, DatabaseType};
use bp_tracker_data::migrate_readings;

#[derive(Debug, Parser)]
#[command(name = "bp-tracker-migrate", version, about = "Migrate BPTracker readings from SQLite to PostgreSQL")]
struct Cli {
    /// SQLite database to read from; it is opened read-only
    #[arg(long, env = "SQLITE_DB_PATH", default_value = "bptracker.db")]
    sqlite_path: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if !cli.sqlite_path.is_file() {
        error!("SQLite database not found at {}", cli.sqlite_path.display());
        bail!("SQLite database not found at {}", cli.sqlite_path.display());
    }

    let sqlite_path = cli.sqlite_path.to_string_lossy().to_string();
    let source = DatabasePool::sqlite_read_only(&sqlite_path)
        .with_context(|| format!("failed to open {}", sqlite_path))?;

    // The target is always PostgreSQL, whatever DB_TYPE the server uses
    let target_config = DatabaseConfig {
        db_type: DatabaseType::PostgreSQL,
        ..DatabaseConfig::from_env().context("invalid database configuration")?
    };
    info!("Migrating {} into {}", sqlite_path, target_config.postgres.display_url());

    let target = DatabasePool::connect(&target_config)
        .await
        .context("failed to connect to PostgreSQL")?;

    let report = migrate_readings(&source, &target)
        .await
        .context("migration failed, no rows were committed")?;

    info!(
        "Migration completed successfully: {} readings migrated, next id {}",
        report.migrated, report.next_id
    );
    Ok(())
}
