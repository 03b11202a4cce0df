// Schema setup for each supported backend.
// All statements are idempotent and safe to run on every start.

mod sqlite;
pub use sqlite::run_schema as run_sqlite_schema;

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "postgres")]
pub use postgres::run_schema as run_postgres_schema;
