// Database modules
pub mod connection;
pub mod schema;

// Re-export database connection types
pub use connection::*;
