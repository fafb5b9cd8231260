//! SQLite storage implementation for the country data service.
//!
//! This crate is the only place in the workspace where Diesel dependencies
//! exist. It provides:
//! - Connection pooling with an explicit lifecycle (created at startup,
//!   injected into repositories - no module-level singleton)
//! - Embedded migrations, run as a blocking step before the service accepts
//!   requests
//! - A single-writer actor that serializes all mutations, so each record's
//!   upsert is atomic and overlapping refreshes resolve to last-write-wins
//! - The [`CountryRepository`](countries::CountryRepository) implementing
//!   the repository trait defined in `econatlas-core`

pub mod countries;
pub mod db;
pub mod errors;
pub mod schema;

// Re-export database utilities
pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool, WriteHandle};

// Re-export storage errors
pub use errors::StorageError;

// Re-export from econatlas-core for convenience
pub use econatlas_core::errors::{DatabaseError, Error, Result};
