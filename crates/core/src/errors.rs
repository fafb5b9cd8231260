//! Core error types for the country data service.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage
//! layer; adapter errors arrive already typed as [`SourceError`].

use thiserror::Error;

use crate::summary::RenderError;
use econatlas_sources::SourceError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the service.
///
/// The HTTP layer maps these onto status codes: `Source` is an upstream
/// dependency problem (503), everything else is internal (500). Missing
/// rows are not errors at all - lookups return `Option` and deletes return
/// `bool`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("External source unavailable: {0}")]
    Source(#[from] SourceError),

    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Summary rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
