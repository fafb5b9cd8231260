//! EconAtlas Core - Domain entities, services, and traits.
//!
//! This crate contains the core business logic of the country data service:
//! the normalized country model, the currency/rate join and GDP estimation
//! engine, the refresh orchestrator, and the repository traits that the
//! `storage-sqlite` crate implements. It is database-agnostic.

pub mod countries;
pub mod errors;
pub mod refresh;
pub mod summary;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
