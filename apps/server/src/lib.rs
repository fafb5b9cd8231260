//! HTTP server for the country data service.
//!
//! Thin axum layer over `econatlas-core`: route handlers parse the request,
//! call a service, and map the result onto the wire contract. All domain
//! behavior lives in the core crate.

pub mod api;
pub mod config;
pub mod error;
pub mod main_lib;
pub mod scheduler;

pub use main_lib::{build_state, init_tracing, AppState};
