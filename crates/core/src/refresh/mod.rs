//! The refresh pipeline: fetch, join, persist, aggregate, render.

pub mod service;

pub use service::{RefreshService, RefreshSummary};
