//! External source adapters for the country data service.
//!
//! This crate is the only place that talks to the two upstream providers:
//! the restcountries.com country directory and the open.er-api.com exchange
//! rate feed. Each adapter performs a single bounded network call and
//! normalizes the provider's response into this system's raw data shapes.
//! Transport failures, timeouts and non-success responses all surface as a
//! typed [`SourceError`]; an adapter never returns partial data.
//!
//! Retry policy deliberately does not live here - a failed fetch is reported
//! to the caller and the caller decides what to do about it.

pub mod countries;
pub mod errors;
pub mod models;
pub mod rates;

pub use countries::{CountrySource, RestCountriesClient};
pub use errors::SourceError;
pub use models::{RateTable, RawCountry};
pub use rates::{OpenErApiClient, RateSource};
