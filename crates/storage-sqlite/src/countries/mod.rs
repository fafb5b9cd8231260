//! SQLite-backed country repository.

pub mod model;
pub mod repository;

pub use model::{CountryDB, NewCountryDB};
pub use repository::CountryRepository;
