//! Country domain: normalized records, the currency/rate join, and the
//! persistence contract.

pub mod model;
pub mod normalize;
pub mod repository;
pub mod service;

pub use model::{
    CountryFilters, CountrySort, NormalizedCountry, SortField, SortOrder, StatusSnapshot,
    TopCountry,
};
pub use normalize::{normalize, FixedMultiplier, GdpMultiplier, UniformMultiplier};
pub use repository::CountryRepositoryTrait;
pub use service::CountryService;
