//! Domain models for persisted country records and derived snapshots.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A country entry after the currency/rate join, as stored.
///
/// `name` is the unique key: lookups and deletes are case-insensitive while
/// the stored spelling is preserved. `last_refreshed_at` is maintained by the
/// storage layer on every write; it is `None` only on records that have not
/// been persisted yet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NormalizedCountry {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<Decimal>,
    /// Synthetic economic proxy, not a real GDP figure.
    ///
    /// `None` means the currency is known but no rate was available;
    /// exactly zero means the country has no standalone currency.
    pub estimated_gdp: Option<Decimal>,
    pub flag_url: Option<String>,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

/// Filters for listing countries. Supplied filters are combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryFilters {
    pub region: Option<String>,
    pub currency: Option<String>,
}

/// The closed set of sortable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    EstimatedGdp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A validated sort request. Queries are only ever built from this enum,
/// never from caller-supplied SQL fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountrySort {
    pub field: SortField,
    pub order: SortOrder,
}

impl CountrySort {
    /// Parse the wire format (`gdp_asc` / `gdp_desc`). Anything else is not
    /// a sort request.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "gdp_asc" => Some(Self {
                field: SortField::EstimatedGdp,
                order: SortOrder::Asc,
            }),
            "gdp_desc" => Some(Self {
                field: SortField::EstimatedGdp,
                order: SortOrder::Desc,
            }),
            _ => None,
        }
    }
}

/// Derived status over the persisted set; computed on demand, never stored.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub total_countries: i64,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

/// One entry of the top-N-by-estimate ranking.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TopCountry {
    pub name: String,
    pub estimated_gdp: Decimal,
}
