//! Raw data shapes produced by the source adapters.
//!
//! These types are ephemeral: they live for the duration of one refresh
//! cycle and are never persisted as-is.

use rust_decimal::Decimal;
use std::collections::HashMap;

/// A country entry as reported by the countries directory, before the
/// currency/rate join.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCountry {
    /// Country name as the provider spells it.
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    /// Non-negative by provider contract.
    pub population: i64,
    /// Currency codes in provider order; empty when the country has no
    /// standalone currency.
    pub currency_codes: Vec<String>,
    pub flag_url: Option<String>,
}

impl RawCountry {
    /// The currency the join uses: the first code the provider lists.
    pub fn primary_currency(&self) -> Option<&str> {
        self.currency_codes.first().map(String::as_str)
    }
}

/// Exchange rates keyed by currency code, all relative to the feed's base
/// currency (USD). Rates are strictly positive; the adapter drops anything
/// else before handing the table over.
pub type RateTable = HashMap<String, Decimal>;
