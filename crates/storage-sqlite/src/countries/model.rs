//! Database models for country rows.

use chrono::{NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use econatlas_core::countries::NormalizedCountry;

/// Database model for a stored country row.
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::countries)]
#[diesel(primary_key(name))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CountryDB {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
    pub last_refreshed_at: NaiveDateTime,
}

/// Write model for upserts. Leaves `last_refreshed_at` to the database:
/// the column default covers inserts and a trigger covers updates.
/// `treat_none_as_null` so a vanished capital or rate overwrites the stored
/// value instead of being skipped.
#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::countries)]
#[diesel(treat_none_as_null = true)]
pub struct NewCountryDB {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
}

impl From<CountryDB> for NormalizedCountry {
    fn from(db: CountryDB) -> Self {
        NormalizedCountry {
            name: db.name,
            capital: db.capital,
            region: db.region,
            population: db.population,
            currency_code: db.currency_code,
            exchange_rate: db.exchange_rate.and_then(Decimal::from_f64),
            estimated_gdp: db.estimated_gdp.and_then(Decimal::from_f64),
            flag_url: db.flag_url,
            last_refreshed_at: Some(Utc.from_utc_datetime(&db.last_refreshed_at)),
        }
    }
}

impl From<&NormalizedCountry> for NewCountryDB {
    fn from(record: &NormalizedCountry) -> Self {
        NewCountryDB {
            name: record.name.clone(),
            capital: record.capital.clone(),
            region: record.region.clone(),
            population: record.population,
            currency_code: record.currency_code.clone(),
            exchange_rate: record.exchange_rate.as_ref().and_then(Decimal::to_f64),
            estimated_gdp: record.estimated_gdp.as_ref().and_then(Decimal::to_f64),
            flag_url: record.flag_url.clone(),
        }
    }
}
