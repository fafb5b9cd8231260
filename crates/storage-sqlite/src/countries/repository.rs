use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use diesel::dsl::{count_star, max};
use diesel::prelude::*;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::countries::model::{CountryDB, NewCountryDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::countries;
use econatlas_core::countries::{
    CountryFilters, CountryRepositoryTrait, CountrySort, NormalizedCountry, SortField, SortOrder,
    StatusSnapshot, TopCountry,
};
use econatlas_core::errors::Result;

/// Diesel-backed implementation of the country repository.
///
/// Reads go straight to the pool; writes are funneled through the
/// single-writer actor so concurrent upserts of the same name settle on
/// last-write-wins with each row applied atomically.
#[derive(Clone)]
pub struct CountryRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CountryRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CountryRepositoryTrait for CountryRepository {
    async fn upsert_all(&self, records: Vec<NormalizedCountry>) -> Result<usize> {
        let total = records.len();

        // One writer job per record: upserts within a refresh carry no
        // ordering dependency, and a failure mid-batch leaves previously
        // applied rows in place rather than rolling the whole batch back.
        let jobs: Vec<_> = records
            .iter()
            .map(|record| {
                let row = NewCountryDB::from(record);
                self.writer.exec(move |conn| {
                    diesel::insert_into(countries::table)
                        .values(&row)
                        .on_conflict(countries::name)
                        .do_update()
                        .set(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    Ok(())
                })
            })
            .collect();

        futures::future::try_join_all(jobs).await?;
        Ok(total)
    }

    fn get_all(
        &self,
        filters: &CountryFilters,
        sort: Option<CountrySort>,
    ) -> Result<Vec<NormalizedCountry>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = countries::table.into_boxed();
        if let Some(region) = &filters.region {
            query = query.filter(countries::region.eq(region.clone()));
        }
        if let Some(currency) = &filters.currency {
            query = query.filter(countries::currency_code.eq(currency.clone()));
        }
        if let Some(sort) = sort {
            query = match (sort.field, sort.order) {
                (SortField::EstimatedGdp, SortOrder::Asc) => {
                    query.order(countries::estimated_gdp.asc())
                }
                (SortField::EstimatedGdp, SortOrder::Desc) => {
                    query.order(countries::estimated_gdp.desc())
                }
            };
        }

        let rows = query
            .load::<CountryDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(NormalizedCountry::from).collect())
    }

    fn get_by_name(&self, name: &str) -> Result<Option<NormalizedCountry>> {
        let mut conn = get_connection(&self.pool)?;

        // The column's NOCASE collation makes this match case-insensitively.
        let row = countries::table
            .filter(countries::name.eq(name))
            .first::<CountryDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(NormalizedCountry::from))
    }

    async fn delete_by_name(&self, name: &str) -> Result<bool> {
        let name = name.to_string();
        let deleted = self
            .writer
            .exec(move |conn| {
                diesel::delete(countries::table.filter(countries::name.eq(&name)))
                    .execute(conn)
                    .map_err(|e| StorageError::from(e).into())
            })
            .await?;
        Ok(deleted > 0)
    }

    fn get_status(&self) -> Result<StatusSnapshot> {
        let mut conn = get_connection(&self.pool)?;

        let (total_countries, last_refreshed_at) = countries::table
            .select((count_star(), max(countries::last_refreshed_at)))
            .first::<(i64, Option<NaiveDateTime>)>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(StatusSnapshot {
            total_countries,
            last_refreshed_at: last_refreshed_at.map(|at| Utc.from_utc_datetime(&at)),
        })
    }

    fn get_top_by_estimate(&self, limit: i64) -> Result<Vec<TopCountry>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = countries::table
            .filter(countries::estimated_gdp.is_not_null())
            .order(countries::estimated_gdp.desc())
            .limit(limit)
            .select((countries::name, countries::estimated_gdp))
            .load::<(String, Option<f64>)>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows
            .into_iter()
            .filter_map(|(name, estimated_gdp)| {
                estimated_gdp
                    .and_then(Decimal::from_f64)
                    .map(|estimated_gdp| TopCountry {
                        name,
                        estimated_gdp,
                    })
            })
            .collect())
    }
}
