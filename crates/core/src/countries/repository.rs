//! Persistence contract for normalized country records.

use async_trait::async_trait;

use super::model::{
    CountryFilters, CountrySort, NormalizedCountry, StatusSnapshot, TopCountry,
};
use crate::errors::Result;

/// Repository contract for the `countries` collection, keyed by name.
///
/// Name matching is case-insensitive for lookups and deletes while the
/// stored spelling is preserved. Writes are async and funnel through the
/// storage layer's single writer, so concurrent upserts of the same key
/// resolve to last-write-wins with each record applied atomically. Reads
/// are plain pooled queries and never wait on an in-flight refresh.
#[async_trait]
pub trait CountryRepositoryTrait: Send + Sync {
    /// Insert or overwrite each record by name. Re-applying the same batch
    /// leaves the stored state unchanged apart from `last_refreshed_at`,
    /// which the storage layer bumps on every write. Returns the number of
    /// records applied.
    async fn upsert_all(&self, records: Vec<NormalizedCountry>) -> Result<usize>;

    /// All records matching every supplied filter, optionally ordered.
    /// Without a sort the storage-native order is returned.
    fn get_all(
        &self,
        filters: &CountryFilters,
        sort: Option<CountrySort>,
    ) -> Result<Vec<NormalizedCountry>>;

    fn get_by_name(&self, name: &str) -> Result<Option<NormalizedCountry>>;

    /// Returns true iff a row existed and was removed.
    async fn delete_by_name(&self, name: &str) -> Result<bool>;

    /// Row count and most recent refresh timestamp (None when empty).
    fn get_status(&self) -> Result<StatusSnapshot>;

    /// Top `limit` records by estimate, descending, excluding unknown
    /// estimates.
    fn get_top_by_estimate(&self, limit: i64) -> Result<Vec<TopCountry>>;
}
