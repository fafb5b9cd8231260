//! Read-side service over the country repository.

use std::sync::Arc;

use super::model::{CountryFilters, CountrySort, NormalizedCountry, StatusSnapshot};
use super::repository::CountryRepositoryTrait;
use crate::errors::Result;

/// Query facade used by the HTTP layer. Refreshing is the orchestrator's
/// job; this service only reads and deletes.
#[derive(Clone)]
pub struct CountryService {
    repository: Arc<dyn CountryRepositoryTrait>,
}

impl CountryService {
    pub fn new(repository: Arc<dyn CountryRepositoryTrait>) -> Self {
        Self { repository }
    }

    pub fn get_countries(
        &self,
        filters: &CountryFilters,
        sort: Option<CountrySort>,
    ) -> Result<Vec<NormalizedCountry>> {
        self.repository.get_all(filters, sort)
    }

    pub fn get_country(&self, name: &str) -> Result<Option<NormalizedCountry>> {
        self.repository.get_by_name(name)
    }

    pub async fn delete_country(&self, name: &str) -> Result<bool> {
        self.repository.delete_by_name(name).await
    }

    pub fn get_status(&self) -> Result<StatusSnapshot> {
        self.repository.get_status()
    }
}
