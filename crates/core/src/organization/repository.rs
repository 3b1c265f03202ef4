//! Organization repository trait

use async_trait::async_trait;

use super::model::Organization;
use crate::store::RowUpdate;
use crate::Result;

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Store a new organization; `Conflict` if the code is taken
    async fn create(&self, organization: Organization) -> Result<Organization>;

    async fn get(&self, code: &str) -> Result<Option<Organization>>;

    /// All organizations, ordered by code
    async fn list(&self) -> Result<Vec<Organization>>;

    /// Edit an organization in place under the store lock; `NotFound` if absent
    async fn update(&self, code: &str, apply: RowUpdate<Organization>) -> Result<Organization>;

    async fn delete(&self, code: &str) -> Result<bool>;
}
