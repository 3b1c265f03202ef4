//! Event repository trait

use async_trait::async_trait;

use super::model::Event;
use crate::store::RowUpdate;
use crate::Result;

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Store a new event; `Conflict` if the code is taken
    async fn create(&self, event: Event) -> Result<Event>;

    async fn get(&self, code: &str) -> Result<Option<Event>>;

    /// Events, newest event date first, optionally restricted to one organization
    async fn list(&self, organization_code: Option<&str>) -> Result<Vec<Event>>;

    /// Edit an event in place under the store lock; `NotFound` if absent
    async fn update(&self, code: &str, apply: RowUpdate<Event>) -> Result<Event>;

    async fn delete(&self, code: &str) -> Result<bool>;

    async fn count_for_organization(&self, organization_code: &str) -> Result<usize>;
}
