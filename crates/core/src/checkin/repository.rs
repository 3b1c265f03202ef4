//! Check-in repository trait

use async_trait::async_trait;

use super::model::CheckIn;
use crate::store::{InsertOutcome, RowUpdate};
use crate::Result;

#[async_trait]
pub trait CheckInRepository: Send + Sync {
    /// Create-if-absent on (event_code, phone). Concurrent callers for the same
    /// key observe exactly one `Inserted`.
    async fn insert_if_absent(&self, checkin: CheckIn) -> Result<InsertOutcome<CheckIn>>;

    async fn get(&self, event_code: &str, phone: &str) -> Result<Option<CheckIn>>;

    /// Check-ins of an event, earliest first
    async fn list(&self, event_code: &str) -> Result<Vec<CheckIn>>;

    /// Edit a check-in in place under the store lock; `NotFound` if absent
    async fn update(
        &self,
        event_code: &str,
        phone: &str,
        apply: RowUpdate<CheckIn>,
    ) -> Result<CheckIn>;

    async fn delete(&self, event_code: &str, phone: &str) -> Result<Option<CheckIn>>;

    async fn count(&self, event_code: &str) -> Result<usize>;
}
