//! Registration repository trait

use async_trait::async_trait;

use super::model::Registration;
use crate::store::{InsertOutcome, RowUpdate};
use crate::Result;

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Create-if-absent on (event_code, phone)
    async fn insert_if_absent(
        &self,
        registration: Registration,
    ) -> Result<InsertOutcome<Registration>>;

    /// Create-if-absent for a batch; one outcome per input, in order
    async fn insert_many_if_absent(
        &self,
        registrations: Vec<Registration>,
    ) -> Result<Vec<InsertOutcome<Registration>>>;

    async fn get(&self, event_code: &str, phone: &str) -> Result<Option<Registration>>;

    /// Registrations of an event whose recorded phone tail equals `tail`
    async fn find_by_tail(&self, event_code: &str, tail: &str) -> Result<Vec<Registration>>;

    /// Registrations of an event in creation order
    async fn list(&self, event_code: &str) -> Result<Vec<Registration>>;

    /// Edit a registration in place under the store lock; `NotFound` if absent
    async fn update(
        &self,
        event_code: &str,
        phone: &str,
        apply: RowUpdate<Registration>,
    ) -> Result<Registration>;

    async fn delete(&self, event_code: &str, phone: &str) -> Result<Option<Registration>>;

    async fn count(&self, event_code: &str) -> Result<usize>;
}
