//! Persistence primitives shared by the entity stores

mod json_table;

use std::path::Path;
use std::sync::Arc;

pub use json_table::{InsertOutcome, JsonTable, Keyed};

/// In-place edit applied to one row under the table's write lock. An `Err`
/// leaves the stored row untouched.
pub type RowUpdate<T> = Box<dyn FnOnce(&mut T) -> Result<()> + Send>;

use crate::checkin::{CheckInRepository, FileCheckInStore};
use crate::event::{EventRepository, FileEventStore};
use crate::organization::{FileOrganizationStore, OrganizationRepository};
use crate::registration::{FileRegistrationStore, RegistrationRepository};
use crate::Result;

/// One handle per entity table. Cloning shares the underlying stores.
#[derive(Clone)]
pub struct Stores {
    pub organizations: Arc<dyn OrganizationRepository>,
    pub events: Arc<dyn EventRepository>,
    pub registrations: Arc<dyn RegistrationRepository>,
    pub checkins: Arc<dyn CheckInRepository>,
}

impl Stores {
    /// Open (or create) the JSON tables under `data_dir`.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        Ok(Self {
            organizations: Arc::new(
                FileOrganizationStore::new(data_dir.join("organizations.json")).await?,
            ),
            events: Arc::new(FileEventStore::new(data_dir.join("events.json")).await?),
            registrations: Arc::new(
                FileRegistrationStore::new(data_dir.join("registrations.json")).await?,
            ),
            checkins: Arc::new(FileCheckInStore::new(data_dir.join("checkins.json")).await?),
        })
    }
}
