//! File-based organization storage

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;

use super::model::Organization;
use super::repository::OrganizationRepository;
use crate::store::{InsertOutcome, JsonTable, RowUpdate};
use crate::{Error, Result};

pub struct FileOrganizationStore {
    table: JsonTable<Organization>,
}

impl FileOrganizationStore {
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            table: JsonTable::open(path).await?,
        })
    }
}

#[async_trait]
impl OrganizationRepository for FileOrganizationStore {
    async fn create(&self, organization: Organization) -> Result<Organization> {
        match self.table.insert_if_absent(organization).await? {
            InsertOutcome::Inserted(created) => Ok(created),
            InsertOutcome::Existing(existing) => Err(Error::Conflict(format!(
                "Organization {} already exists",
                existing.organization_code
            ))),
        }
    }

    async fn get(&self, code: &str) -> Result<Option<Organization>> {
        Ok(self.table.get(&code.to_string()).await)
    }

    async fn list(&self) -> Result<Vec<Organization>> {
        let mut organizations = self.table.list_where(|_| true).await;
        organizations.sort_by(|a, b| a.organization_code.cmp(&b.organization_code));
        Ok(organizations)
    }

    async fn update(&self, code: &str, apply: RowUpdate<Organization>) -> Result<Organization> {
        self.table
            .update(&code.to_string(), |organization| {
                apply(organization)?;
                organization.updated_at = Utc::now();
                Ok(())
            })
            .await?
            .ok_or_else(|| Error::not_found("Organization", code))
    }

    async fn delete(&self, code: &str) -> Result<bool> {
        Ok(self.table.remove(&code.to_string()).await?.is_some())
    }
}
