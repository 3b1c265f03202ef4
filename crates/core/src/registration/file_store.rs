//! File-based registration storage

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;

use super::model::Registration;
use super::repository::RegistrationRepository;
use crate::store::{InsertOutcome, JsonTable, RowUpdate};
use crate::{Error, Result};

pub struct FileRegistrationStore {
    table: JsonTable<Registration>,
}

impl FileRegistrationStore {
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            table: JsonTable::open(path).await?,
        })
    }
}

fn key(event_code: &str, phone: &str) -> (String, String) {
    (event_code.to_string(), phone.to_string())
}

fn creation_order(rows: &mut [Registration]) {
    rows.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.phone.cmp(&b.phone))
    });
}

#[async_trait]
impl RegistrationRepository for FileRegistrationStore {
    async fn insert_if_absent(
        &self,
        registration: Registration,
    ) -> Result<InsertOutcome<Registration>> {
        self.table.insert_if_absent(registration).await
    }

    async fn insert_many_if_absent(
        &self,
        registrations: Vec<Registration>,
    ) -> Result<Vec<InsertOutcome<Registration>>> {
        self.table.insert_many_if_absent(registrations).await
    }

    async fn get(&self, event_code: &str, phone: &str) -> Result<Option<Registration>> {
        Ok(self.table.get(&key(event_code, phone)).await)
    }

    async fn find_by_tail(&self, event_code: &str, tail: &str) -> Result<Vec<Registration>> {
        let mut matches = self
            .table
            .list_where(|r| r.event_code == event_code && r.phone_tail.as_deref() == Some(tail))
            .await;
        creation_order(&mut matches);
        Ok(matches)
    }

    async fn list(&self, event_code: &str) -> Result<Vec<Registration>> {
        let mut registrations = self.table.list_where(|r| r.event_code == event_code).await;
        creation_order(&mut registrations);
        Ok(registrations)
    }

    async fn update(
        &self,
        event_code: &str,
        phone: &str,
        apply: RowUpdate<Registration>,
    ) -> Result<Registration> {
        self.table
            .update(&key(event_code, phone), |registration| {
                apply(registration)?;
                registration.updated_at = Utc::now();
                Ok(())
            })
            .await?
            .ok_or_else(|| Error::not_found("Registration", format!("{}/{}", event_code, phone)))
    }

    async fn delete(&self, event_code: &str, phone: &str) -> Result<Option<Registration>> {
        self.table.remove(&key(event_code, phone)).await
    }

    async fn count(&self, event_code: &str) -> Result<usize> {
        Ok(self.table.count_where(|r| r.event_code == event_code).await)
    }
}
