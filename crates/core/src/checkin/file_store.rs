//! File-based check-in storage

use async_trait::async_trait;
use std::path::PathBuf;

use super::model::CheckIn;
use super::repository::CheckInRepository;
use crate::store::{InsertOutcome, JsonTable, RowUpdate};
use crate::{Error, Result};

pub struct FileCheckInStore {
    table: JsonTable<CheckIn>,
}

impl FileCheckInStore {
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            table: JsonTable::open(path).await?,
        })
    }
}

fn key(event_code: &str, phone: &str) -> (String, String) {
    (event_code.to_string(), phone.to_string())
}

fn chronological(rows: &mut [CheckIn]) {
    rows.sort_by(|a, b| {
        a.checked_at
            .cmp(&b.checked_at)
            .then_with(|| a.phone.cmp(&b.phone))
    });
}

#[async_trait]
impl CheckInRepository for FileCheckInStore {
    async fn insert_if_absent(&self, checkin: CheckIn) -> Result<InsertOutcome<CheckIn>> {
        self.table.insert_if_absent(checkin).await
    }

    async fn get(&self, event_code: &str, phone: &str) -> Result<Option<CheckIn>> {
        Ok(self.table.get(&key(event_code, phone)).await)
    }

    async fn list(&self, event_code: &str) -> Result<Vec<CheckIn>> {
        let mut checkins = self.table.list_where(|c| c.event_code == event_code).await;
        chronological(&mut checkins);
        Ok(checkins)
    }

    async fn update(
        &self,
        event_code: &str,
        phone: &str,
        apply: RowUpdate<CheckIn>,
    ) -> Result<CheckIn> {
        self.table
            .update(&key(event_code, phone), apply)
            .await?
            .ok_or_else(|| Error::not_found("Check-in", format!("{}/{}", event_code, phone)))
    }

    async fn delete(&self, event_code: &str, phone: &str) -> Result<Option<CheckIn>> {
        self.table.remove(&key(event_code, phone)).await
    }

    async fn count(&self, event_code: &str) -> Result<usize> {
        Ok(self.table.count_where(|c| c.event_code == event_code).await)
    }
}
