//! File-based event storage

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;

use super::model::Event;
use super::repository::EventRepository;
use crate::store::{InsertOutcome, JsonTable, RowUpdate};
use crate::{Error, Result};

pub struct FileEventStore {
    table: JsonTable<Event>,
}

impl FileEventStore {
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            table: JsonTable::open(path).await?,
        })
    }
}

#[async_trait]
impl EventRepository for FileEventStore {
    async fn create(&self, event: Event) -> Result<Event> {
        match self.table.insert_if_absent(event).await? {
            InsertOutcome::Inserted(created) => Ok(created),
            InsertOutcome::Existing(existing) => Err(Error::Conflict(format!(
                "Event {} already exists",
                existing.event_code
            ))),
        }
    }

    async fn get(&self, code: &str) -> Result<Option<Event>> {
        Ok(self.table.get(&code.to_string()).await)
    }

    async fn list(&self, organization_code: Option<&str>) -> Result<Vec<Event>> {
        let mut events = self
            .table
            .list_where(|e| organization_code.map_or(true, |org| e.organization_code == org))
            .await;
        events.sort_by(|a, b| b.event_date_time.cmp(&a.event_date_time));
        Ok(events)
    }

    async fn update(&self, code: &str, apply: RowUpdate<Event>) -> Result<Event> {
        self.table
            .update(&code.to_string(), |event| {
                apply(event)?;
                event.updated_at = Utc::now();
                Ok(())
            })
            .await?
            .ok_or_else(|| Error::not_found("Event", code))
    }

    async fn delete(&self, code: &str) -> Result<bool> {
        Ok(self.table.remove(&code.to_string()).await?.is_some())
    }

    async fn count_for_organization(&self, organization_code: &str) -> Result<usize> {
        Ok(self
            .table
            .count_where(|e| e.organization_code == organization_code)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    async fn create_test_store() -> (FileEventStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileEventStore::new(temp_dir.path().join("events.json"))
            .await
            .unwrap();
        (store, temp_dir)
    }

    fn event(org: &str, days_from_now: i64) -> Event {
        let start = Utc::now() + Duration::days(days_from_now);
        Event::new(org, "Meetup", start, start + Duration::hours(3))
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts_newest_first() {
        let (store, _temp) = create_test_store().await;
        let older = store.create(event("awskrug", -10)).await.unwrap();
        let newer = store.create(event("awskrug", 5)).await.unwrap();
        store.create(event("ausg", 0)).await.unwrap();

        let listed = store.list(Some("awskrug")).await.unwrap();
        let codes: Vec<&str> = listed.iter().map(|e| e.event_code.as_str()).collect();
        assert_eq!(codes, vec![newer.event_code.as_str(), older.event_code.as_str()]);

        assert_eq!(store.list(None).await.unwrap().len(), 3);
        assert_eq!(store.count_for_organization("ausg").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let (store, _temp) = create_test_store().await;
        let created = store.create(event("awskrug", 0)).await.unwrap();

        assert!(store.delete(&created.event_code).await.unwrap());
        assert!(!store.delete(&created.event_code).await.unwrap());
    }
}
