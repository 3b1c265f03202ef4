use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;
use tracing::warn;

use checkin_core::{Error, Result};

use super::{AuditEvent, AuditListQuery};

/// Events are kept in memory and mirrored to `events.jsonl`, one JSON object
/// per line.
pub struct AuditStore {
    events_path: PathBuf,
    events: RwLock<Vec<AuditEvent>>,
}

fn trim_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn matches_action_filter(action: &str, filter: Option<&str>) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    action.to_lowercase().contains(filter)
}

impl AuditStore {
    pub async fn new(root_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root_dir).await?;
        let events_path = root_dir.join("events.jsonl");

        if fs::metadata(&events_path).await.is_err() {
            fs::File::create(&events_path).await?;
        }

        let events = Self::load_events(&events_path).await?;
        Ok(Self {
            events_path,
            events: RwLock::new(events),
        })
    }

    async fn load_events(path: &Path) -> Result<Vec<AuditEvent>> {
        let file = fs::File::open(path).await?;
        let mut reader = BufReader::new(file).lines();
        let mut events = Vec::new();

        while let Some(line) = reader.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<AuditEvent>(&line) {
                Ok(event) => events.push(event),
                Err(err) => warn!(
                    "Ignoring malformed audit event in {}: {}",
                    path.display(),
                    err
                ),
            }
        }

        Ok(events)
    }

    pub async fn append(&self, event: AuditEvent) -> Result<()> {
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');

        // Held across the file write so lines land in memory order
        let mut state = self.events.write().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.events_path)
            .await
            .map_err(|err| Error::Storage(format!("Failed to open audit log: {}", err)))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|err| Error::Storage(format!("Failed to write audit log: {}", err)))?;
        file.flush()
            .await
            .map_err(|err| Error::Storage(format!("Failed to flush audit log: {}", err)))?;

        state.push(event);
        Ok(())
    }

    /// Newest first, filtered by event and by action substring.
    pub async fn list_paginated(&self, query: &AuditListQuery) -> (Vec<AuditEvent>, bool) {
        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(100).clamp(1, 1000);
        let event_filter = trim_to_none(query.event_code.clone());
        let action_filter = trim_to_none(query.action.clone()).map(|value| value.to_lowercase());

        let state = self.events.read().await;
        let mut matched = 0usize;
        let mut events = Vec::with_capacity(limit);

        for event in state.iter().rev() {
            if let Some(event_code) = event_filter.as_deref() {
                if event.event_code.as_deref() != Some(event_code) {
                    continue;
                }
            }

            if !matches_action_filter(&event.action, action_filter.as_deref()) {
                continue;
            }

            if matched < offset {
                matched += 1;
                continue;
            }

            if events.len() < limit {
                events.push(event.clone());
            }
            matched += 1;
        }

        let has_more = matched > offset + events.len();
        (events, has_more)
    }
}
