//! Event model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Keyed;

/// Event code the kiosk page falls back to when its URL carries none
pub const KIOSK_FALLBACK_EVENT_CODE: &str = "test";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Generated at creation, immutable
    pub event_code: String,

    /// Owning organization, immutable after creation
    pub organization_code: String,

    pub event_name: String,

    #[serde(default)]
    pub description: String,

    pub event_date_time: DateTime<Utc>,

    /// Check-in is refused after this instant
    pub code_expired_at: DateTime<Utc>,

    #[serde(default)]
    pub event_version: String,

    /// Kiosk URL encoded into the event's QR code
    #[serde(default)]
    pub qr_url: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(
        organization_code: impl Into<String>,
        event_name: impl Into<String>,
        event_date_time: DateTime<Utc>,
        code_expired_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            event_code: Uuid::new_v4().to_string(),
            organization_code: organization_code.into(),
            event_name: event_name.into(),
            description: String::new(),
            event_date_time,
            code_expired_at,
            event_version: String::new(),
            qr_url: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.event_code = code.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_event_version(mut self, version: impl Into<String>) -> Self {
        self.event_version = version.into();
        self
    }

    /// The window is inclusive of `code_expired_at` itself.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.code_expired_at
    }
}

impl Keyed for Event {
    type Key = String;

    fn key(&self) -> String {
        self.event_code.clone()
    }
}

/// Build the kiosk URL for an event (`?c=<code>`).
pub fn kiosk_url(client_url: &str, event_code: &str) -> String {
    let separator = if client_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}c={}",
        client_url,
        separator,
        urlencoding::encode(event_code)
    )
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub organization_code: String,
    pub event_name: String,
    #[serde(default)]
    pub description: String,
    pub event_date_time: DateTime<Utc>,
    pub code_expired_at: DateTime<Utc>,
    #[serde(default)]
    pub event_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEventRequest {
    pub event_code: String,
    /// Accepted only when equal to the stored owner
    #[serde(default)]
    pub organization_code: Option<String>,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub event_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub code_expired_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub event_version: Option<String>,
}
