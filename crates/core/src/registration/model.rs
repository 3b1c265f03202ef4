//! Registration model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Keyed;

/// A pre-enrolled attendee of one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub event_code: String,

    /// Normalized or hashed phone identity; immutable once created
    pub phone: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Last digits of the number as entered, for the fuzzy-match fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_tail: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(
        event_code: impl Into<String>,
        phone: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            event_code: event_code.into(),
            phone: phone.into(),
            name: name.into(),
            email: None,
            phone_tail: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    pub fn with_phone_tail(mut self, tail: impl Into<String>) -> Self {
        self.phone_tail = Some(tail.into());
        self
    }
}

impl Keyed for Registration {
    type Key = (String, String);

    fn key(&self) -> Self::Key {
        (self.event_code.clone(), self.phone.clone())
    }
}

/// Body of `POST /registration`. The admin console sends the store's
/// `partition_key`/`sort_key` names, so both spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRegistrationRequest {
    #[serde(alias = "partition_key")]
    pub event_code: String,
    /// Raw phone number as typed
    #[serde(alias = "sort_key")]
    pub phone: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRegistrationRequest {
    #[serde(alias = "partition_key")]
    pub event_code: String,
    /// Stored phone identity
    #[serde(alias = "sort_key")]
    pub phone: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Identifies one registration or check-in.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendeeKey {
    #[serde(alias = "partition_key")]
    pub event_code: String,
    #[serde(alias = "sort_key")]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    /// 1-based spreadsheet row, header included
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub rows_processed: usize,
    pub rows_skipped: usize,
    pub message: String,
    pub errors: Vec<RowError>,
}

pub(crate) fn clean_email(email: Option<String>) -> Option<String> {
    email
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
