//! Post-check-in notification hook
//!
//! Fired once per newly recorded check-in, never for idempotent repeats.
//! Delivery failures are the caller's to log; they never undo a check-in.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use super::model::CheckIn;
use crate::event::Event;
use crate::{Error, Result};

#[async_trait]
pub trait CheckInNotifier: Send + Sync {
    async fn notify(&self, event: &Event, checkin: &CheckIn) -> Result<()>;
}

/// Writes a log line per check-in. Used when no webhook is configured.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl CheckInNotifier for LogNotifier {
    async fn notify(&self, event: &Event, checkin: &CheckIn) -> Result<()> {
        info!(
            event = %event.event_code,
            event_name = %event.event_name,
            attendee = %checkin.name,
            has_email = checkin.email.is_some(),
            "Attendee checked in"
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    event_code: &'a str,
    event_name: &'a str,
    event_version: &'a str,
    name: &'a str,
    email: Option<&'a str>,
    checked_at: String,
}

/// POSTs a JSON payload to a configured URL, e.g. a mailer that sends the
/// attendee a welcome message.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub const TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Self::TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url.into(),
        }
    }
}

#[async_trait]
impl CheckInNotifier for WebhookNotifier {
    async fn notify(&self, event: &Event, checkin: &CheckIn) -> Result<()> {
        let payload = WebhookPayload {
            event_code: &event.event_code,
            event_name: &event.event_name,
            event_version: &checkin.event_version,
            name: &checkin.name,
            email: checkin.email.as_deref(),
            checked_at: checkin.checked_at.to_rfc3339(),
        };

        let resp = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Notification(format!("webhook request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(Error::Notification(format!(
                "webhook returned HTTP {}",
                resp.status()
            )));
        }
        Ok(())
    }
}
