//! Event administration: creation rules, edits, deletion policy and early expiry

use chrono::{DateTime, Utc};
use tracing::info;

use super::model::{kiosk_url, CreateEventRequest, Event, UpdateEventRequest};
use crate::organization::Organization;
use crate::store::Stores;
use crate::{Error, Result};

#[derive(Clone)]
pub struct EventService {
    stores: Stores,
    client_url: String,
}

impl EventService {
    /// `client_url` is the public kiosk page the event QR codes point at.
    pub fn new(stores: Stores, client_url: impl Into<String>) -> Self {
        Self {
            stores,
            client_url: client_url.into(),
        }
    }

    pub async fn create(&self, request: CreateEventRequest) -> Result<Event> {
        let organization = self.organization(&request.organization_code).await?;

        let name = request.event_name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("event_name cannot be empty".to_string()));
        }
        validate_window(request.event_date_time, request.code_expired_at)?;

        let version = match request.event_version {
            Some(version) => {
                ensure_version(&organization, &version)?;
                version
            }
            None => organization.default_version(),
        };

        let mut event = Event::new(
            &organization.organization_code,
            name,
            request.event_date_time,
            request.code_expired_at,
        )
        .with_description(request.description)
        .with_event_version(version);
        event.qr_url = kiosk_url(&self.client_url, &event.event_code);

        let created = self.stores.events.create(event).await?;
        info!(
            event = %created.event_code,
            organization = %created.organization_code,
            "Event created"
        );
        Ok(created)
    }

    pub async fn get(&self, code: &str) -> Result<Event> {
        self.stores
            .events
            .get(code)
            .await?
            .ok_or_else(|| Error::not_found("Event", code))
    }

    pub async fn list(&self, organization_code: Option<&str>) -> Result<Vec<Event>> {
        self.stores.events.list(organization_code).await
    }

    /// Edit an event. The merged window and any version change are
    /// validated against the stored row under the store lock.
    pub async fn update(&self, request: UpdateEventRequest) -> Result<Event> {
        let current = self.get(&request.event_code).await?;

        if let Some(org) = request.organization_code.as_deref() {
            if org != current.organization_code {
                return Err(Error::InvalidInput(
                    "organization_code cannot be changed".to_string(),
                ));
            }
        }
        let name = match request.event_name {
            Some(name) if name.trim().is_empty() => {
                return Err(Error::InvalidInput("event_name cannot be empty".to_string()));
            }
            name => name.map(|name| name.trim().to_string()),
        };
        let organization = match request.event_version {
            Some(_) => Some(self.organization(&current.organization_code).await?),
            None => None,
        };
        let UpdateEventRequest {
            description,
            event_date_time,
            code_expired_at,
            event_version,
            ..
        } = request;

        self.stores
            .events
            .update(
                &current.event_code,
                Box::new(move |event: &mut Event| {
                    if let (Some(version), Some(organization)) = (event_version, organization) {
                        if version != event.event_version {
                            ensure_version(&organization, &version)?;
                            event.event_version = version;
                        }
                    }
                    let start = event_date_time.unwrap_or(event.event_date_time);
                    let expiry = code_expired_at.unwrap_or(event.code_expired_at);
                    validate_window(start, expiry)?;

                    event.event_date_time = start;
                    event.code_expired_at = expiry;
                    if let Some(name) = name {
                        event.event_name = name;
                    }
                    if let Some(description) = description {
                        event.description = description;
                    }
                    Ok(())
                }),
            )
            .await
    }

    /// Delete an event. Refused while registrations or check-ins reference it.
    pub async fn delete(&self, code: &str) -> Result<()> {
        self.get(code).await?;

        let registrations = self.stores.registrations.count(code).await?;
        let checkins = self.stores.checkins.count(code).await?;
        if registrations > 0 || checkins > 0 {
            return Err(Error::Conflict(format!(
                "Event {} still has {} registration(s) and {} check-in(s)",
                code, registrations, checkins
            )));
        }

        self.stores.events.delete(code).await?;
        info!(event = %code, "Event deleted");
        Ok(())
    }

    /// Close the check-in window at `now`.
    pub async fn expire(&self, code: &str, now: DateTime<Utc>) -> Result<Event> {
        let event = self.get(code).await?;
        if now >= event.code_expired_at {
            return Ok(event);
        }

        let event_code = code.to_string();
        let event = self
            .stores
            .events
            .update(
                code,
                Box::new(move |event: &mut Event| {
                    if now < event.event_date_time {
                        return Err(Error::InvalidInput(format!(
                            "Event {} has not started yet",
                            event_code
                        )));
                    }
                    if now < event.code_expired_at {
                        event.code_expired_at = now;
                    }
                    Ok(())
                }),
            )
            .await?;
        info!(event = %code, "Event check-in window closed early");
        Ok(event)
    }

    async fn organization(&self, code: &str) -> Result<Organization> {
        self.stores
            .organizations
            .get(code)
            .await?
            .ok_or_else(|| Error::not_found("Organization", code))
    }
}

fn validate_window(start: DateTime<Utc>, expiry: DateTime<Utc>) -> Result<()> {
    if expiry < start {
        return Err(Error::InvalidInput(
            "code_expired_at must not precede event_date_time".to_string(),
        ));
    }
    Ok(())
}

fn ensure_version(organization: &Organization, version: &str) -> Result<()> {
    if organization.offers_version(version) {
        Ok(())
    } else {
        Err(Error::InvalidVersion {
            organization_code: organization.organization_code.clone(),
            version: version.to_string(),
        })
    }
}
