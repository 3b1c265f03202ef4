//! Check-in engine
//!
//! Resolves a typed phone number to a registration of an open event and
//! records attendance at most once per (event, phone). Repeat check-ins are
//! successful no-ops that report the first recorded check-in.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::model::{CheckIn, CheckInOutcome, UpdateCheckInRequest};
use super::notifier::CheckInNotifier;
use crate::event::{Event, KIOSK_FALLBACK_EVENT_CODE};
use crate::phone::PhoneHasher;
use crate::registration::Registration;
use crate::store::{InsertOutcome, Stores};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct CheckInPolicy {
    /// Fall back to a unique last-four-digits match when the exact phone
    /// identity is not registered
    pub fuzzy_phone_match: bool,
}

#[derive(Clone)]
pub struct CheckInEngine {
    stores: Stores,
    hasher: PhoneHasher,
    policy: CheckInPolicy,
    notifier: Arc<dyn CheckInNotifier>,
}

impl CheckInEngine {
    pub fn new(
        stores: Stores,
        hasher: PhoneHasher,
        policy: CheckInPolicy,
        notifier: Arc<dyn CheckInNotifier>,
    ) -> Self {
        Self {
            stores,
            hasher,
            policy,
            notifier,
        }
    }

    pub async fn check_in(&self, event_code: &str, raw_phone: &str) -> Result<CheckInOutcome> {
        self.check_in_at(event_code, raw_phone, Utc::now(), None).await
    }

    /// Check in against the clock reading `now`. The window is always checked
    /// at `now`; `checked_at` only overrides the instant recorded on a new
    /// check-in.
    pub async fn check_in_at(
        &self,
        event_code: &str,
        raw_phone: &str,
        now: DateTime<Utc>,
        checked_at: Option<DateTime<Utc>>,
    ) -> Result<CheckInOutcome> {
        if event_code.trim().is_empty() || event_code == KIOSK_FALLBACK_EVENT_CODE {
            return Err(Error::InvalidInput(
                "A valid event code is required; open the kiosk from the event QR code"
                    .to_string(),
            ));
        }

        let event = self
            .stores
            .events
            .get(event_code)
            .await?
            .ok_or_else(|| Error::not_found("Event", event_code))?;
        if !event.is_open_at(now) {
            warn!(event = %event_code, expired_at = %event.code_expired_at, "Check-in after window");
            return Err(Error::Expired(event_code.to_string()));
        }

        let registration = self
            .resolve_registration(&event, raw_phone)
            .await
            .inspect_err(|err| warn!(event = %event_code, kind = err.kind(), "Check-in refused"))?;
        let candidate =
            CheckIn::from_registration(&event, &registration, checked_at.unwrap_or(now));

        match self.stores.checkins.insert_if_absent(candidate).await? {
            InsertOutcome::Inserted(checkin) => {
                info!(event = %event_code, "Attendee checked in");
                if let Err(err) = self.notifier.notify(&event, &checkin).await {
                    warn!(event = %event_code, error = %err, "Check-in notification failed");
                }
                Ok(CheckInOutcome {
                    checkin,
                    created: true,
                })
            }
            InsertOutcome::Existing(checkin) => {
                debug!(event = %event_code, "Repeat check-in");
                Ok(CheckInOutcome {
                    checkin,
                    created: false,
                })
            }
        }
    }

    async fn resolve_registration(&self, event: &Event, raw_phone: &str) -> Result<Registration> {
        let not_registered = || Error::NotRegistered(event.event_code.clone());
        let identity = self.hasher.identify(raw_phone).map_err(|_| not_registered())?;

        if let Some(registration) = self
            .stores
            .registrations
            .get(&event.event_code, &identity.identifier)
            .await?
        {
            return Ok(registration);
        }

        if !self.policy.fuzzy_phone_match {
            return Err(not_registered());
        }

        let mut matches = self
            .stores
            .registrations
            .find_by_tail(&event.event_code, &identity.tail)
            .await?;
        match matches.len() {
            1 => {
                debug!(event = %event.event_code, "Matched registration by phone tail");
                Ok(matches.remove(0))
            }
            0 => Err(not_registered()),
            n => {
                warn!(event = %event.event_code, candidates = n, "Ambiguous phone tail");
                Err(not_registered())
            }
        }
    }

    pub async fn get(&self, event_code: &str, phone: &str) -> Result<CheckIn> {
        self.stores
            .checkins
            .get(event_code, phone)
            .await?
            .ok_or_else(|| Error::not_found("Check-in", format!("{}/{}", event_code, phone)))
    }

    /// Administrative edit. Not subject to the check-in window.
    pub async fn update(&self, request: UpdateCheckInRequest) -> Result<CheckIn> {
        let UpdateCheckInRequest {
            event_code,
            phone,
            name,
            email,
            checked_at,
            event_version,
        } = request;
        let name = match name {
            Some(name) if name.trim().is_empty() => {
                return Err(Error::InvalidInput("name cannot be empty".to_string()));
            }
            name => name.map(|name| name.trim().to_string()),
        };

        self.stores
            .checkins
            .update(
                &event_code,
                &phone,
                Box::new(move |checkin: &mut CheckIn| {
                    if let Some(name) = name {
                        checkin.name = name;
                    }
                    if let Some(email) = email {
                        let email = email.trim();
                        checkin.email = (!email.is_empty()).then(|| email.to_string());
                    }
                    if let Some(checked_at) = checked_at {
                        checkin.checked_at = checked_at;
                    }
                    if let Some(version) = event_version {
                        checkin.event_version = version;
                    }
                    Ok(())
                }),
            )
            .await
    }

    pub async fn delete(&self, event_code: &str, phone: &str) -> Result<()> {
        self.stores
            .checkins
            .delete(event_code, phone)
            .await?
            .ok_or_else(|| Error::not_found("Check-in", format!("{}/{}", event_code, phone)))?;
        info!(event = %event_code, "Check-in deleted");
        Ok(())
    }

    pub async fn list(&self, event_code: &str) -> Result<Vec<CheckIn>> {
        self.stores
            .events
            .get(event_code)
            .await?
            .ok_or_else(|| Error::not_found("Event", event_code))?;
        self.stores.checkins.list(event_code).await
    }
}
