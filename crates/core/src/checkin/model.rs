//! Check-in model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::registration::Registration;
use crate::store::Keyed;

/// Attendance record. `name` and `email` are copied from the registration at
/// check-in time and are not refreshed by later registration edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub event_code: String,
    pub phone: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub checked_at: DateTime<Utc>,
    /// Copied from the event when the check-in was recorded
    #[serde(default)]
    pub event_version: String,
}

impl CheckIn {
    pub fn from_registration(
        event: &Event,
        registration: &Registration,
        checked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_code: registration.event_code.clone(),
            phone: registration.phone.clone(),
            name: registration.name.clone(),
            email: registration.email.clone(),
            checked_at,
            event_version: event.event_version.clone(),
        }
    }
}

impl Keyed for CheckIn {
    type Key = (String, String);

    fn key(&self) -> Self::Key {
        (self.event_code.clone(), self.phone.clone())
    }
}

/// Wire result of a successful check-in, first or repeated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInResult {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckInOutcome {
    pub checkin: CheckIn,
    /// False when the attendee was already checked in
    pub created: bool,
}

impl CheckInOutcome {
    pub fn result(&self) -> CheckInResult {
        CheckInResult {
            name: self.checkin.name.clone(),
            count: 1,
        }
    }
}

/// Body of the public kiosk `POST /check`.
#[derive(Debug, Clone, Deserialize)]
pub struct KioskCheckInRequest {
    pub phone: String,
    pub event_code: String,
}

/// Body of the admin `POST /checkin`.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualCheckInRequest {
    #[serde(alias = "partition_key")]
    pub event_code: String,
    /// Raw phone number as typed
    #[serde(alias = "sort_key")]
    pub phone: String,
    #[serde(default)]
    pub checked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCheckInRequest {
    pub event_code: String,
    /// Stored phone identity
    pub phone: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub checked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub event_version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn from_registration_copies_attendee_and_version() {
        let now = Utc::now();
        let event = Event::new("awskrug", "Meetup", now, now + Duration::hours(1))
            .with_code("E1")
            .with_event_version("2024");
        let registration = Registration::new("E1", "0101", "Kim")
            .with_email(Some("kim@example.com".to_string()));

        let checkin = CheckIn::from_registration(&event, &registration, now);
        assert_eq!(checkin.event_code, "E1");
        assert_eq!(checkin.phone, "0101");
        assert_eq!(checkin.name, "Kim");
        assert_eq!(checkin.email.as_deref(), Some("kim@example.com"));
        assert_eq!(checkin.event_version, "2024");
        assert_eq!(checkin.checked_at, now);
    }

    #[test]
    fn outcome_result_always_counts_one() {
        let now = Utc::now();
        let event = Event::new("o", "e", now, now);
        let registration = Registration::new(&event.event_code, "1", "Kim");
        let outcome = CheckInOutcome {
            checkin: CheckIn::from_registration(&event, &registration, now),
            created: false,
        };
        assert_eq!(
            outcome.result(),
            CheckInResult {
                name: "Kim".to_string(),
                count: 1
            }
        );
    }
}
