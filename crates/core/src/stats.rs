//! Attendance statistics per event and per organization

use std::collections::BTreeMap;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::Serialize;

use crate::checkin::CheckIn;
use crate::store::Stores;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyCount {
    /// Start of the UTC hour
    pub hour: DateTime<Utc>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventStats {
    pub event_code: String,
    pub event_name: String,
    pub event_date_time: DateTime<Utc>,
    pub total_registrations: usize,
    pub total_checkins: usize,
    /// Percent of registrations checked in, one decimal
    pub attendance_rate: f64,
    pub hourly_checkins: Vec<HourlyCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationStats {
    pub organization_code: String,
    pub organization_name: String,
    pub event_count: usize,
    pub total_registrations: usize,
    pub total_checkins: usize,
    pub attendance_rate: f64,
}

pub(crate) fn attendance_rate(checkins: usize, registrations: usize) -> f64 {
    if registrations == 0 {
        return 0.0;
    }
    let percent = checkins as f64 * 100.0 / registrations as f64;
    (percent * 10.0).round() / 10.0
}

fn hourly(checkins: &[CheckIn]) -> Vec<HourlyCount> {
    let mut buckets: BTreeMap<DateTime<Utc>, usize> = BTreeMap::new();
    for checkin in checkins {
        let hour = checkin
            .checked_at
            .duration_trunc(TimeDelta::hours(1))
            .unwrap_or(checkin.checked_at);
        *buckets.entry(hour).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(hour, count)| HourlyCount { hour, count })
        .collect()
}

#[derive(Clone)]
pub struct StatsService {
    stores: Stores,
}

impl StatsService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn event_stats(&self, event_code: &str) -> Result<EventStats> {
        let event = self
            .stores
            .events
            .get(event_code)
            .await?
            .ok_or_else(|| Error::not_found("Event", event_code))?;
        let total_registrations = self.stores.registrations.count(event_code).await?;
        let checkins = self.stores.checkins.list(event_code).await?;

        Ok(EventStats {
            event_code: event.event_code,
            event_name: event.event_name,
            event_date_time: event.event_date_time,
            total_registrations,
            total_checkins: checkins.len(),
            attendance_rate: attendance_rate(checkins.len(), total_registrations),
            hourly_checkins: hourly(&checkins),
        })
    }

    /// One row per organization, in organization code order.
    pub async fn organization_stats(&self) -> Result<Vec<OrganizationStats>> {
        let mut rows = Vec::new();
        for organization in self.stores.organizations.list().await? {
            let events = self
                .stores
                .events
                .list(Some(&organization.organization_code))
                .await?;

            let mut total_registrations = 0;
            let mut total_checkins = 0;
            for event in &events {
                total_registrations += self.stores.registrations.count(&event.event_code).await?;
                total_checkins += self.stores.checkins.count(&event.event_code).await?;
            }

            rows.push(OrganizationStats {
                organization_code: organization.organization_code,
                organization_name: organization.organization_name,
                event_count: events.len(),
                total_registrations,
                total_checkins,
                attendance_rate: attendance_rate(total_checkins, total_registrations),
            });
        }
        Ok(rows)
    }
}
