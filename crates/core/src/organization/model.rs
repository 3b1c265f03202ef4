//! Organization model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Keyed;

/// A community that owns events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    /// Immutable primary key (e.g. "awskrug")
    pub organization_code: String,

    pub organization_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    /// Ordered, duplicate-free set of version tags events may declare
    #[serde(default)]
    pub event_version: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            organization_code: code.into(),
            organization_name: name.into(),
            logo_url: None,
            event_version: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the version set, dropping blanks and duplicates but keeping order
    pub fn with_event_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_version = dedupe_versions(versions);
        self
    }

    pub fn with_logo_url(mut self, url: impl Into<String>) -> Self {
        self.logo_url = Some(url.into());
        self
    }

    pub fn offers_version(&self, version: &str) -> bool {
        self.event_version.iter().any(|v| v == version)
    }

    /// Version used when an event is created without one
    pub fn default_version(&self) -> String {
        self.event_version.first().cloned().unwrap_or_default()
    }
}

impl Keyed for Organization {
    type Key = String;

    fn key(&self) -> String {
        self.organization_code.clone()
    }
}

pub(crate) fn dedupe_versions<I, S>(versions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut unique: Vec<String> = Vec::new();
    for version in versions {
        let version = version.into().trim().to_string();
        if !version.is_empty() && !unique.contains(&version) {
            unique.push(version);
        }
    }
    unique
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganizationRequest {
    pub organization_code: String,
    pub organization_name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub event_version: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrganizationRequest {
    pub organization_code: String,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub event_version: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_deduplicated_in_order() {
        let org = Organization::new("awskrug", "AWSKRUG")
            .with_event_versions(["2024", " 2025 ", "2024", "", "2023"]);

        assert_eq!(org.event_version, vec!["2024", "2025", "2023"]);
        assert!(org.offers_version("2025"));
        assert!(!org.offers_version("2026"));
    }

    #[test]
    fn default_version_is_first_or_empty() {
        let org = Organization::new("a", "A").with_event_versions(["v1", "v2"]);
        assert_eq!(org.default_version(), "v1");
        assert_eq!(Organization::new("b", "B").default_version(), "");
    }
}
