//! Error types for the check-in domain

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Check-in window for event {0} has closed")]
    Expired(String),

    #[error("Phone number is not registered for event {0}")]
    NotRegistered(String),

    #[error("Event version '{version}' is not offered by organization {organization_code}")]
    InvalidVersion {
        organization_code: String,
        version: String,
    },

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Machine-readable error kind exposed to API clients
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Expired(_) => "expired",
            Self::NotRegistered(_) => "not_registered",
            Self::InvalidVersion { .. } => "invalid_version",
            Self::InvalidFormat(_) => "invalid_format",
            Self::InvalidInput(_) => "invalid_input",
            Self::Unauthorized(_) => "unauthorized",
            Self::Notification(_) => "notification",
            Self::Storage(_) | Self::Io(_) | Self::Serialization(_) => "storage",
        }
    }

    pub fn not_found(entity: &str, key: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} {}", entity, key))
    }
}
