//! Append-only audit trail of admin mutations and kiosk check-ins

pub mod store;
pub mod types;

pub use store::AuditStore;
pub use types::{AuditEvent, AuditListQuery, AuditListResponse};
