//! Check-in module
//!
//! Records of actual attendance and the engine that turns a registration into
//! at most one check-in per (event, phone).

mod engine;
mod file_store;
mod model;
mod notifier;
mod repository;

pub use engine::{CheckInEngine, CheckInPolicy};
pub use file_store::FileCheckInStore;
pub use model::*;
pub use notifier::{CheckInNotifier, LogNotifier, WebhookNotifier};
pub use repository::CheckInRepository;
