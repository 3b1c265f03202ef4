//! Event module
//!
//! An Event is a single gathering owned by one organization, with its own
//! check-in window closing at `code_expired_at`.

mod file_store;
mod model;
mod repository;
mod service;

pub use file_store::FileEventStore;
pub use model::*;
pub use repository::EventRepository;
pub use service::EventService;
