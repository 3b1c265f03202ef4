//! Organization module
//!
//! An Organization is a community that owns events and declares the set of
//! event-version tags its events may be issued under.

mod file_store;
mod model;
mod repository;
mod service;

pub use file_store::FileOrganizationStore;
pub use model::*;
pub use repository::OrganizationRepository;
pub use service::OrganizationService;
