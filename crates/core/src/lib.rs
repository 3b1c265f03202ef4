//! Core library for the event check-in service
//!
//! This crate contains the domain logic, including:
//! - Organizations, events and registrations
//! - The check-in engine and its notification hook
//! - Spreadsheet bulk import and the presigned upload broker
//! - Attendance statistics

pub mod checkin;
pub mod error;
pub mod event;
pub mod organization;
pub mod phone;
pub mod registration;
pub mod stats;
pub mod store;
pub mod upload;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
