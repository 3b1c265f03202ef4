//! Registration module
//!
//! Pre-registered attendees per event, keyed by (event_code, phone identity),
//! with spreadsheet bulk import.

mod file_store;
mod import;
mod model;
mod repository;
mod service;

pub use file_store::FileRegistrationStore;
pub use import::{
    parse_sheet, ParsedSheet, SheetRow, SpreadsheetFormat, CSV_CONTENT_TYPE, MAX_IMPORT_ROWS,
    XLSX_CONTENT_TYPE,
};
pub use model::*;
pub use repository::RegistrationRepository;
pub use service::RegistrationService;
