//! Upload broker
//!
//! Issues time-limited signed URLs for spreadsheet uploads and accepts the
//! resulting PUTs, re-validating and importing the file once it lands.

mod blob;
mod broker;
mod signer;

pub use blob::BlobStore;
pub use broker::{
    event_code_from_key, PresignRequest, UploadBroker, UploadTarget, DEFAULT_UPLOAD_TTL_SECONDS,
    MAX_UPLOAD_BYTES, MAX_UPLOAD_TTL_SECONDS,
};
pub use signer::UploadSigner;
