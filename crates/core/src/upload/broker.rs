//! Presigned upload targets and the storage-side trigger

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::blob::BlobStore;
use super::signer::UploadSigner;
use crate::registration::{
    ImportSummary, RegistrationService, SpreadsheetFormat, XLSX_CONTENT_TYPE,
};
use crate::store::Stores;
use crate::{Error, Result};

/// Largest accepted upload (10 MiB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const DEFAULT_UPLOAD_TTL_SECONDS: u64 = 3_600;

/// Seven days
pub const MAX_UPLOAD_TTL_SECONDS: u64 = 604_800;

const KEY_PREFIX: &str = "registrations";

fn default_ttl() -> u64 {
    DEFAULT_UPLOAD_TTL_SECONDS
}

/// Body of `POST /presigned-url`.
#[derive(Debug, Clone, Deserialize)]
pub struct PresignRequest {
    pub event_code: String,
    /// Lifetime of the URL in seconds
    #[serde(default = "default_ttl")]
    pub expiration: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTarget {
    pub url: String,
    pub file_key: String,
    pub expires_in: u64,
}

/// Event code embedded in an upload key (`registrations/{event}/{id}.xlsx`).
pub fn event_code_from_key(key: &str) -> Option<&str> {
    let mut parts = key.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(KEY_PREFIX), Some(event_code), Some(file), None)
            if !event_code.is_empty() && file.ends_with(".xlsx") =>
        {
            Some(event_code)
        }
        _ => None,
    }
}

#[derive(Clone)]
pub struct UploadBroker {
    stores: Stores,
    signer: UploadSigner,
    public_base_url: String,
    blobs: BlobStore,
    registrations: RegistrationService,
}

impl UploadBroker {
    pub fn new(
        stores: Stores,
        signer: UploadSigner,
        public_base_url: impl Into<String>,
        blobs: BlobStore,
        registrations: RegistrationService,
    ) -> Self {
        Self {
            stores,
            signer,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            blobs,
            registrations,
        }
    }

    /// Issue a URL that authorizes one PUT of an XLSX file for `event_code`
    /// until `now + ttl_seconds`.
    pub async fn issue_upload_target(
        &self,
        event_code: &str,
        ttl_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<UploadTarget> {
        if !(1..=MAX_UPLOAD_TTL_SECONDS).contains(&ttl_seconds) {
            return Err(Error::InvalidInput(format!(
                "expiration must be between 1 and {} seconds",
                MAX_UPLOAD_TTL_SECONDS
            )));
        }
        if event_code.contains('/') {
            return Err(Error::InvalidInput(
                "event_code cannot contain '/'".to_string(),
            ));
        }
        self.stores
            .events
            .get(event_code)
            .await?
            .ok_or_else(|| Error::not_found("Event", event_code))?;

        let object = format!("{}.xlsx", Uuid::new_v4());
        let file_key = format!("{}/{}/{}", KEY_PREFIX, event_code, object);
        let expires = (now + Duration::seconds(ttl_seconds as i64)).timestamp();
        let signature = self.signer.sign(&file_key, expires, XLSX_CONTENT_TYPE)?;
        let url = format!(
            "{}/blob/{}/{}/{}?expires={}&signature={}",
            self.public_base_url,
            KEY_PREFIX,
            urlencoding::encode(event_code),
            object,
            expires,
            signature
        );

        info!(event = %event_code, ttl_seconds, "Issued upload URL");
        Ok(UploadTarget {
            url,
            file_key,
            expires_in: ttl_seconds,
        })
    }

    /// Check a PUT against its URL credentials. Returns the target event code.
    pub fn authorize(
        &self,
        key: &str,
        expires: i64,
        signature: &str,
        content_type: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<String> {
        if now.timestamp() > expires {
            return Err(Error::Unauthorized("upload URL has expired".to_string()));
        }
        let content_type = content_type
            .map(|ct| ct.split(';').next().unwrap_or("").trim())
            .unwrap_or("");
        if content_type != XLSX_CONTENT_TYPE {
            return Err(Error::InvalidFormat(format!(
                "uploads must use content type {}",
                XLSX_CONTENT_TYPE
            )));
        }
        self.signer
            .verify(key, expires, XLSX_CONTENT_TYPE, signature)?;

        event_code_from_key(key)
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidInput(format!("not an upload key: {}", key)))
    }

    /// Storage side of a presigned PUT: authorize, store the object, then
    /// import it into the event's registrations.
    pub async fn receive(
        &self,
        key: &str,
        expires: i64,
        signature: &str,
        content_type: Option<&str>,
        bytes: &[u8],
        now: DateTime<Utc>,
    ) -> Result<ImportSummary> {
        let event_code = self.authorize(key, expires, signature, content_type, now)?;
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(Error::InvalidInput(format!(
                "upload exceeds {} bytes",
                MAX_UPLOAD_BYTES
            )));
        }

        self.blobs.put(key, bytes).await?;
        let summary = self
            .registrations
            .bulk_import(&event_code, bytes, SpreadsheetFormat::Xlsx)
            .await
            .inspect_err(|err| {
                warn!(event = %event_code, key, error = %err, "Uploaded file rejected");
            })?;
        Ok(summary)
    }
}
