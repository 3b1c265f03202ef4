//! HMAC-SHA256 signatures for presigned upload URLs

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Signs `PUT\n{key}\n{expires}\n{content_type}` so a URL only authorizes one
/// object, one deadline and one content type.
#[derive(Clone)]
pub struct UploadSigner {
    secret: Vec<u8>,
}

impl UploadSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    pub fn sign(&self, key: &str, expires: i64, content_type: &str) -> Result<String> {
        let mac = self.mac(key, expires, content_type)?;
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    /// Constant-time comparison against a signature taken from a URL.
    pub fn verify(
        &self,
        key: &str,
        expires: i64,
        content_type: &str,
        signature: &str,
    ) -> Result<()> {
        let invalid = || Error::Unauthorized("upload signature mismatch".to_string());
        let expected = URL_SAFE_NO_PAD.decode(signature).map_err(|_| invalid())?;
        self.mac(key, expires, content_type)?
            .verify_slice(&expected)
            .map_err(|_| invalid())
    }

    fn mac(&self, key: &str, expires: i64, content_type: &str) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| Error::InvalidInput(format!("upload signing key: {}", e)))?;
        mac.update(format!("PUT\n{}\n{}\n{}", key, expires, content_type).as_bytes());
        Ok(mac)
    }
}
