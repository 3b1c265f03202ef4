//! Phone number normalization and identity hashing
//!
//! Registrations and check-ins are keyed by a phone-derived identifier rather
//! than the number as typed. With a salt configured the identifier is a salted
//! SHA-256 digest; without one it is the bare digit string.

use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Number of trailing digits kept for the fuzzy-match fallback
pub const PHONE_TAIL_LEN: usize = 4;

/// Strip everything but ASCII digits ("010-1234-5678" -> "01012345678").
pub fn normalize_phone(raw: &str) -> Result<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(Error::InvalidInput(
            "Phone number must contain digits".to_string(),
        ));
    }
    Ok(digits)
}

/// Trailing digits of a normalized number, or the whole number if shorter.
pub fn phone_tail(digits: &str) -> String {
    let start = digits.len().saturating_sub(PHONE_TAIL_LEN);
    digits[start..].to_string()
}

/// A raw phone number resolved into its stored identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneIdentity {
    pub identifier: String,
    pub tail: String,
}

#[derive(Debug, Clone, Default)]
pub struct PhoneHasher {
    salt: Option<String>,
}

impl PhoneHasher {
    pub fn new(salt: Option<String>) -> Self {
        let salt = salt
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self { salt }
    }

    pub fn is_hashing(&self) -> bool {
        self.salt.is_some()
    }

    pub fn identify(&self, raw: &str) -> Result<PhoneIdentity> {
        let digits = normalize_phone(raw)?;
        let tail = phone_tail(&digits);
        let identifier = match &self.salt {
            Some(salt) => {
                let mut hasher = Sha256::new();
                hasher.update(digits.as_bytes());
                hasher.update(salt.as_bytes());
                hex::encode(hasher.finalize())
            }
            None => digits,
        };
        Ok(PhoneIdentity { identifier, tail })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_separators() {
        assert_eq!(normalize_phone(" 010-1234-5678 ").unwrap(), "01012345678");
        assert_eq!(normalize_phone("+82 (10) 1234 5678").unwrap(), "821012345678");
    }

    #[test]
    fn normalize_rejects_digitless_input() {
        let err = normalize_phone("call me").unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn tail_handles_short_numbers() {
        assert_eq!(phone_tail("01012345678"), "5678");
        assert_eq!(phone_tail("12"), "12");
    }

    #[test]
    fn plain_identity_is_digits() {
        let hasher = PhoneHasher::new(None);
        let identity = hasher.identify("010-0000-0001").unwrap();
        assert_eq!(identity.identifier, "01000000001");
        assert_eq!(identity.tail, "0001");
        assert!(!hasher.is_hashing());
    }

    #[test]
    fn hashed_identity_is_stable_and_format_independent() {
        let hasher = PhoneHasher::new(Some("pepper".to_string()));
        let a = hasher.identify("010-1234-5678").unwrap();
        let b = hasher.identify("01012345678").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.identifier.len(), 64);
        assert_ne!(a.identifier, "01012345678");
        assert_eq!(a.tail, "5678");
    }

    #[test]
    fn blank_salt_disables_hashing() {
        assert!(!PhoneHasher::new(Some("   ".to_string())).is_hashing());
    }
}
