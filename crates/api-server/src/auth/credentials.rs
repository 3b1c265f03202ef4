use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Salted SHA-256 in the `v1$<salt>$<digest>` layout.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0_u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);

    format!(
        "v1${}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(digest(&salt, password))
    )
}

pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let mut parts = stored_hash.split('$');
    let (Some("v1"), Some(encoded_salt), Some(encoded_digest), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let (Ok(salt), Ok(expected)) = (
        URL_SAFE_NO_PAD.decode(encoded_salt),
        URL_SAFE_NO_PAD.decode(encoded_digest),
    ) else {
        return false;
    };

    expected == digest(&salt, password)
}

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_and_is_salted() {
        let first = hash_password("admin");
        let second = hash_password("admin");
        assert_ne!(first, second);
        assert!(verify_password(&first, "admin"));
        assert!(!verify_password(&first, "Admin"));
        assert!(!verify_password("v2$abc$def", "admin"));
        assert!(!verify_password("garbage", "admin"));
    }
}
