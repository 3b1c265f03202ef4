use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminJwtClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

fn admin_validation() -> Validation {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;
    validation
}

pub fn issue_admin_jwt(
    secret: &str,
    username: &str,
    ttl_seconds: i64,
) -> Result<(String, usize), String> {
    let exp = (Utc::now() + Duration::seconds(ttl_seconds)).timestamp() as usize;
    let claims = AdminJwtClaims {
        sub: username.to_string(),
        role: ADMIN_ROLE.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map(|token| (token, exp))
    .map_err(|err| format!("Failed to sign admin JWT: {}", err))
}

pub fn verify_admin_jwt(secret: &str, token: &str) -> Result<AdminJwtClaims, String> {
    let claims = decode::<AdminJwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &admin_validation(),
    )
    .map(|decoded| decoded.claims)
    .map_err(|err| format!("Invalid admin JWT: {}", err))?;

    if claims.role != ADMIN_ROLE {
        return Err(format!("Role '{}' cannot use the admin console", claims.role));
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_with_same_secret_only() {
        let (token, exp) = issue_admin_jwt("secret", "admin", 60).unwrap();
        let claims = verify_admin_jwt("secret", &token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp, exp);

        assert!(verify_admin_jwt("other", &token).is_err());
        assert!(verify_admin_jwt("secret", "not-a-jwt").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let (token, _) = issue_admin_jwt("secret", "admin", -120).unwrap();
        assert!(verify_admin_jwt("secret", &token).is_err());
    }
}
