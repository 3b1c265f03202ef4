//! Admin console authentication
//!
//! A single configured administrator logs in with a username and password and
//! receives a bearer JWT. Every admin route extracts an [`AdminSession`].

mod credentials;
mod jwt;

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

use jwt::{issue_admin_jwt, verify_admin_jwt, AdminJwtClaims};

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct AdminAuth {
    username: String,
    password_hash: String,
    jwt_secret: String,
    token_ttl_seconds: i64,
}

impl AdminAuth {
    pub fn new(
        username: impl Into<String>,
        password: &str,
        jwt_secret: impl Into<String>,
        token_ttl_seconds: i64,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: credentials::hash_password(password),
            jwt_secret: jwt_secret.into(),
            token_ttl_seconds,
        }
    }

    pub fn login(&self, username: &str, password: &str) -> Result<IssuedToken, ApiError> {
        if username != self.username
            || !credentials::verify_password(&self.password_hash, password)
        {
            warn!("Rejected admin login");
            return Err(ApiError::unauthorized("Invalid username or password"));
        }

        let (token, exp) = issue_admin_jwt(&self.jwt_secret, username, self.token_ttl_seconds)
            .map_err(|err| ApiError(checkin_core::Error::Storage(err)))?;
        let expires_at = Utc
            .timestamp_opt(exp as i64, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Ok(IssuedToken { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<AdminJwtClaims, ApiError> {
        verify_admin_jwt(&self.jwt_secret, token).map_err(|err| {
            debug!(error = %err, "Rejected admin token");
            ApiError::unauthorized("Invalid or expired session")
        })
    }
}

/// An authenticated administrator, extracted from `Authorization: Bearer`.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub username: String,
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;
    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Authorization must be a Bearer token"))
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.auth().verify(token)?;
        Ok(Self {
            username: claims.sub,
        })
    }
}
