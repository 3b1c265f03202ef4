//! Service configuration read from the environment

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use tracing::warn;

pub const DEV_JWT_SECRET: &str = "dev-jwt-secret-change-me";
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 60 * 60 * 8;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub environment: String,
    pub production: bool,
    pub fuzzy_phone_match: bool,
    pub phone_hash_salt: Option<String>,
    /// Kiosk page the event QR codes point at
    pub client_url: String,
    /// Base of presigned upload URLs
    pub public_base_url: String,
    pub upload_signing_secret: String,
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub admin_username: String,
    pub admin_password: String,
    pub webhook_url: Option<String>,
}

fn parse_flag(raw: Option<String>, default: bool) -> bool {
    match raw {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn random_secret() -> String {
    let mut bytes = [0_u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

impl ServiceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| non_empty(lookup(name));

        let environment = var("ENV").unwrap_or_else(|| "dev".to_string());
        let production = matches!(
            environment.to_ascii_lowercase().as_str(),
            "prod" | "production"
        );

        let bind_addr = var("CHECKIN_BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8000".to_string())
            .parse::<SocketAddr>()
            .context("CHECKIN_BIND_ADDR must be host:port")?;

        let token_ttl_seconds = match var("CHECKIN_TOKEN_TTL_SECONDS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|ttl| *ttl > 0)
                .context("CHECKIN_TOKEN_TTL_SECONDS must be a positive integer")?,
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };

        let (admin_username, admin_password) =
            match (var("ADMIN_USERNAME"), var("ADMIN_PASSWORD")) {
                (Some(user), Some(password)) => (user, password),
                _ if production => {
                    bail!("ADMIN_USERNAME and ADMIN_PASSWORD are required in production")
                }
                _ => ("admin".to_string(), "admin".to_string()),
            };

        let jwt_secret = match var("CHECKIN_JWT_SECRET") {
            Some(secret) => secret,
            None if production => bail!("CHECKIN_JWT_SECRET is required in production"),
            None => DEV_JWT_SECRET.to_string(),
        };

        let upload_signing_secret = var("UPLOAD_SIGNING_SECRET").unwrap_or_else(|| {
            warn!("UPLOAD_SIGNING_SECRET is not set; upload URLs will not survive a restart");
            random_secret()
        });

        Ok(Self {
            data_dir: PathBuf::from(
                var("CHECKIN_DATA_DIR").unwrap_or_else(|| ".checkin-data".to_string()),
            ),
            bind_addr,
            fuzzy_phone_match: parse_flag(lookup("CHECKIN_FUZZY_PHONE_MATCH"), !production),
            phone_hash_salt: var("PHONE_HASH_SALT"),
            client_url: var("CLIENT_URL").unwrap_or_else(|| "http://localhost:3000/".to_string()),
            public_base_url: var("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8000".to_string()),
            upload_signing_secret,
            jwt_secret,
            token_ttl_seconds,
            admin_username,
            admin_password,
            webhook_url: var("CHECKIN_WEBHOOK_URL"),
            environment,
            production,
        })
    }
}
