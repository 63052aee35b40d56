//! Identity-provider webhooks, signed with the Svix scheme: HMAC-SHA256 over
//! `"{svix-id}.{svix-timestamp}.{body}"`, keyed with the base64 secret that
//! follows the `whsec_` prefix.

use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::utils::non_blank;

type HmacSha256 = Hmac<Sha256>;

const SECRET_PREFIX: &str = "whsec_";
pub const ID_HEADER: &str = "svix-id";
pub const TIMESTAMP_HEADER: &str = "svix-timestamp";
pub const SIGNATURE_HEADER: &str = "svix-signature";

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    secret: Vec<u8>,
    pub bootstrap_sysadmin_email: Option<String>,
    pub tolerance: Duration,
}

impl WebhookConfig {
    pub fn new(secret: Vec<u8>, bootstrap_sysadmin_email: Option<String>) -> Self {
        Self {
            secret,
            bootstrap_sysadmin_email: non_blank(bootstrap_sysadmin_email.as_deref()).map(str::to_string),
            tolerance: Duration::minutes(5),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        let secret = std::env::var("WEBHOOK_SECRET").map_err(|_| AppError::configuration("WEBHOOK_SECRET not set"))?;
        let bootstrap = std::env::var("BOOTSTRAP_SYSADMIN_EMAIL").ok();

        Ok(Self::new(Self::decode_secret(&secret)?, bootstrap))
    }

    /// `whsec_<base64>` is decoded; any other value is used as raw key bytes.
    pub fn decode_secret(secret: &str) -> Result<Vec<u8>, AppError> {
        match secret.trim().strip_prefix(SECRET_PREFIX) {
            Some(encoded) => STANDARD
                .decode(encoded)
                .map_err(|_| AppError::configuration("WEBHOOK_SECRET is not valid base64 after whsec_")),
            None => Ok(secret.trim().as_bytes().to_vec()),
        }
    }

    pub fn is_bootstrap_sysadmin(&self, email: &str) -> bool {
        self.bootstrap_sysadmin_email
            .as_deref()
            .is_some_and(|bootstrap| bootstrap.eq_ignore_ascii_case(email.trim()))
    }

    /// `v1,<base64 signature>` for the given message.
    pub fn sign(&self, id: &str, timestamp: i64, body: &[u8]) -> Result<String, AppError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|err| AppError::configuration(format!("invalid webhook secret: {err}")))?;
        mac.update(format!("{id}.{timestamp}.").as_bytes());
        mac.update(body);

        Ok(format!("v1,{}", STANDARD.encode(mac.finalize().into_bytes())))
    }

    /// Rejects missing headers, stale or future timestamps and signatures
    /// that match none of the listed `v1` entries.
    pub fn verify(&self, headers: &HeaderMap, body: &[u8], now: DateTime<Utc>) -> Result<(), AppError> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| non_blank(Some(value)))
                .ok_or_else(|| AppError::bad_request("missing webhook signature headers"))
        };

        let id = header(ID_HEADER)?;
        let timestamp = header(TIMESTAMP_HEADER)?;
        let signatures = header(SIGNATURE_HEADER)?;

        let timestamp: i64 = timestamp
            .parse()
            .map_err(|_| AppError::bad_request("invalid webhook timestamp"))?;
        let skew = (now.timestamp() - timestamp).abs();
        if skew > self.tolerance.num_seconds() {
            return Err(AppError::bad_request("webhook timestamp outside tolerance"));
        }

        let expected = self.sign(id, timestamp, body)?;
        let matched = signatures
            .split_whitespace()
            .filter(|candidate| candidate.starts_with("v1,"))
            .any(|candidate| {
                candidate.len() == expected.len() && bool::from(candidate.as_bytes().ct_eq(expected.as_bytes()))
            });

        if matched {
            Ok(())
        } else {
            tracing::warn!(webhook_id = %id, "webhook signature mismatch");
            Err(AppError::bad_request("invalid webhook signature"))
        }
    }
}

/// Envelope of every identity-provider event.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct DeletedObject {
    #[serde(default)]
    pub id: Option<String>,
}
