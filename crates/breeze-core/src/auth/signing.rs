//! Request signing for authenticated Breeze calls.
//!
//! Every request carries `X-Checksum: token <hex>` where `<hex>` is
//! SHA-256 over `timestamp || payload || secret`, and the same timestamp is
//! sent as `X-Timestamp`.

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use sha2::{Digest, Sha256};

use super::AuthError;

/// Marker placed before the hex digest in the checksum header
const CHECKSUM_PREFIX: &str = "token ";

pub const X_CHECKSUM: &str = "x-checksum";
pub const X_TIMESTAMP: &str = "x-timestamp";
pub const X_APP_KEY: &str = "x-appkey";
pub const X_SESSION_TOKEN: &str = "x-sessiontoken";

/// Hex-encoded SHA-256 request checksum (64 lowercase characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(String);

impl Checksum {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn compute_checksum(timestamp: &str, payload: &str, secret: &str) -> Checksum {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.as_bytes());
    hasher.update(payload.as_bytes());
    hasher.update(secret.as_bytes());
    Checksum(hex::encode(hasher.finalize()))
}

/// Format a timestamp the way the API expects: UTC, second precision,
/// followed by a literal `.000Z`.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    format!("{}.000Z", now.format("%Y-%m-%dT%H:%M:%S"))
}

/// Auth headers for a single request. Built fresh per call, never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    pub timestamp: String,
    pub checksum: Checksum,
    pub app_key: String,
    pub session_token: String,
}

impl AuthHeaders {
    /// Sign `payload` at `now`. The timestamp is formatted once and used for
    /// both the header and the checksum input.
    pub(crate) fn sign(
        now: DateTime<Utc>,
        payload: &str,
        secret: &str,
        app_key: &str,
        session_token: &str,
    ) -> Self {
        let timestamp = format_timestamp(now);
        let checksum = compute_checksum(&timestamp, payload, secret);
        Self {
            timestamp,
            checksum,
            app_key: app_key.to_string(),
            session_token: session_token.to_string(),
        }
    }

    /// Value of the `X-Checksum` header
    pub fn checksum_header(&self) -> String {
        format!("{}{}", CHECKSUM_PREFIX, self.checksum)
    }

    pub fn to_header_map(&self) -> Result<HeaderMap, AuthError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            HeaderName::from_static(X_CHECKSUM),
            header_value(X_CHECKSUM, &self.checksum_header())?,
        );
        headers.insert(
            HeaderName::from_static(X_TIMESTAMP),
            header_value(X_TIMESTAMP, &self.timestamp)?,
        );
        headers.insert(
            HeaderName::from_static(X_APP_KEY),
            header_value(X_APP_KEY, &self.app_key)?,
        );
        let mut token = header_value(X_SESSION_TOKEN, &self.session_token)?;
        token.set_sensitive(true);
        headers.insert(HeaderName::from_static(X_SESSION_TOKEN), token);
        Ok(headers)
    }
}

impl fmt::Debug for AuthHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeaders")
            .field("timestamp", &self.timestamp)
            .field("checksum", &"<redacted>")
            .field("app_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .finish()
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, AuthError> {
    HeaderValue::from_str(value).map_err(|_| AuthError::InvalidHeader(name))
}
