use chrono::{DateTime, Duration, Utc};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError};
use crate::models::Envelope;

use super::credentials::Credentials;
use super::signing::AuthHeaders;
use super::AuthError;

/// Session lifetime in hours.
/// Breeze tokens are documented to last 24 hours; one hour is kept as margin.
const SESSION_LIFETIME_HOURS: i64 = 23;

/// `Source` value sent with every authentication request
const AUTH_SOURCE: &str = "API";

#[derive(Debug, Serialize)]
struct AuthenticateRequest<'a> {
    #[serde(rename = "AppKey")]
    app_key: &'a str,
    #[serde(rename = "AppSecret")]
    app_secret: &'a str,
    #[serde(rename = "UserId")]
    user_id: &'a str,
    #[serde(rename = "Password")]
    password: &'a str,
    #[serde(rename = "Source")]
    source: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthSuccess {
    session_token: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct SessionData {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionData {
    fn new(token: String, created_at: DateTime<Utc>) -> Self {
        Self {
            token,
            created_at,
            expires_at: created_at + Duration::hours(SESSION_LIFETIME_HOURS),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at - Utc::now()
    }
}

impl std::fmt::Debug for SessionData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionData")
            .field("token", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Returned when a session has been stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEstablished {
    pub expires_at: DateTime<Utc>,
}

/// Owns the credentials and the (single) session for a client.
///
/// The session sits behind one lock, so a manager shared between tasks sees
/// `generate_session` and `logout` as atomic replacements.
pub struct SessionManager {
    http: Client,
    base_url: String,
    credentials: Credentials,
    session: RwLock<Option<SessionData>>,
}

impl SessionManager {
    pub fn new(http: Client, base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            session: RwLock::new(None),
        }
    }

    /// Build a manager from configuration. API key and secret are required.
    pub fn from_config(http: Client, config: &Config) -> Result<Self, ConfigError> {
        let (api_key, secret_key) = config.require_keys()?;

        let mut credentials = Credentials::new(api_key, secret_key);
        if let Some(ref account_id) = config.account_id {
            credentials = credentials.with_account_id(account_id.clone());
        }
        Ok(Self::new(http, config.base_url.clone(), credentials))
    }

    pub fn account_id(&self) -> Option<&str> {
        self.credentials.account_id.as_deref()
    }

    /// Exchange user credentials for a session token.
    ///
    /// On failure nothing is stored and any existing session is left as is.
    pub async fn generate_session(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<SessionEstablished, AuthError> {
        let url = format!("{}/authenticate", self.base_url);
        let body = AuthenticateRequest {
            app_key: &self.credentials.api_key,
            app_secret: &self.credentials.secret_key,
            user_id,
            password,
            source: AUTH_SOURCE,
        };

        debug!(user_id, "Requesting session token");
        let response = self.http.post(&url).json(&body).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Authentication request failed");
            return Err(AuthError::HttpStatus(status.as_u16()));
        }

        let text = response.text().await?;
        let envelope: Envelope = serde_json::from_str(&text)
            .map_err(|e| AuthError::InvalidResponse(format!("Failed to parse auth response: {}", e)))?;

        if !envelope.is_ok() {
            let message = envelope.error_message();
            warn!(status = envelope.status, error = %message, "Authentication rejected");
            return Err(AuthError::RemoteRejected(message));
        }

        let token = envelope
            .into_success()
            .and_then(|v| serde_json::from_value::<AuthSuccess>(v).ok())
            .and_then(|s| s.session_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::InvalidResponse("Missing session_token".to_string()))?;

        let established = self.install(token, Utc::now()).await;
        info!(expires_at = %established.expires_at, "Session established");
        Ok(established)
    }

    /// Adopt a session token obtained elsewhere (e.g. `BREEZE_SESSION_TOKEN`).
    pub async fn resume_session(&self, token: &str) -> Result<SessionEstablished, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::EmptyToken);
        }
        let established = self.install(token.to_string(), Utc::now()).await;
        info!(expires_at = %established.expires_at, "Session resumed from supplied token");
        Ok(established)
    }

    async fn install(&self, token: String, now: DateTime<Utc>) -> SessionEstablished {
        let data = SessionData::new(token, now);
        let established = SessionEstablished {
            expires_at: data.expires_at,
        };
        *self.session.write().await = Some(data);
        established
    }

    /// True if a token is held and has not expired. Never touches the network.
    pub async fn validate_session(&self) -> bool {
        self.validate_session_at(Utc::now()).await
    }

    pub async fn validate_session_at(&self, now: DateTime<Utc>) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .map(|d| !d.token.is_empty() && !d.is_expired_at(now))
            .unwrap_or(false)
    }

    /// Get the session token if the session is valid
    pub async fn session_token(&self) -> Option<String> {
        let now = Utc::now();
        self.session
            .read()
            .await
            .as_ref()
            .filter(|d| !d.is_expired_at(now))
            .map(|d| d.token.clone())
    }

    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.session.read().await.as_ref().map(|d| d.expires_at)
    }

    pub async fn time_until_expiry(&self) -> Option<Duration> {
        self.session.read().await.as_ref().map(|d| d.time_until_expiry())
    }

    /// Sign `payload` for a request made now.
    pub async fn build_auth_headers(&self, payload: &str) -> Result<AuthHeaders, AuthError> {
        self.build_auth_headers_at(payload, Utc::now()).await
    }

    pub async fn build_auth_headers_at(
        &self,
        payload: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthHeaders, AuthError> {
        let guard = self.session.read().await;
        let data = guard
            .as_ref()
            .filter(|d| !d.is_expired_at(now))
            .ok_or(AuthError::NoSession)?;

        Ok(AuthHeaders::sign(
            now,
            payload,
            &self.credentials.secret_key,
            &self.credentials.api_key,
            &data.token,
        ))
    }

    /// Clear the session and tell the server, best effort.
    ///
    /// Local state is cleared before the remote call, so it is gone whatever
    /// the server or network does. Always returns true.
    pub async fn logout(&self) -> bool {
        let previous = self.session.write().await.take();
        let Some(data) = previous else {
            debug!("Logout with no active session");
            return true;
        };

        let url = format!("{}/logout", self.base_url);
        let result = self
            .http
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&data.token)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => info!("Logged out"),
            Ok(response) => {
                warn!(status = response.status().as_u16(), "Remote logout failed, local session cleared")
            }
            Err(e) => warn!(error = %e, "Remote logout failed, local session cleared"),
        }
        true
    }
}
