//! Application configuration management.
//!
//! Configuration is read from environment variables (a `.env` file is loaded
//! by the binary before this runs). It is constructed once and handed to the
//! client; nothing here is global.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Default API root for Breeze
pub const DEFAULT_BASE_URL: &str = "https://api.icicidirect.com/breezeapi/v1";

/// Default environment name
const DEFAULT_ENVIRONMENT: &str = "development";

/// HTTP request timeout in seconds when `BREEZE_TIMEOUT_SECS` is unset.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_API_KEY: &str = "BREEZE_API_KEY";
const ENV_SECRET_KEY: &str = "BREEZE_SECRET_KEY";
const ENV_SESSION_TOKEN: &str = "BREEZE_SESSION_TOKEN";
const ENV_ACCOUNT_ID: &str = "BREEZE_ACCOUNT_ID";
const ENV_BASE_URL: &str = "BREEZE_BASE_URL";
const ENV_ENVIRONMENT: &str = "ENVIRONMENT";
const ENV_TIMEOUT_SECS: &str = "BREEZE_TIMEOUT_SECS";
const ENV_ORDERS_ENABLED: &str = "BREEZE_ORDERS_ENABLED";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
    pub account_id: Option<String>,
    pub base_url: String,
    pub environment: String,
    pub request_timeout: Duration,
    /// When false, order endpoints short-circuit to empty results.
    pub orders_enabled: bool,
}

/// Non-sensitive view of the configuration, safe to print or log.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConfigSummary {
    pub base_url: String,
    pub account_id: Option<String>,
    pub environment: String,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using an arbitrary key lookup.
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let request_timeout = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_TIMEOUT_SECS,
                        value: raw,
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let orders_enabled = match get(ENV_ORDERS_ENABLED) {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidValue {
                key: ENV_ORDERS_ENABLED,
                value: raw,
            })?,
            None => true,
        };

        Ok(Self {
            api_key: get(ENV_API_KEY),
            secret_key: get(ENV_SECRET_KEY),
            session_token: get(ENV_SESSION_TOKEN),
            account_id: get(ENV_ACCOUNT_ID),
            base_url: get(ENV_BASE_URL)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            environment: get(ENV_ENVIRONMENT).unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            request_timeout,
            orders_enabled,
        })
    }

    /// Check that every required value is present, reporting all missing ones at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.api_key.is_none() {
            missing.push(ENV_API_KEY);
        }
        if self.secret_key.is_none() {
            missing.push(ENV_SECRET_KEY);
        }
        if self.account_id.is_none() {
            missing.push(ENV_ACCOUNT_ID);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(missing))
        }
    }

    /// API key and secret, the minimum needed to sign requests.
    pub fn require_keys(&self) -> Result<(&str, &str), ConfigError> {
        match (self.api_key.as_deref(), self.secret_key.as_deref()) {
            (Some(api_key), Some(secret_key)) => Ok((api_key, secret_key)),
            (api_key, secret_key) => {
                let mut missing = Vec::new();
                if api_key.is_none() {
                    missing.push(ENV_API_KEY);
                }
                if secret_key.is_none() {
                    missing.push(ENV_SECRET_KEY);
                }
                Err(ConfigError::Missing(missing))
            }
        }
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            base_url: self.base_url.clone(),
            account_id: self.account_id.clone(),
            environment: self.environment.clone(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("account_id", &self.account_id)
            .field("base_url", &self.base_url)
            .field("environment", &self.environment)
            .field("request_timeout", &self.request_timeout)
            .field("orders_enabled", &self.orders_enabled)
            .finish()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
