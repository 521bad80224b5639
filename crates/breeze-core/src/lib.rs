//! Client library for the ICICI Breeze trading REST API.
//!
//! - `config`: environment-driven configuration
//! - `auth`: session lifecycle, request checksums and auth headers
//! - `api`: `TradingApiClient` read operations over an authenticated session
//! - `models`: funds, holdings and orders as returned by the API

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiError, ApiResult, TradingApiClient};
pub use auth::{
    AuthError, AuthHeaders, Checksum, CredentialStore, Credentials, SessionEstablished, SessionManager,
};
pub use config::{Config, ConfigError, ConfigSummary};
pub use models::{Funds, Holding, Order, OrderStatus};
