//! REST API client module for Breeze trading endpoints.
//!
//! This module provides the `TradingApiClient` for reading funds, holdings
//! and orders once a session has been established.
//!
//! Every request is signed with a per-request checksum obtained from the
//! `SessionManager`; responses arrive wrapped in a `{Status, Success, Error}`
//! envelope which is unwrapped into `ApiResult`.

pub mod client;
pub mod error;

pub use client::TradingApiClient;
pub use error::{ApiError, ApiResult};
