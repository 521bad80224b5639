//! Authentication module for Breeze API sessions.
//!
//! This module provides:
//! - `SessionManager`: session lifecycle (generate, validate, logout) and
//!   per-request auth headers
//! - `compute_checksum` / `AuthHeaders`: the request signing scheme
//! - `CredentialStore`: OS-level password storage via keyring
//!
//! Sessions live in memory only and expire 23 hours after creation.

pub mod credentials;
pub mod error;
pub mod session;
pub mod signing;

pub use credentials::{CredentialStore, Credentials};
pub use error::AuthError;
pub use session::{SessionData, SessionEstablished, SessionManager};
pub use signing::{compute_checksum, format_timestamp, AuthHeaders, Checksum};
