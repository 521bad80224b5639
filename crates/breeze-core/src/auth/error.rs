use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No valid session - please authenticate first")]
    NoSession,

    #[error("Authentication rejected: {0}")]
    RemoteRejected(String),

    #[error("Authentication HTTP error: status {0}")]
    HttpStatus(u16),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid authentication response: {0}")]
    InvalidResponse(String),

    #[error("Session token is empty")]
    EmptyToken,

    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),
}
