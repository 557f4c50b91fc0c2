//! Error types for session operations

/// Errors from credential and session operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("request signing failed: {0}")]
    Signing(String),

    #[error("invalid proxy: {0}")]
    Proxy(String),
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;
