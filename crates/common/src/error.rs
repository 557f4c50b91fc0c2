//! Workspace-wide error type
//!
//! `Config` covers every malformed-source condition that must abort the run
//! before any fetching starts: bad TOML, an empty credential file, a
//! non-numeric user id. Per-user API outcomes are never represented here;
//! they stay inside the collection state machine.

use thiserror::Error;

/// Shared error type for setup and sink plumbing
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using common Error
pub type Result<T> = std::result::Result<T, Error>;
