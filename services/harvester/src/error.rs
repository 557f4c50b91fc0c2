//! Service-level errors
//!
//! Only two things may abort a run once fetching has started: a session
//! that cannot be opened (dead credential) and an infrastructure fault on
//! the sinks. Per-user API outcomes never surface here.

/// Errors that abort the whole run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("collection engine: {0}")]
    Rotation(#[from] rotation::Error),

    #[error(transparent)]
    Common(#[from] common::Error),
}

/// Result alias for the harvester service.
pub type Result<T> = std::result::Result<T, Error>;
