//! Error types for rotation operations

/// Errors from rotation operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("credential pool is empty")]
    EmptyPool,

    #[error("opening session: {0}")]
    Session(#[from] source::SourceError),
}

/// Result alias for rotation operations.
pub type Result<T> = std::result::Result<T, Error>;
