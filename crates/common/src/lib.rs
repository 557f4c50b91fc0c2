//! Shared types for the follow-graph harvester

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
