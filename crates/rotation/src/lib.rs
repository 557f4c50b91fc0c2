//! Credential rotation for rate-limited collection
//!
//! Owns the single piece of mutable shared state in the engine: which
//! credential the active session is bound to. On a rate-limit signal the
//! coordinator rotates to the next credential while unused ones remain;
//! once the full pool has been tried within one detection window it
//! demands a cooldown instead, because rotating further would only
//! re-encounter the shared limit.
//!
//! Rotation state persists across user ids: exhaustion detected on one
//! user carries forward to the next.

pub mod coordinator;
pub mod error;

pub use coordinator::{RateLimitCoordinator, RotationDecision};
pub use error::{Error, Result};
