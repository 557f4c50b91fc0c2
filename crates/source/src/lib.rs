//! Edge-source abstraction for the collection engine
//!
//! Defines the two seams that decouple the retry state machine from the
//! concrete API client: `EdgeSource` ("fetch the follow set for one user id")
//! and `SessionFactory` ("open an authenticated session for credential i").
//! The coordinator and collection loop depend only on these traits, so the
//! whole engine is testable against scripted in-memory fakes.
//!
//! A fetch never fails at this seam: every upstream condition is classified
//! into an `EdgeResult` variant immediately after the call, keeping the
//! state machine's branching explicit and independent of any particular
//! error-signaling mechanism.

use std::future::Future;
use std::pin::Pin;

/// Classified outcome of one fetch against the upstream API.
///
/// `Follows` is always non-empty and sorted ascending; a user with zero
/// follows is represented as `Empty`. Construct via [`EdgeResult::from_ids`]
/// to get both guarantees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeResult {
    /// Non-empty set of followed ids, sorted ascending
    Follows(Vec<u64>),
    /// The user follows nobody (or the API returned an empty set)
    Empty,
    /// The per-credential rate budget is exhausted; drives rotation/cooldown
    RateLimited,
    /// Any other API-reported error (deleted, suspended, protected, bad id).
    /// Never retried; the reason lands in the event log.
    Fatal(String),
}

impl EdgeResult {
    /// Classify a raw id list: empty becomes `Empty`, anything else is
    /// sorted ascending into `Follows`. Sorting an already-sorted list is
    /// a no-op, so re-classification is idempotent.
    pub fn from_ids(mut ids: Vec<u64>) -> Self {
        if ids.is_empty() {
            return EdgeResult::Empty;
        }
        ids.sort_unstable();
        EdgeResult::Follows(ids)
    }
}

/// Errors from opening a session.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The credential failed to authenticate. Fatal for the run: a pool
    /// with a dead credential needs operator attention, not silent skips.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Asked for a credential the pool does not have. The coordinator
    /// guards indices, so hitting this is a logic error upstream.
    #[error("credential index {index} out of range (pool size {size})")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("internal source error: {0}")]
    Internal(String),
}

/// Result alias for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// A live authenticated handle bound to exactly one credential.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Box<dyn EdgeSource>` is what the coordinator holds).
pub trait EdgeSource: Send + Sync {
    /// Fetch the set of ids this user follows, classified into an
    /// `EdgeResult`. Transport failures are classified too (`Fatal`);
    /// this call never errors at the type level.
    fn fetch_follows<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = EdgeResult> + Send + 'a>>;
}

/// Opens sessions for credentials by pool index.
///
/// The coordinator calls this lazily: on first use and after every
/// rotation. Implementations authenticate against the upstream API;
/// test fakes hand back scripted sources.
pub trait SessionFactory: Send + Sync {
    fn open(
        &self,
        credential_index: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn EdgeSource>>> + Send + '_>>;
}
