//! Twitter API authentication and session library
//!
//! Provides credential loading, OAuth 1.0a request signing, and the
//! concrete `EdgeSource`/`SessionFactory` implementations backed by the
//! v1.1 REST API. This crate is a standalone library with no dependency
//! on the harvester binary — it can be tested and used independently.
//!
//! Session flow:
//! 1. `CredentialPool::load()` reads the tokens CSV (row order = rotation order)
//! 2. `TwitterConnector` is handed to the rotation coordinator
//! 3. The coordinator calls `SessionFactory::open(i)` lazily per credential
//! 4. `TwitterSession::fetch_follows()` classifies every response into an
//!    `EdgeResult` via `classify::classify_error`

pub mod classify;
pub mod connector;
pub mod credentials;
pub mod error;
pub mod oauth;
pub mod session;

pub use classify::classify_error;
pub use connector::{TwitterConnector, http_client};
pub use credentials::{Credential, CredentialPool};
pub use error::{Error, Result};
pub use oauth::OAuthSigner;
pub use session::TwitterSession;

/// Base URL of the v1.1 REST API. Overridable per-connector for tests.
pub const API_BASE_URL: &str = "https://api.twitter.com/1.1";
