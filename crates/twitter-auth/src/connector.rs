//! Session factory backed by the credential pool
//!
//! `TwitterConnector` is the concrete `SessionFactory` handed to the
//! rotation coordinator: given a pool index it authenticates that
//! credential and returns a boxed session. Auth failures propagate as
//! fatal (skip-on-auth-failure is deliberately not implemented).

use std::future::Future;
use std::pin::Pin;

use source::{EdgeSource, SessionFactory, SourceError};
use tracing::info;

use crate::API_BASE_URL;
use crate::credentials::CredentialPool;
use crate::error::{Error, Result};
use crate::session::TwitterSession;

/// Build the shared HTTP client, honoring an optional proxy URL.
pub fn http_client(proxy: Option<&str>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("follow-harvester/", env!("CARGO_PKG_VERSION")));

    if let Some(url) = proxy {
        let proxy =
            reqwest::Proxy::all(url).map_err(|e| Error::Proxy(format!("{url}: {e}")))?;
        builder = builder.proxy(proxy);
        info!(proxy = url, "routing API traffic through proxy");
    }

    builder
        .build()
        .map_err(|e| Error::Http(format!("building http client: {e}")))
}

/// Factory for sessions bound to pool credentials.
pub struct TwitterConnector {
    client: reqwest::Client,
    pool: CredentialPool,
    base_url: String,
}

impl TwitterConnector {
    pub fn new(client: reqwest::Client, pool: CredentialPool) -> Self {
        Self::with_base_url(client, pool, API_BASE_URL)
    }

    /// Point the connector at a different API host (tests).
    pub fn with_base_url(client: reqwest::Client, pool: CredentialPool, base_url: &str) -> Self {
        Self {
            client,
            pool,
            base_url: base_url.to_owned(),
        }
    }

    /// Number of credentials available for rotation.
    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    async fn open_session(&self, index: usize) -> source::Result<Box<dyn EdgeSource>> {
        let credential = self.pool.get(index)?;
        let session = TwitterSession::open(self.client.clone(), credential, &self.base_url)
            .await
            .map_err(|e| match e {
                Error::Auth(msg) => SourceError::Auth(format!("credential {index}: {msg}")),
                other => SourceError::Internal(other.to_string()),
            })?;
        info!(credential_index = index, "session bound to credential");
        Ok(Box::new(session))
    }
}

impl SessionFactory for TwitterConnector {
    fn open(
        &self,
        credential_index: usize,
    ) -> Pin<Box<dyn Future<Output = source::Result<Box<dyn EdgeSource>>> + Send + '_>> {
        Box::pin(self.open_session(credential_index))
    }
}
