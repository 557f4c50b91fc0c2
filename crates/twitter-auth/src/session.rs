//! Authenticated API session
//!
//! A `TwitterSession` is bound to exactly one pool credential. Opening a
//! session verifies the credential against the API; fetching classifies
//! every possible response into an `EdgeResult`, so the collection engine
//! never sees a transport- or API-shaped error.

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;
use source::{EdgeResult, EdgeSource};
use tracing::debug;

use crate::classify::classify_error;
use crate::credentials::Credential;
use crate::error::{Error, Result};
use crate::oauth::{OAuthSigner, percent_encode};

/// Response shape of `friends/ids`: the ids of everyone the user follows.
#[derive(Debug, Deserialize)]
struct FriendIds {
    ids: Vec<u64>,
}

/// A live authenticated handle bound to one credential.
pub struct TwitterSession {
    client: reqwest::Client,
    signer: OAuthSigner,
    base_url: String,
}

impl TwitterSession {
    /// Open a session: sign and send a `verify_credentials` call so a dead
    /// credential is detected at bind time, not on the first user fetch.
    pub async fn open(
        client: reqwest::Client,
        credential: &Credential,
        base_url: &str,
    ) -> Result<Self> {
        let session = Self {
            client,
            signer: OAuthSigner::new(credential),
            base_url: base_url.trim_end_matches('/').to_owned(),
        };

        let url = format!("{}/account/verify_credentials.json", session.base_url);
        let auth = session.signer.sign("GET", &url, &[])?;
        let response = session
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .send()
            .await
            .map_err(|e| Error::Http(format!("verify_credentials request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "credential rejected ({status}): {body}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Http(format!(
                "verify_credentials returned {status}: {body}"
            )));
        }

        debug!("session opened");
        Ok(session)
    }

    /// Fetch and classify the follow set for one user id.
    async fn fetch(&self, user_id: &str) -> EdgeResult {
        let url = format!("{}/friends/ids.json", self.base_url);
        let params = vec![("user_id".to_string(), user_id.to_string())];

        let auth = match self.signer.sign("GET", &url, &params) {
            Ok(header) => header,
            Err(e) => return EdgeResult::Fatal(format!("signing failed: {e}")),
        };

        // The query string must carry exactly the parameters that were
        // signed, so it is built from the same list.
        let response = match self
            .client
            .get(request_url(&url, &params))
            .header(reqwest::header::AUTHORIZATION, auth)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return EdgeResult::Fatal(format!("transport error: {e}")),
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => return EdgeResult::Fatal(format!("reading response body: {e}")),
        };

        if !(200..300).contains(&status) {
            return classify_error(status, &body);
        }

        match serde_json::from_str::<FriendIds>(&body) {
            Ok(friends) => EdgeResult::from_ids(friends.ids),
            Err(e) => EdgeResult::Fatal(format!("malformed friends/ids response: {e}")),
        }
    }
}

/// Append query parameters to an endpoint URL, percent-encoded the same
/// way they were encoded for signing.
fn request_url(url: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return url.to_owned();
    }
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{url}?{query}")
}

impl EdgeSource for TwitterSession {
    fn fetch_follows<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = EdgeResult> + Send + 'a>> {
        Box::pin(self.fetch(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friend_ids_deserializes() {
        let body = r#"{"ids":[9,3,5],"next_cursor":0,"previous_cursor":0}"#;
        let friends: FriendIds = serde_json::from_str(body).unwrap();
        assert_eq!(friends.ids, vec![9, 3, 5]);
    }

    #[test]
    fn friend_ids_empty_list() {
        let friends: FriendIds = serde_json::from_str(r#"{"ids":[]}"#).unwrap();
        assert!(friends.ids.is_empty());
    }

    #[test]
    fn request_url_appends_signed_parameters() {
        let url = request_url(
            "https://api.twitter.com/1.1/friends/ids.json",
            &[("user_id".to_string(), "12345".to_string())],
        );
        assert_eq!(
            url,
            "https://api.twitter.com/1.1/friends/ids.json?user_id=12345"
        );
    }

    #[test]
    fn request_url_without_parameters_is_unchanged() {
        let url = "https://api.twitter.com/1.1/account/verify_credentials.json";
        assert_eq!(request_url(url, &[]), url);
    }

    #[test]
    fn friend_ids_classifies_sorted() {
        let friends: FriendIds = serde_json::from_str(r#"{"ids":[9,3,5]}"#).unwrap();
        assert_eq!(
            EdgeResult::from_ids(friends.ids),
            EdgeResult::Follows(vec![3, 5, 9])
        );
    }
}
