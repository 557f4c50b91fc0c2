//! Error-response classification
//!
//! Distinguishes the rate-limit signal (which drives credential rotation
//! and cooldown) from every other API error (which is fatal for that user
//! and never retried). Rate limiting is recognizable by HTTP 429, the
//! v1.1 error code 88, or the documented message text.

use serde::Deserialize;
use source::EdgeResult;

/// v1.1 error code for "Rate limit exceeded".
const RATE_LIMIT_CODE: i64 = 88;

/// Message fragment the API uses for rate limiting.
const RATE_LIMIT_MESSAGE: &str = "rate limit exceeded";

/// Error payload shape of v1.1 responses: `{"errors":[{"code":88,"message":"..."}]}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

/// Classify a non-success API response into an `EdgeResult`.
///
/// Everything that is not the rate-limit signal maps to `Fatal` with the
/// upstream code and message preserved for the event log.
pub fn classify_error(status: u16, body: &str) -> EdgeResult {
    if status == 429 {
        return EdgeResult::RateLimited;
    }

    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body)
        && let Some(first) = parsed.errors.first()
    {
        if first.code == Some(RATE_LIMIT_CODE)
            || first.message.to_lowercase().contains(RATE_LIMIT_MESSAGE)
        {
            return EdgeResult::RateLimited;
        }
        return EdgeResult::Fatal(match first.code {
            Some(code) => format!("api error {code}: {}", first.message),
            None => format!("api error: {}", first.message),
        });
    }

    EdgeResult::Fatal(format!("http {status}: {body}"))
}
