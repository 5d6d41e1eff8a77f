//! Error types for the WealthBox API client.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when interacting with the WealthBox API.
///
/// The three server-side failure kinds are disjoint: a 429 is always
/// [`ApiError::RateLimited`], an undecodable body is always
/// [`ApiError::Response`], and everything else the server rejects is
/// [`ApiError::Api`] with the decoded payload attached.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server responded, but with an unexpected status or payload shape.
    #[error("API error: {message}")]
    Api {
        message: String,
        /// The decoded (or best-effort) response payload, for diagnostics.
        body: Value,
    },

    /// The response body was not valid JSON.
    #[error("Response error: {message}")]
    Response {
        message: String,
        /// The raw response text, verbatim.
        text: String,
    },

    /// Rate limited by the WealthBox API (HTTP 429).
    ///
    /// The client never sleeps on 429; callers decide how to back off.
    #[error("Rate limited: retry after {retry_after} seconds")]
    RateLimited {
        /// Seconds to wait, from the `Retry-After` header.
        retry_after: u64,
    },

    /// Network or HTTP transport error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A named user, team, or category could not be resolved to an ID.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Token loading or other configuration failure.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Build an API error from a non-2xx response with a decoded body.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: Value) -> Self {
        ApiError::Api {
            message: format!("HTTP {} returned by the API", status),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rate_limited_display_includes_duration() {
        let err = ApiError::RateLimited { retry_after: 30 };
        assert_eq!(err.to_string(), "Rate limited: retry after 30 seconds");
    }

    #[test]
    fn test_from_status_carries_body() {
        let err = ApiError::from_status(
            reqwest::StatusCode::NOT_FOUND,
            json!({"error": "Not found"}),
        );
        match err {
            ApiError::Api { message, body } => {
                assert!(message.contains("404"));
                assert_eq!(body["error"], "Not found");
            }
            _ => panic!("Expected Api error"),
        }
    }

    #[test]
    fn test_response_error_keeps_raw_text() {
        let err = ApiError::Response {
            message: "Failed to decode JSON from response".to_string(),
            text: "not json".to_string(),
        };
        match err {
            ApiError::Response { text, .. } => assert_eq!(text, "not json"),
            _ => panic!("Expected Response error"),
        }
    }
}
