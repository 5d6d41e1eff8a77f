//! WealthBox API client implementation.
//!
//! This module provides the main client for the WealthBox CRM REST API v1.
//! It handles authentication, the paginated GET loop, request/response
//! processing, error classification, and retry logic for transient server
//! failures.

use std::cell::Cell;
use std::fmt;
use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::{header, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{ApiError, Result};
use super::resources::{self, ResourceSpec};
use super::types::CurrentUserResponse;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.crmworkspace.com/v1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Server statuses retried for idempotent requests.
const RETRY_STATUS_CODES: [u16; 4] = [500, 502, 503, 504];

/// Fallback when a 429 response carries no usable `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Construction-time settings for [`WealthBoxClient`].
///
/// Immutable once the client is built.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API endpoint; override for tests or staging environments.
    pub base_url: String,
    /// Maximum retries for transient server failures on idempotent requests.
    pub max_retries: u32,
    /// Multiplier for the exponential retry delay, in seconds.
    pub backoff_factor: f64,
    /// Per-request timeout for the underlying transport.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries: 3,
            backoff_factor: 0.5,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// The WealthBox API client.
///
/// All methods are synchronous and blocking: each call performs its network
/// I/O and returns before the caller proceeds. The client reuses one HTTP
/// session across calls but provides no synchronization; for concurrent
/// requests, create one client per thread.
pub struct WealthBoxClient {
    /// The HTTP session, shared across calls.
    http: Client,
    /// Base URL without a trailing slash.
    base_url: String,
    /// Raw access token sent in the `ACCESS_TOKEN` header.
    token: String,
    max_retries: u32,
    backoff_factor: f64,
    /// Current user ID, cached after the first `get_my_user_id` call.
    user_id: Cell<Option<u64>>,
}

impl fmt::Debug for WealthBoxClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The token never appears in debug output.
        f.debug_struct("WealthBoxClient")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field("backoff_factor", &self.backoff_factor)
            .finish_non_exhaustive()
    }
}

impl WealthBoxClient {
    /// Create a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_config(token, ClientConfig::default())
    }

    /// Create a client with explicit settings.
    pub fn with_config(token: &str, config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            max_retries: config.max_retries,
            backoff_factor: config.backoff_factor,
            user_id: Cell::new(None),
        })
    }

    /// Create a client using the token from the process environment or the
    /// credentials file (see [`crate::config::load_token`]).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if no token can be found.
    pub fn from_env() -> Result<Self> {
        let token = crate::config::load_token().ok_or_else(|| {
            ApiError::Config(format!(
                "No API token found. Set {} or write the credentials file",
                crate::config::TOKEN_ENV_VAR
            ))
        })?;
        Self::new(&token)
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The cached current-user ID, if `get_my_user_id` has been called.
    pub fn user_id(&self) -> Option<u64> {
        self.user_id.get()
    }

    /// Fetch the authenticated user's ID via `GET me` and cache it.
    pub fn get_my_user_id(&self) -> Result<u64> {
        if let Some(id) = self.user_id.get() {
            return Ok(id);
        }
        let body = self.api_request(&resources::ME, &[])?;
        let response: CurrentUserResponse =
            serde_json::from_value(body.clone()).map_err(|_| ApiError::Api {
                message: "Expected key 'current_user' not found in response".to_string(),
                body,
            })?;
        self.user_id.set(Some(response.current_user.id));
        Ok(response.current_user.id)
    }

    /// Perform a GET against a resource, following pagination.
    ///
    /// For paginated resources the response's `meta.total_pages` is
    /// authoritative: the client issues exactly that many requests
    /// (`page=1..=total_pages`) and returns the concatenated item arrays in
    /// page order as a `Value::Array`. Responses without `meta` count as a
    /// single page. Non-paginated resources (such as `me`) return the
    /// decoded body unchanged.
    pub fn api_request(&self, resource: &ResourceSpec, params: &[(String, String)]) -> Result<Value> {
        if !resource.paginated {
            let response = self.request(Method::GET, resource.path, params, None)?;
            return self.parse_json(response);
        }

        let first = self.fetch_page(resource, params, 1)?;
        let total_pages = read_total_pages(&first);
        let mut items = take_collection(resource, first)?;

        for page in 2..=total_pages {
            let body = self.fetch_page(resource, params, page)?;
            items.extend(take_collection(resource, body)?);
        }

        debug!(resource = resource.path, total_pages, items = items.len(), "fetched collection");
        Ok(Value::Array(items))
    }

    /// Like [`api_request`](Self::api_request), but unwraps the merged array.
    pub(crate) fn list(
        &self,
        resource: &ResourceSpec,
        params: &[(String, String)],
    ) -> Result<Vec<Value>> {
        match self.api_request(resource, params)? {
            Value::Array(items) => Ok(items),
            body => Err(ApiError::Api {
                message: format!("Expected a collection from '{}'", resource.path),
                body,
            }),
        }
    }

    /// Fetch one resource by ID via `GET {path}/{id}`. No pagination applies.
    pub fn api_get_single(&self, resource: &ResourceSpec, id: u64) -> Result<Value> {
        let path = format!("{}/{}", resource.path, id);
        let response = self.request(Method::GET, &path, &[], None)?;
        self.parse_json(response)
    }

    /// Issue a PUT with a JSON body and decode the response.
    pub fn api_put(&self, path: &str, data: &Value) -> Result<Value> {
        let response = self.request(Method::PUT, path, &[], Some(data))?;
        self.parse_json(response)
    }

    /// Issue a POST with a JSON body and decode the response.
    ///
    /// POSTs are never retried by the transport; a transient failure
    /// surfaces to the caller rather than risking duplicate creation.
    pub fn api_post(&self, path: &str, data: &Value) -> Result<Value> {
        let response = self.request(Method::POST, path, &[], Some(data))?;
        self.parse_json(response)
    }

    /// Issue a DELETE. Succeeds on HTTP 200 or 204.
    pub fn api_delete(&self, path: &str) -> Result<()> {
        let response = self.request(Method::DELETE, path, &[], None)?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited {
                retry_after: retry_after_secs(response.headers()),
            });
        }
        if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let text = response.text()?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Err(ApiError::Api {
            message: format!("Delete failed with HTTP {}", status),
            body,
        })
    }

    fn fetch_page(
        &self,
        resource: &ResourceSpec,
        params: &[(String, String)],
        page: u32,
    ) -> Result<Value> {
        let mut query = params.to_vec();
        query.push(("page".to_string(), page.to_string()));
        let response = self.request(Method::GET, resource.path, &query, None)?;
        self.parse_json(response)
    }

    /// Send one request, transparently retrying transient server failures.
    ///
    /// Idempotent methods (GET, PUT, DELETE) are retried on connect/timeout
    /// errors and on the statuses in `RETRY_STATUS_CODES`, up to
    /// `max_retries` times with exponential backoff. POST is never retried.
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Response> {
        let url = format!("{}/{}", self.base_url, path);
        let retryable = method != Method::POST;
        let mut attempt: u32 = 0;

        loop {
            let mut builder = self
                .http
                .request(method.clone(), &url)
                .header("ACCESS_TOKEN", &self.token)
                .header(header::ACCEPT, "application/json");
            if !query.is_empty() {
                builder = builder.query(query);
            }
            if let Some(json) = body {
                builder = builder.json(json);
            }

            debug!(%method, %url, attempt, "sending request");
            let outcome = builder.send();

            let transient = match &outcome {
                Ok(response) => RETRY_STATUS_CODES.contains(&response.status().as_u16()),
                Err(err) => err.is_connect() || err.is_timeout(),
            };
            if !(retryable && transient && attempt < self.max_retries) {
                return outcome.map_err(ApiError::Network);
            }

            attempt += 1;
            let delay = retry_delay(self.backoff_factor, attempt);
            warn!(
                %url,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "transient server failure, retrying"
            );
            thread::sleep(delay);
        }
    }

    /// Classify a response and decode its JSON body.
    ///
    /// 429 maps to a rate-limit error before anything else; an undecodable
    /// body maps to a response error regardless of status; any remaining
    /// non-2xx status maps to an API error carrying the decoded payload.
    fn parse_json(&self, response: Response) -> Result<Value> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited {
                retry_after: retry_after_secs(response.headers()),
            });
        }

        let text = response.text()?;
        let body: Value = serde_json::from_str(&text).map_err(|err| ApiError::Response {
            message: format!("Failed to decode JSON from response: {}", err),
            text,
        })?;

        if !status.is_success() {
            return Err(ApiError::from_status(status, body));
        }
        Ok(body)
    }
}

/// Read `meta.total_pages` from a decoded list response. Absent or
/// malformed metadata counts as a single page.
fn read_total_pages(body: &Value) -> u32 {
    body.get("meta")
        .and_then(|meta| meta.get("total_pages"))
        .and_then(Value::as_u64)
        .map(|pages| pages as u32)
        .unwrap_or(1)
}

/// Extract the item array under the resource's collection key.
fn take_collection(resource: &ResourceSpec, mut body: Value) -> Result<Vec<Value>> {
    if let Some(Value::Array(items)) = body.get_mut(resource.collection_key) {
        return Ok(std::mem::take(items));
    }
    Err(ApiError::Api {
        message: format!(
            "Expected key '{}' not found in response",
            resource.collection_key
        ),
        body,
    })
}

/// Parse the `Retry-After` header, falling back to the default.
fn retry_after_secs(headers: &header::HeaderMap) -> u64 {
    headers
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Exponential backoff: `backoff_factor * 2^(attempt - 1)` seconds.
fn retry_delay(backoff_factor: f64, attempt: u32) -> Duration {
    let factor = backoff_factor.max(0.0);
    Duration::from_secs_f64(factor * 2f64.powi(attempt as i32 - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_retry_delay_exponential() {
        assert_eq!(retry_delay(0.5, 1), Duration::from_millis(500));
        assert_eq!(retry_delay(0.5, 2), Duration::from_secs(1));
        assert_eq!(retry_delay(0.5, 3), Duration::from_secs(2));
    }

    #[test]
    fn test_retry_delay_negative_factor_clamped() {
        assert_eq!(retry_delay(-1.0, 1), Duration::ZERO);
    }

    #[test]
    fn test_retry_after_header_value() {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::RETRY_AFTER, "60".parse().unwrap());
        assert_eq!(retry_after_secs(&headers), 60);
    }

    #[test]
    fn test_retry_after_fallback_when_absent() {
        let headers = header::HeaderMap::new();
        assert_eq!(retry_after_secs(&headers), DEFAULT_RETRY_AFTER_SECS);
    }

    #[test]
    fn test_retry_after_fallback_when_unparseable() {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::RETRY_AFTER, "soon".parse().unwrap());
        assert_eq!(retry_after_secs(&headers), DEFAULT_RETRY_AFTER_SECS);
    }

    #[test]
    fn test_read_total_pages() {
        assert_eq!(read_total_pages(&json!({"meta": {"total_pages": 3}})), 3);
        assert_eq!(read_total_pages(&json!({"meta": {}})), 1);
        assert_eq!(read_total_pages(&json!({})), 1);
    }

    #[test]
    fn test_take_collection_missing_key() {
        let body = json!({"wrong_key": [], "meta": {"total_pages": 1}});
        let err = take_collection(&resources::CONTACTS, body).unwrap_err();
        assert!(err
            .to_string()
            .contains("Expected key 'contacts' not found"));
    }

    #[test]
    fn test_config_base_url_trailing_slash_trimmed() {
        let config = ClientConfig {
            base_url: "https://api.crmworkspace.com/v1/".to_string(),
            ..Default::default()
        };
        let client = WealthBoxClient::with_config("t", config).unwrap();
        assert_eq!(client.base_url(), "https://api.crmworkspace.com/v1");
    }

    #[test]
    fn test_debug_does_not_expose_token() {
        let client = WealthBoxClient::new("secret_token").unwrap();
        let output = format!("{:?}", client);
        assert!(!output.contains("secret_token"));
    }
}
