// crates/hub-providers/src/http.rs
// ============================================================================
// Module: Backend HTTP Client
// Description: Shared reqwest client for backend API calls.
// Purpose: Centralize URL building, auth headers, timeouts, and body limits.
// Dependencies: hub-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! [`BackendClient`] wraps one `reqwest` client configured with the connect
//! timeout and user agent; each call carries its own request timeout.
//! Redirects are refused and response bodies are read incrementally up to a
//! fixed limit. Transport failures are classified into timeout, connect,
//! DNS, and generic buckets so callers can map them to their own errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::error::Error as StdError;
use std::time::Duration;

use hub_core::BearerToken;
use reqwest::Client;
use reqwest::Method;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use serde_json::Value;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum response body excerpt kept in status errors.
const MAX_BODY_EXCERPT: usize = 256;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Backend HTTP failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// The client or URL could not be built.
    #[error("backend client configuration error: {0}")]
    Config(String),
    /// The request exceeded its timeout.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),
    /// The backend host could not be resolved.
    #[error("dns lookup failed: {0}")]
    Dns(String),
    /// Any other transport failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The backend answered with a non-success status.
    #[error("backend returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        body: String,
    },
    /// The response body exceeded the configured limit.
    #[error("response exceeds {max_bytes} bytes")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
    },
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Backend client settings.
#[derive(Debug, Clone)]
pub struct BackendClientConfig {
    /// Backend base URL; endpoint paths are appended to its path.
    pub base_url: Url,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Maximum accepted response body size in bytes.
    pub max_response_bytes: usize,
}

/// Shared backend HTTP client.
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// Base URL.
    base_url: Url,
    /// Configured reqwest client.
    client: Client,
    /// Response size limit.
    max_response_bytes: usize,
}

impl BackendClient {
    /// Builds a backend client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Config`] when the base URL cannot carry paths or
    /// the client cannot be constructed.
    pub fn new(config: &BackendClientConfig) -> Result<Self, HttpError> {
        if config.base_url.cannot_be_a_base() {
            return Err(HttpError::Config("base url cannot carry a path".to_string()));
        }
        let client = Client::builder()
            .redirect(Policy::none())
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| HttpError::Config(err.to_string()))?;
        Ok(Self {
            base_url: config.base_url.clone(),
            client,
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the URL for `segments` below the base path.
    ///
    /// Segments are percent-encoded individually.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Config`] when the base URL cannot carry paths.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, HttpError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| HttpError::Config("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issues an authenticated GET and returns the body bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure, non-success status, or an
    /// oversized body.
    pub async fn get(
        &self,
        url: Url,
        token: &BearerToken,
        timeout: Duration,
    ) -> Result<Vec<u8>, HttpError> {
        let request = self.client.get(url).timeout(timeout);
        self.execute(request, token).await
    }

    /// Issues an authenticated request with an optional JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure, non-success status, or an
    /// oversized body.
    pub async fn send_json(
        &self,
        method: Method,
        url: Url,
        token: &BearerToken,
        body: Option<&Value>,
        timeout: Duration,
    ) -> Result<Vec<u8>, HttpError> {
        let mut request = self.client.request(method, url).timeout(timeout);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request, token).await
    }

    /// Sends a prepared request and reads the limited body.
    async fn execute(
        &self,
        request: RequestBuilder,
        token: &BearerToken,
    ) -> Result<Vec<u8>, HttpError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
            .map_err(|_| HttpError::Config("invalid bearer token".to_string()))?;
        auth.set_sensitive(true);
        let response = request
            .header(AUTHORIZATION, auth)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|err| classify_transport(&err))?;
        let status = response.status();
        let body = read_limited(response, self.max_response_bytes).await?;
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                body: body_excerpt(&body),
            });
        }
        Ok(body)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a response body, failing once it exceeds `max_bytes`.
async fn read_limited(mut response: Response, max_bytes: usize) -> Result<Vec<u8>, HttpError> {
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if response.content_length().is_some_and(|length| length > limit) {
        return Err(HttpError::TooLarge {
            max_bytes,
        });
    }
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|err| classify_transport(&err))? {
        if body.len().saturating_add(chunk.len()) > max_bytes {
            return Err(HttpError::TooLarge {
                max_bytes,
            });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Classifies a reqwest failure.
fn classify_transport(err: &reqwest::Error) -> HttpError {
    let detail = error_chain(err);
    if err.is_timeout() {
        HttpError::Timeout(detail)
    } else if err.is_connect() {
        if detail.to_ascii_lowercase().contains("dns") {
            HttpError::Dns(detail)
        } else {
            HttpError::Connect(detail)
        }
    } else {
        HttpError::Transport(detail)
    }
}

/// Joins an error and its sources into one line.
fn error_chain(err: &reqwest::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}

/// Returns a short, single-line excerpt of a response body.
fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut end = line.len().min(MAX_BODY_EXCERPT);
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    line[.. end].to_string()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
