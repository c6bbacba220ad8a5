// crates/hub-providers/src/mutations.rs
// ============================================================================
// Module: Widget Mutation Client
// Description: Create, update, and delete widgets through the backend API.
// Purpose: Map backend outcomes to short, stable error codes.
// Dependencies: hub-core, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! [`WidgetMutationClient`] issues the authenticated create, partial
//! update, and delete calls. Failures carry a short machine-readable code:
//! a well-formed `{"error": "<code>"}` body from the backend wins, otherwise
//! the HTTP status picks the code. A missing session fails as
//! `unauthorized` without sending anything.
//!
//! The widget kind is fixed at creation; updates only touch the title and
//! settings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use hub_core::BearerToken;
use hub_core::GridRect;
use hub_core::InstanceId;
use hub_core::SessionProvider;
use hub_core::WidgetKind;
use hub_core::WidgetRow;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::http::BackendClient;
use crate::http::HttpError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Grid placement used when a create request names none.
pub const DEFAULT_GRID: GridRect = GridRect {
    x: 0,
    y: 0,
    w: 1,
    h: 1,
};

/// Maximum backend error code length accepted from a response body.
const MAX_ERROR_CODE_LENGTH: usize = 64;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Body of a create call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateWidgetRequest {
    /// Display title.
    pub title: String,
    /// Widget kind.
    pub kind: WidgetKind,
    /// Kind-specific settings.
    pub settings: Value,
    /// Grid placement.
    pub grid: GridRect,
}

impl CreateWidgetRequest {
    /// Creates a request with empty settings and the default grid.
    #[must_use]
    pub fn new(title: impl Into<String>, kind: WidgetKind) -> Self {
        Self {
            title: title.into(),
            kind,
            settings: Value::Object(serde_json::Map::new()),
            grid: DEFAULT_GRID,
        }
    }

    /// Replaces the settings.
    #[must_use]
    pub fn with_settings(mut self, settings: Value) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the grid placement.
    #[must_use]
    pub const fn with_grid(mut self, grid: GridRect) -> Self {
        self.grid = grid;
        self
    }
}

/// Body of a partial update call. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateWidgetRequest {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Settings to merge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
}

impl UpdateWidgetRequest {
    /// Returns true when the request changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.settings.is_none()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Mutation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// No session credential was available.
    #[error("unauthorized")]
    Unauthorized,
    /// The backend could not be reached.
    #[error("network_error: {0}")]
    Network(String),
    /// The request was rejected locally before sending.
    #[error("invalid_request: {0}")]
    Invalid(String),
    /// The backend rejected the call.
    #[error("{code} (status {status})")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Short error code.
        code: String,
    },
    /// The backend accepted the call but its response was unreadable.
    #[error("malformed_response: {0}")]
    Malformed(String),
}

impl MutationError {
    /// Returns the short error code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Network(_) => "network_error",
            Self::Invalid(_) => "invalid_request",
            Self::Rejected {
                code, ..
            } => code,
            Self::Malformed(_) => "malformed_response",
        }
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Authenticated widget mutation client.
#[derive(Clone)]
pub struct WidgetMutationClient {
    /// Shared backend client.
    client: BackendClient,
    /// Session lookup.
    session: Arc<dyn SessionProvider>,
    /// Request timeout.
    timeout: Duration,
}

impl WidgetMutationClient {
    /// Creates a mutation client.
    #[must_use]
    pub fn new(client: BackendClient, session: Arc<dyn SessionProvider>, timeout: Duration) -> Self {
        Self {
            client,
            session,
            timeout,
        }
    }

    /// Creates a widget and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError`] when the title is blank, no session exists,
    /// or the backend rejects the call.
    pub async fn create(&self, request: &CreateWidgetRequest) -> Result<WidgetRow, MutationError> {
        if request.title.trim().is_empty() {
            return Err(MutationError::Invalid("title must not be blank".to_string()));
        }
        let token = self.token().await?;
        let body = to_body(request)?;
        let bytes = self
            .send(Method::POST, &["api", "widgets", "create"], &token, Some(&body))
            .await?;
        decode_row(&bytes)
    }

    /// Applies a partial update and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError`] when the request is empty or has a blank
    /// title, no session exists, or the backend rejects the call.
    pub async fn update(
        &self,
        instance_id: &InstanceId,
        request: &UpdateWidgetRequest,
    ) -> Result<WidgetRow, MutationError> {
        if request.is_empty() {
            return Err(MutationError::Invalid("update changes nothing".to_string()));
        }
        if request.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
            return Err(MutationError::Invalid("title must not be blank".to_string()));
        }
        let token = self.token().await?;
        let body = to_body(request)?;
        let bytes = self
            .send(Method::PATCH, &["api", "widgets", instance_id.as_str()], &token, Some(&body))
            .await?;
        decode_row(&bytes)
    }

    /// Deletes a widget.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError`] when no session exists or the backend
    /// rejects the call.
    pub async fn delete(&self, instance_id: &InstanceId) -> Result<(), MutationError> {
        let token = self.token().await?;
        self.send(Method::DELETE, &["api", "widgets", instance_id.as_str()], &token, None).await?;
        Ok(())
    }

    /// Resolves the session token.
    async fn token(&self) -> Result<BearerToken, MutationError> {
        self.session.bearer_token().await.ok_or(MutationError::Unauthorized)
    }

    /// Sends one mutation call.
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        token: &BearerToken,
        body: Option<&Value>,
    ) -> Result<Vec<u8>, MutationError> {
        let url = self.client.endpoint(segments).map_err(mutation_error)?;
        self.client.send_json(method, url, token, body, self.timeout).await.map_err(mutation_error)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serializes a request body.
fn to_body<T: Serialize>(request: &T) -> Result<Value, MutationError> {
    serde_json::to_value(request).map_err(|err| MutationError::Invalid(err.to_string()))
}

/// Decodes a widget row response.
fn decode_row(bytes: &[u8]) -> Result<WidgetRow, MutationError> {
    serde_json::from_slice(bytes).map_err(|err| MutationError::Malformed(err.to_string()))
}

/// Maps a transport failure to a mutation error.
fn mutation_error(err: HttpError) -> MutationError {
    match err {
        HttpError::Status {
            status,
            body,
        } => MutationError::Rejected {
            status,
            code: body_error_code(&body).unwrap_or_else(|| status_code(status).to_string()),
        },
        HttpError::TooLarge {
            ..
        } => MutationError::Malformed(err.to_string()),
        HttpError::Config(detail) => MutationError::Invalid(detail),
        HttpError::Timeout(_)
        | HttpError::Connect(_)
        | HttpError::Dns(_)
        | HttpError::Transport(_) => MutationError::Network(err.to_string()),
    }
}

/// Returns the code for an HTTP status.
const fn status_code(status: u16) -> &'static str {
    match status {
        400 => "invalid_request",
        401 => "unauthorized",
        403 => "forbidden",
        404 => "not_found",
        409 => "duplicate",
        _ => "server_error",
    }
}

/// Extracts a well-formed `error` code from a JSON response body.
fn body_error_code(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let code = value.get("error")?.as_str()?;
    let well_formed = !code.is_empty()
        && code.len() <= MAX_ERROR_CODE_LENGTH
        && code.bytes().all(|byte| {
            byte.is_ascii_lowercase() || byte.is_ascii_digit() || matches!(byte, b'.' | b'_' | b'-')
        });
    well_formed.then(|| code.to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
