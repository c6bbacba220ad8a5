// crates/hub-providers/src/list.rs
// ============================================================================
// Module: HTTP Widget List Source
// Description: Authoritative widget list fetch over the backend API.
// Purpose: Implement `WidgetListSource` with structured failure reporting.
// Dependencies: async-trait, hub-core, serde_json
// ============================================================================

//! ## Overview
//! [`HttpWidgetListSource`] issues `GET /api/widgets/list` with the session
//! credential and a short request timeout. Every failure is reported as a
//! [`ListSourceError`] variant so the resolver can classify it as offline
//! without matching on message text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use hub_core::BearerToken;
use hub_core::ListSourceError;
use hub_core::WidgetListSource;
use hub_core::WidgetRow;

use crate::http::BackendClient;
use crate::http::HttpError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path segments of the list endpoint.
const LIST_PATH: [&str; 3] = ["api", "widgets", "list"];

// ============================================================================
// SECTION: Source
// ============================================================================

/// Widget list source backed by the backend HTTP API.
#[derive(Debug, Clone)]
pub struct HttpWidgetListSource {
    /// Shared backend client.
    client: BackendClient,
    /// Request timeout.
    timeout: Duration,
}

impl HttpWidgetListSource {
    /// Creates a list source using `timeout` per request.
    #[must_use]
    pub const fn new(client: BackendClient, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
        }
    }
}

#[async_trait]
impl WidgetListSource for HttpWidgetListSource {
    async fn fetch_list(&self, token: &BearerToken) -> Result<Vec<WidgetRow>, ListSourceError> {
        let url = self.client.endpoint(&LIST_PATH).map_err(list_error)?;
        let body = self.client.get(url, token, self.timeout).await.map_err(list_error)?;
        serde_json::from_slice::<Vec<WidgetRow>>(&body)
            .map_err(|err| ListSourceError::Malformed(err.to_string()))
    }
}

/// Maps a transport failure to the list error taxonomy.
fn list_error(err: HttpError) -> ListSourceError {
    match err {
        HttpError::Config(detail) => ListSourceError::Config(detail),
        HttpError::Timeout(detail) => ListSourceError::Timeout(detail),
        HttpError::Connect(detail) => ListSourceError::Connect(detail),
        HttpError::Dns(detail) => ListSourceError::Dns(detail),
        HttpError::Transport(detail) => ListSourceError::Other(format!("network error: {detail}")),
        HttpError::Status {
            status,
            body,
        } => ListSourceError::Status {
            status,
            body,
        },
        HttpError::TooLarge {
            max_bytes,
        } => ListSourceError::Malformed(format!("response exceeds {max_bytes} bytes")),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use super::*;

    /// Verifies transport failures mark the list fetch offline.
    #[test]
    fn transport_failures_classify_as_offline() {
        assert!(list_error(HttpError::Timeout("slow".to_string())).is_offline());
        assert!(list_error(HttpError::Connect("refused".to_string())).is_offline());
        assert!(list_error(HttpError::Dns("no such host".to_string())).is_offline());
        assert!(list_error(HttpError::Transport("reset".to_string())).is_offline());
    }

    /// Verifies only 5xx statuses among non-transport failures are offline.
    #[test]
    fn non_transport_failures_are_not_offline() {
        assert!(!list_error(HttpError::Config("bad url".to_string())).is_offline());
        assert!(!list_error(HttpError::TooLarge { max_bytes: 8 }).is_offline());
        assert!(
            !list_error(HttpError::Status {
                status: 403,
                body: String::new(),
            })
            .is_offline()
        );
        assert!(
            list_error(HttpError::Status {
                status: 503,
                body: String::new(),
            })
            .is_offline()
        );
    }
}
