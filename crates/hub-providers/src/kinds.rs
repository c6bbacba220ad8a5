// crates/hub-providers/src/kinds.rs
// ============================================================================
// Module: HTTP Kind Fetcher
// Description: Per-kind widget data fetch over the backend API.
// Purpose: Implement `KindFetcher` for the `/api/widgets/{kind}` endpoints.
// Dependencies: async-trait, hub-core, serde_json
// ============================================================================

//! ## Overview
//! One [`HttpKindFetcher`] serves one widget kind. Each fetch resolves the
//! session token, issues `GET /api/widgets/{kind}?instanceId=<id>`, and
//! decodes the body into the kind's typed data. A missing session fails
//! without sending a request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hub_core::FetchError;
use hub_core::InstanceId;
use hub_core::KindData;
use hub_core::KindFetcher;
use hub_core::SessionProvider;
use hub_core::WidgetKind;
use serde_json::Value;

use crate::http::BackendClient;
use crate::http::HttpError;

// ============================================================================
// SECTION: Fetcher
// ============================================================================

/// Data fetcher for one widget kind.
#[derive(Clone)]
pub struct HttpKindFetcher {
    /// Shared backend client.
    client: BackendClient,
    /// Session lookup.
    session: Arc<dyn SessionProvider>,
    /// Kind served by this fetcher.
    kind: WidgetKind,
    /// Request timeout.
    timeout: Duration,
}

impl HttpKindFetcher {
    /// Creates a fetcher for `kind`.
    #[must_use]
    pub fn new(
        client: BackendClient,
        session: Arc<dyn SessionProvider>,
        kind: WidgetKind,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            session,
            kind,
            timeout,
        }
    }

    /// Returns the kind served by this fetcher.
    #[must_use]
    pub const fn kind(&self) -> WidgetKind {
        self.kind
    }
}

#[async_trait]
impl KindFetcher for HttpKindFetcher {
    async fn fetch(&self, instance_id: &InstanceId) -> Result<KindData, FetchError> {
        let token = self.session.bearer_token().await.ok_or(FetchError::Unauthenticated)?;
        let mut url =
            self.client.endpoint(&["api", "widgets", self.kind.as_str()]).map_err(fetch_error)?;
        url.query_pairs_mut().append_pair("instanceId", instance_id.as_str());
        let body = self.client.get(url, &token, self.timeout).await.map_err(fetch_error)?;
        let payload: Value =
            serde_json::from_slice(&body).map_err(|err| FetchError::Decode(err.to_string()))?;
        KindData::decode(self.kind, payload).map_err(|err| FetchError::Decode(err.to_string()))
    }
}

/// Maps a transport failure to the fetch error taxonomy.
fn fetch_error(err: HttpError) -> FetchError {
    match err {
        HttpError::Timeout(detail) => FetchError::Timeout(detail),
        HttpError::Status {
            status,
            body,
        } => FetchError::Status {
            status,
            body,
        },
        HttpError::TooLarge {
            ..
        } => FetchError::Decode(err.to_string()),
        HttpError::Config(_)
        | HttpError::Connect(_)
        | HttpError::Dns(_)
        | HttpError::Transport(_) => FetchError::Transport(err.to_string()),
    }
}
