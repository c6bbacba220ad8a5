// crates/hub-providers/src/session.rs
// ============================================================================
// Module: Session Providers
// Description: Bearer credential lookups for backend calls.
// Purpose: Supply the current session token without storing it in config.
// Dependencies: async-trait, hub-core
// ============================================================================

//! ## Overview
//! [`EnvSessionProvider`] reads the token from an environment variable on
//! every call, so a rotated credential is picked up without a restart.
//! [`StaticSessionProvider`] holds a fixed token for tests and embedding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use hub_core::BearerToken;
use hub_core::SessionProvider;

// ============================================================================
// SECTION: Providers
// ============================================================================

/// Session provider backed by an environment variable.
#[derive(Debug, Clone)]
pub struct EnvSessionProvider {
    /// Variable holding the bearer token.
    var: String,
}

impl EnvSessionProvider {
    /// Creates a provider reading `var`.
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self {
            var: var.into(),
        }
    }

    /// Returns the variable name.
    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }
}

#[async_trait]
impl SessionProvider for EnvSessionProvider {
    async fn bearer_token(&self) -> Option<BearerToken> {
        std::env::var(&self.var).ok().and_then(|value| BearerToken::new(value.trim()))
    }
}

/// Session provider holding a fixed token, or none.
#[derive(Debug, Clone, Default)]
pub struct StaticSessionProvider {
    /// Token returned on every call.
    token: Option<BearerToken>,
}

impl StaticSessionProvider {
    /// Creates a provider returning `token` when it is non-blank.
    #[must_use]
    pub fn new(token: &str) -> Self {
        Self {
            token: BearerToken::new(token),
        }
    }

    /// Creates a provider with no session.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            token: None,
        }
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn bearer_token(&self) -> Option<BearerToken> {
        self.token.clone()
    }
}
