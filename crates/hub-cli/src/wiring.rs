// crates/hub-cli/src/wiring.rs
// ============================================================================
// Module: CLI Runtime Wiring
// Description: Builds collaborators from validated configuration.
// Purpose: Keep command handlers free of construction details.
// Dependencies: hub-config, hub-core, hub-providers, hub-reveal, hub-store-sqlite
// ============================================================================

//! ## Overview
//! [`HubRuntime`] owns everything a command needs: the operator log sink,
//! the session provider, the backend client, and the snapshot cache. Each
//! piece is built from a validated [`HubConfig`]; construction failures are
//! returned as messages for the CLI error path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use hub_config::HubConfig;
use hub_config::LogSinkKind;
use hub_config::LoggingConfig;
use hub_core::CacheSeeder;
use hub_core::Clock;
use hub_core::FileLogSink;
use hub_core::HubLogEvent;
use hub_core::HubLogSink;
use hub_core::LogLevel;
use hub_core::NoopLogSink;
use hub_core::SessionProvider;
use hub_core::StderrLogSink;
use hub_core::SystemClock;
use hub_core::WidgetListResolver;
use hub_core::WidgetSnapshotCache;
use hub_providers::BackendClient;
use hub_providers::BackendClientConfig;
use hub_providers::EnvSessionProvider;
use hub_providers::HttpWidgetListSource;
use hub_providers::KindRegistry;
use hub_providers::WidgetMutationClient;
use hub_reveal::RarityWeightTable;
use hub_reveal::RevealGeometry;
use hub_store_sqlite::SqliteSnapshotStore;

// ============================================================================
// SECTION: Runtime
// ============================================================================

/// Collaborators built from configuration.
pub struct HubRuntime {
    /// Validated configuration.
    pub config: HubConfig,
    /// Operator log sink.
    pub log: Arc<dyn HubLogSink>,
    /// Session token lookup.
    pub session: Arc<dyn SessionProvider>,
    /// Shared backend client.
    pub client: BackendClient,
}

impl HubRuntime {
    /// Builds the runtime and runs startup checks.
    ///
    /// # Errors
    ///
    /// Returns a message when the log sink or backend client cannot be built.
    pub fn new(config: HubConfig) -> Result<Self, String> {
        let log = build_log_sink(&config.logging)?;
        let base_url = config.backend.parsed_base_url().map_err(|err| err.to_string())?;
        let client = BackendClient::new(&BackendClientConfig {
            base_url,
            connect_timeout: config.backend.connect_timeout(),
            user_agent: config.backend.user_agent.clone(),
            max_response_bytes: config.backend.max_response_bytes,
        })
        .map_err(|err| err.to_string())?;
        let session: Arc<dyn SessionProvider> =
            Arc::new(EnvSessionProvider::new(config.session.token_env.clone()));
        let runtime = Self {
            config,
            log,
            session,
            client,
        };
        runtime.startup_checks();
        Ok(runtime)
    }

    /// Runs profile-dependent startup checks.
    fn startup_checks(&self) {
        if !self.config.profile.is_development() {
            return;
        }
        check_weight_table(self.log.as_ref());
    }

    /// Opens the snapshot cache, dropping rows that expired while closed.
    ///
    /// # Errors
    ///
    /// Returns a message when the SQLite store cannot be opened.
    pub fn snapshot_cache(&self) -> Result<WidgetSnapshotCache, String> {
        let store = SqliteSnapshotStore::new(&self.config.cache.store_config())
            .map_err(|err| format!("snapshot cache unavailable: {err}"))?;
        purge_expired_snapshots(&store, SystemClock.now_ms(), self.log.as_ref());
        Ok(WidgetSnapshotCache::new(Arc::new(store))
            .with_ttl(self.config.cache.ttl())
            .with_log_sink(Arc::clone(&self.log)))
    }

    /// Builds the widget list resolver over `cache`.
    #[must_use]
    pub fn resolver(&self, cache: WidgetSnapshotCache) -> WidgetListResolver {
        let source = HttpWidgetListSource::new(self.client.clone(), self.config.backend.list_timeout());
        WidgetListResolver::new(Arc::new(source), Arc::clone(&self.session), cache)
            .with_log_sink(Arc::clone(&self.log))
    }

    /// Builds the at-most-once cache seeder over `cache`.
    #[must_use]
    pub fn seeder(&self, cache: WidgetSnapshotCache) -> CacheSeeder {
        CacheSeeder::new(cache).with_log_sink(Arc::clone(&self.log))
    }

    /// Builds the kind registry with configured poll intervals.
    #[must_use]
    pub fn registry(&self) -> KindRegistry {
        let polling = self.config.polling.clone();
        KindRegistry::from_http(
            &self.client,
            &self.session,
            self.config.backend.data_timeout(),
            move |kind| polling.interval_for(kind),
        )
    }

    /// Builds the widget mutation client.
    #[must_use]
    pub fn mutation_client(&self) -> WidgetMutationClient {
        WidgetMutationClient::new(
            self.client.clone(),
            Arc::clone(&self.session),
            self.config.backend.data_timeout(),
        )
    }

    /// Returns the configured reveal geometry.
    #[must_use]
    pub const fn reveal_geometry(&self) -> RevealGeometry {
        reveal_geometry(&self.config)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the operator log sink.
///
/// # Errors
///
/// Returns a message when the log file cannot be opened.
pub fn build_log_sink(config: &LoggingConfig) -> Result<Arc<dyn HubLogSink>, String> {
    match (config.sink, &config.path) {
        (LogSinkKind::Stderr, _) => Ok(Arc::new(StderrLogSink)),
        (LogSinkKind::None, _) => Ok(Arc::new(NoopLogSink)),
        (LogSinkKind::File, Some(path)) => FileLogSink::new(path)
            .map(|sink| Arc::new(sink) as Arc<dyn HubLogSink>)
            .map_err(|err| format!("failed to open log file {}: {err}", path.display())),
        (LogSinkKind::File, None) => Err("file logging requires logging.path".to_string()),
    }
}

/// Deletes expired snapshot rows and logs the outcome.
///
/// A failed purge is logged and otherwise ignored: expired rows are never
/// served, they only take up space. Returns the number of rows removed.
pub fn purge_expired_snapshots(
    store: &SqliteSnapshotStore,
    now_ms: i64,
    log: &dyn HubLogSink,
) -> usize {
    match store.purge_expired(now_ms) {
        Ok(0) => 0,
        Ok(removed) => {
            log.record(&HubLogEvent::new(
                "snapshot_cache_purged",
                LogLevel::Info,
                format!("removed {removed} expired snapshots"),
            ));
            removed
        }
        Err(err) => {
            log.record(&HubLogEvent::new(
                "snapshot_cache_purge_failed",
                LogLevel::Warn,
                err.to_string(),
            ));
            0
        }
    }
}

/// Validates the shipped rarity table and logs the outcome.
///
/// Returns true when the table is valid.
pub fn check_weight_table(log: &dyn HubLogSink) -> bool {
    let table = RarityWeightTable::standard();
    match table.validate() {
        Ok(()) => {
            log.record(&HubLogEvent::new(
                "weight_table_checked",
                LogLevel::Info,
                format!("rarity weights sum to {}", table.total()),
            ));
            true
        }
        Err(err) => {
            log.record(&HubLogEvent::new("weight_table_invalid", LogLevel::Error, err.to_string()));
            false
        }
    }
}

/// Maps reveal configuration to controller geometry.
#[must_use]
pub const fn reveal_geometry(config: &HubConfig) -> RevealGeometry {
    RevealGeometry {
        strip_length: config.reveal.strip_length,
        spin_rounds: config.reveal.spin_rounds,
        item_width_px: config.reveal.item_width_px,
        container_width_px: config.reveal.container_width_px,
        animation_ms: config.reveal.animation_ms,
    }
}
