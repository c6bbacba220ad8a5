// crates/hub-config/src/config.rs
// ============================================================================
// Module: Widget Hub Configuration
// Description: Configuration loading and validation for the widget hub.
// Purpose: Provide strict, fail-closed config parsing with safe defaults.
// Dependencies: hub-core, hub-store-sqlite, serde, toml, url
// ============================================================================

//! ## Overview
//! This module loads `hub.toml` and validates every section. Only
//! `backend.base_url` is required; everything else falls back to the
//! defaults the dashboard ships with. Invalid values are rejected rather
//! than clamped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use hub_core::BuildProfile;
use hub_core::WidgetKind;
use hub_store_sqlite::SqliteStoreConfig;
use hub_store_sqlite::SqliteStoreMode;
use hub_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Limits and Defaults
// ============================================================================

/// Default config file name.
const DEFAULT_CONFIG_NAME: &str = "hub.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "HUB_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default widget list timeout in milliseconds.
pub(crate) const DEFAULT_LIST_TIMEOUT_MS: u64 = 3_000;
/// Default per-kind data timeout in milliseconds.
pub(crate) const DEFAULT_DATA_TIMEOUT_MS: u64 = 2_500;
/// Default connect timeout in milliseconds.
pub(crate) const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 1_000;
/// Minimum request timeout in milliseconds.
pub(crate) const MIN_REQUEST_TIMEOUT_MS: u64 = 100;
/// Maximum request timeout in milliseconds.
pub(crate) const MAX_REQUEST_TIMEOUT_MS: u64 = 30_000;
/// Default maximum backend response size in bytes.
pub(crate) const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;
/// Maximum allowed backend response size in bytes.
pub(crate) const MAX_MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
/// Default user agent for backend requests.
pub(crate) const DEFAULT_USER_AGENT: &str = "widget-hub/0.1";
/// Maximum user agent length.
pub(crate) const MAX_USER_AGENT_LENGTH: usize = 128;
/// Default environment variable holding the bearer token.
pub(crate) const DEFAULT_TOKEN_ENV: &str = "HUB_ACCESS_TOKEN";
/// Maximum environment variable name length.
pub(crate) const MAX_ENV_NAME_LENGTH: usize = 128;
/// Default snapshot cache file.
pub(crate) const DEFAULT_CACHE_PATH: &str = "hub-cache.sqlite3";
/// Default snapshot lifetime (7 days).
pub(crate) const DEFAULT_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;
/// Default `SQLite` busy timeout in milliseconds.
pub(crate) const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default minimum poll interval in milliseconds.
pub(crate) const DEFAULT_MIN_INTERVAL_MS: u64 = 1_000;
/// Default reveal strip length.
pub(crate) const DEFAULT_STRIP_LENGTH: usize = 40;
/// Default full strip passes before landing.
pub(crate) const DEFAULT_SPIN_ROUNDS: usize = 3;
/// Default reveal item width in pixels.
pub(crate) const DEFAULT_ITEM_WIDTH_PX: u32 = 160;
/// Default reveal viewport width in pixels.
pub(crate) const DEFAULT_CONTAINER_WIDTH_PX: u32 = 640;
/// Default reveal animation duration in milliseconds.
pub(crate) const DEFAULT_ANIMATION_MS: u64 = 5_500;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Widget hub configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    /// Build profile controlling error verbosity and startup checks.
    #[serde(default)]
    pub profile: BuildProfile,
    /// Backend API configuration.
    pub backend: BackendConfig,
    /// Session token configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Snapshot cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Poll interval configuration.
    #[serde(default)]
    pub polling: PollingConfig,
    /// Operator log configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Reveal engine configuration.
    #[serde(default)]
    pub reveal: RevealConfig,
}

impl HubConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config = Self::from_toml_str(content)?;
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.validate()?;
        self.session.validate()?;
        self.cache.validate()?;
        self.polling.validate()?;
        self.logging.validate()?;
        self.reveal.validate()?;
        Ok(())
    }
}

/// Backend API configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the backend API (scheme, host, optional port and prefix).
    pub base_url: String,
    /// Timeout for the widget list request in milliseconds.
    #[serde(default = "default_list_timeout_ms")]
    pub list_timeout_ms: u64,
    /// Timeout for per-kind data requests in milliseconds.
    #[serde(default = "default_data_timeout_ms")]
    pub data_timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Maximum accepted response body size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl BackendConfig {
    /// Returns the parsed base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the base URL is invalid.
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let trimmed = self.base_url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid("backend.base_url must be set".to_string()));
        }
        let url = Url::parse(trimmed)
            .map_err(|err| ConfigError::Invalid(format!("backend.base_url is invalid: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(
                "backend.base_url must use http:// or https://".to_string(),
            ));
        }
        if url.host_str().is_none() {
            return Err(ConfigError::Invalid("backend.base_url must include a host".to_string()));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(ConfigError::Invalid(
                "backend.base_url must not embed credentials".to_string(),
            ));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ConfigError::Invalid(
                "backend.base_url must not include a query or fragment".to_string(),
            ));
        }
        Ok(url)
    }

    /// Returns the widget list timeout.
    #[must_use]
    pub const fn list_timeout(&self) -> Duration {
        Duration::from_millis(self.list_timeout_ms)
    }

    /// Returns the per-kind data timeout.
    #[must_use]
    pub const fn data_timeout(&self) -> Duration {
        Duration::from_millis(self.data_timeout_ms)
    }

    /// Returns the connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Validates backend configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_base_url()?;
        validate_timeout("backend.list_timeout_ms", self.list_timeout_ms)?;
        validate_timeout("backend.data_timeout_ms", self.data_timeout_ms)?;
        validate_timeout("backend.connect_timeout_ms", self.connect_timeout_ms)?;
        if self.connect_timeout_ms > self.list_timeout_ms.max(self.data_timeout_ms) {
            return Err(ConfigError::Invalid(
                "backend.connect_timeout_ms must not exceed the request timeouts".to_string(),
            ));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_MAX_RESPONSE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "backend.max_response_bytes must be between 1 and {MAX_MAX_RESPONSE_BYTES}"
            )));
        }
        let agent = self.user_agent.trim();
        if agent.is_empty() || agent.len() > MAX_USER_AGENT_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "backend.user_agent must be 1..={MAX_USER_AGENT_LENGTH} characters"
            )));
        }
        if agent.chars().any(char::is_control) {
            return Err(ConfigError::Invalid(
                "backend.user_agent must not contain control characters".to_string(),
            ));
        }
        Ok(())
    }
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Environment variable holding the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
        }
    }
}

impl SessionConfig {
    /// Validates session configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let name = self.token_env.as_str();
        if name.is_empty() || name.len() > MAX_ENV_NAME_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "session.token_env must be 1..={MAX_ENV_NAME_LENGTH} characters"
            )));
        }
        let valid = name.chars().all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_')
            && !name.starts_with(|ch: char| ch.is_ascii_digit());
        if !valid {
            return Err(ConfigError::Invalid(
                "session.token_env must be an uppercase environment variable name".to_string(),
            ));
        }
        Ok(())
    }
}

/// Snapshot cache configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// `SQLite` database path.
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
    /// Snapshot lifetime in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    /// `SQLite` busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl CacheConfig {
    /// Returns the snapshot lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Returns the `SQLite` store configuration.
    #[must_use]
    pub fn store_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
        }
    }

    /// Validates cache configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("cache.path", &self.path.to_string_lossy())?;
        if self.ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "cache.ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "cache.busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Poll interval configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollingConfig {
    /// Lower bound for any poll interval in milliseconds.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    /// Per-kind interval overrides in milliseconds, keyed by kind label.
    #[serde(default)]
    pub intervals: BTreeMap<String, u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            intervals: BTreeMap::new(),
        }
    }
}

impl PollingConfig {
    /// Returns the effective poll interval for `kind`.
    #[must_use]
    pub fn interval_for(&self, kind: WidgetKind) -> Duration {
        self.intervals
            .get(kind.as_str())
            .map_or_else(|| kind.default_poll_interval(), |ms| Duration::from_millis(*ms))
    }

    /// Validates polling configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "polling.min_interval_ms must be greater than zero".to_string(),
            ));
        }
        for (label, interval_ms) in &self.intervals {
            if WidgetKind::parse(label).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "polling.intervals has unknown widget kind: {label}"
                )));
            }
            if *interval_ms < self.min_interval_ms {
                return Err(ConfigError::Invalid(format!(
                    "polling.intervals.{label} must be at least {} ms",
                    self.min_interval_ms
                )));
            }
        }
        Ok(())
    }
}

/// Operator log sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// Append-only JSON lines file.
    File,
    /// Discard operator logs.
    None,
}

/// Operator log configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Sink selection.
    #[serde(default)]
    pub sink: LogSinkKind,
    /// Log file path (file sink only).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LoggingConfig {
    /// Validates logging configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkKind::File, None) => {
                Err(ConfigError::Invalid("file logging requires logging.path".to_string()))
            }
            (LogSinkKind::File, Some(path)) => {
                validate_path_string("logging.path", &path.to_string_lossy())
            }
            (_, Some(_)) => Err(ConfigError::Invalid(
                "logging.path is only valid with the file sink".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }
}

/// Reveal engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RevealConfig {
    /// Number of items in a spin strip.
    #[serde(default = "default_strip_length")]
    pub strip_length: usize,
    /// Full strip passes before landing on the winner.
    #[serde(default = "default_spin_rounds")]
    pub spin_rounds: usize,
    /// Width of one strip item in pixels.
    #[serde(default = "default_item_width_px")]
    pub item_width_px: u32,
    /// Width of the visible viewport in pixels.
    #[serde(default = "default_container_width_px")]
    pub container_width_px: u32,
    /// Spin animation duration in milliseconds.
    #[serde(default = "default_animation_ms")]
    pub animation_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            strip_length: DEFAULT_STRIP_LENGTH,
            spin_rounds: DEFAULT_SPIN_ROUNDS,
            item_width_px: DEFAULT_ITEM_WIDTH_PX,
            container_width_px: DEFAULT_CONTAINER_WIDTH_PX,
            animation_ms: DEFAULT_ANIMATION_MS,
        }
    }
}

impl RevealConfig {
    /// Returns the spin animation duration.
    #[must_use]
    pub const fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    /// Validates reveal configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.strip_length == 0 {
            return Err(ConfigError::Invalid(
                "reveal.strip_length must be greater than zero".to_string(),
            ));
        }
        if self.spin_rounds == 0 {
            return Err(ConfigError::Invalid(
                "reveal.spin_rounds must be greater than zero".to_string(),
            ));
        }
        if self.item_width_px == 0 {
            return Err(ConfigError::Invalid(
                "reveal.item_width_px must be greater than zero".to_string(),
            ));
        }
        if self.container_width_px < self.item_width_px {
            return Err(ConfigError::Invalid(
                "reveal.container_width_px must fit at least one item".to_string(),
            ));
        }
        if self.animation_ms == 0 {
            return Err(ConfigError::Invalid(
                "reveal.animation_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} component too long")));
        }
    }
    Ok(())
}

/// Validates a request timeout against the allowed range.
fn validate_timeout(field: &str, value_ms: u64) -> Result<(), ConfigError> {
    if !(MIN_REQUEST_TIMEOUT_MS..=MAX_REQUEST_TIMEOUT_MS).contains(&value_ms) {
        return Err(ConfigError::Invalid(format!(
            "{field} must be between {MIN_REQUEST_TIMEOUT_MS} and {MAX_REQUEST_TIMEOUT_MS}"
        )));
    }
    Ok(())
}

/// Returns the default widget list timeout.
const fn default_list_timeout_ms() -> u64 {
    DEFAULT_LIST_TIMEOUT_MS
}

/// Returns the default per-kind data timeout.
const fn default_data_timeout_ms() -> u64 {
    DEFAULT_DATA_TIMEOUT_MS
}

/// Returns the default connect timeout.
const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// Returns the default response size limit.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Returns the default user agent.
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Returns the default token environment variable.
fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

/// Returns the default cache path.
fn default_cache_path() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_PATH)
}

/// Returns the default snapshot lifetime.
const fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

/// Returns the default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default minimum poll interval.
const fn default_min_interval_ms() -> u64 {
    DEFAULT_MIN_INTERVAL_MS
}

/// Returns the default strip length.
const fn default_strip_length() -> usize {
    DEFAULT_STRIP_LENGTH
}

/// Returns the default spin rounds.
const fn default_spin_rounds() -> usize {
    DEFAULT_SPIN_ROUNDS
}

/// Returns the default item width.
const fn default_item_width_px() -> u32 {
    DEFAULT_ITEM_WIDTH_PX
}

/// Returns the default container width.
const fn default_container_width_px() -> u32 {
    DEFAULT_CONTAINER_WIDTH_PX
}

/// Returns the default animation duration.
const fn default_animation_ms() -> u64 {
    DEFAULT_ANIMATION_MS
}

// ============================================================================
// SECTION: Tests
// ============================================================================
