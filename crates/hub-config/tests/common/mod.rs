// crates/hub-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for hub-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use hub_config::ConfigError;
use hub_config::HubConfig;

/// Smallest valid configuration body.
pub const MINIMAL_TOML: &str = "[backend]\nbase_url = \"http://127.0.0.1:8080\"\n";

/// Parses a TOML string into a `HubConfig` without validation.
pub fn config_from_toml(toml_str: &str) -> Result<HubConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<HubConfig, toml::de::Error> {
    config_from_toml(MINIMAL_TOML)
}

/// Asserts that `result` failed with a message containing `needle`.
pub fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}
