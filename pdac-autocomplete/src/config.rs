//! Runtime settings for the autocomplete controller
//!
//! The API root is resolved with priority CLI → ENV → TOML → compiled default.

use pdac_common::config::TomlConfig;
use std::time::Duration;
use tracing::{info, warn};

/// Public PDOK locatieserver v3.1
pub const DEFAULT_API_ROOT: &str = "https://api.pdok.nl/bzk/locatieserver/search/v3_1";

/// Environment variable overriding the API root
pub const API_ROOT_ENV_VAR: &str = "PDAC_API_ROOT";

/// User-facing messages passed to the presenter
#[derive(Debug, Clone, PartialEq)]
pub struct Messages {
    /// Verification lookup did not reproduce the picked address
    pub mismatch: String,
    /// Input left without confirming an address
    pub select_from_list: String,
    /// Lookup failed at the transport boundary
    pub lookup_failed: String,
    /// Reverse geocoding found no address
    pub no_address_found: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            mismatch: "This address does not exist or is shared by multiple entries".to_string(),
            select_from_list: "Select an address from the list".to_string(),
            lookup_failed: "Address lookup is currently unavailable".to_string(),
            no_address_found: "No address found at this location".to_string(),
        }
    }
}

/// Resolved controller settings
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSettings {
    pub api_root: String,
    pub debounce: Duration,
    pub suggest_rows: u32,
    pub type_filter: String,
    pub timeout: Duration,
    pub backfill_postal: bool,
    pub messages: Messages,
}

impl WidgetSettings {
    /// Build settings from a bootstrap config plus the resolved API root
    pub fn from_toml(toml_config: &TomlConfig, cli_api_root: Option<&str>) -> Self {
        Self::with_api_root(toml_config, resolve_api_root(cli_api_root, toml_config))
    }

    fn with_api_root(toml_config: &TomlConfig, api_root: String) -> Self {
        let lookup = &toml_config.lookup;
        Self {
            api_root,
            debounce: Duration::from_millis(lookup.debounce_ms),
            suggest_rows: lookup.suggest_rows,
            type_filter: lookup.type_filter.clone(),
            timeout: Duration::from_secs(lookup.timeout_secs),
            backfill_postal: lookup.backfill_postal,
            messages: Messages::default(),
        }
    }
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self::with_api_root(&TomlConfig::default(), DEFAULT_API_ROOT.to_string())
    }
}

/// Resolve the locatieserver API root
///
/// **Priority:** CLI → ENV → TOML → compiled default
pub fn resolve_api_root(cli_api_root: Option<&str>, toml_config: &TomlConfig) -> String {
    let env_root = std::env::var(API_ROOT_ENV_VAR).ok().filter(|v| is_valid_root(v));
    let toml_root = toml_config.api_root.as_deref().filter(|v| is_valid_root(v));
    let cli_root = cli_api_root.filter(|v| is_valid_root(v));

    let sources: Vec<&str> = [
        cli_root.map(|_| "command line"),
        env_root.as_ref().map(|_| "environment"),
        toml_root.map(|_| "TOML"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if sources.len() > 1 {
        warn!(
            "API root found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    if let Some(root) = cli_root {
        info!("API root from command line: {}", root);
        return root.to_string();
    }
    if let Some(root) = env_root {
        info!("API root from {}: {}", API_ROOT_ENV_VAR, root);
        return root;
    }
    if let Some(root) = toml_root {
        info!("API root from TOML config: {}", root);
        return root.to_string();
    }
    DEFAULT_API_ROOT.to_string()
}

/// Non-empty, non-whitespace
fn is_valid_root(root: &str) -> bool {
    !root.trim().is_empty()
}
