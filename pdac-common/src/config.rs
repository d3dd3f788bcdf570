//! Bootstrap configuration loading
//!
//! TOML file resolution follows this priority order:
//! 1. Explicit path (command-line `--config`)
//! 2. `PDAC_CONFIG` environment variable
//! 3. Platform config directory (`~/.config/pdac/config.toml` on Linux)
//!
//! A missing file is not an error: callers get a warning and compiled defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "PDAC_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TomlConfig {
    /// Locatieserver API root (optional, see resolution order in the service crate)
    #[serde(default)]
    pub api_root: Option<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Lookup behaviour
    #[serde(default)]
    pub lookup: LookupConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Request lifecycle and verification settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LookupConfig {
    /// Quiet period before a suggest request is sent
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum number of suggestions requested
    #[serde(default = "default_suggest_rows")]
    pub suggest_rows: u32,

    /// Solr filter query restricting suggestion types
    #[serde(default = "default_type_filter")]
    pub type_filter: String,

    /// HTTP timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Fill a missing postal code from sibling records during verification
    #[serde(default)]
    pub backfill_postal: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            suggest_rows: default_suggest_rows(),
            type_filter: default_type_filter(),
            timeout_secs: default_timeout_secs(),
            backfill_postal: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_suggest_rows() -> u32 {
    10
}

fn default_type_filter() -> String {
    "type:(woonplaats OR weg OR postcode OR adres)".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))
}

/// Serialize a config to TOML and write it to `path`
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Platform default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdac").join("config.toml"))
}

/// Locate and load the bootstrap config, falling back to defaults
///
/// An explicitly named file (argument or environment) that fails to load is
/// an error; a missing default file is not.
pub fn resolve_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        info!("Loading config from {}", path.display());
        return load_toml_config(path);
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        info!("Loading config from {} ({})", path, CONFIG_ENV_VAR);
        return load_toml_config(Path::new(&path));
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            info!("Loading config from {}", path.display());
            load_toml_config(&path)
        }
        Some(path) => {
            warn!(
                "Config file not found at {}, using compiled defaults",
                path.display()
            );
            Ok(TomlConfig::default())
        }
        None => {
            warn!("Could not determine config directory, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}
