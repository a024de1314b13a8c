//! TOML-based configuration for semadiff.
//!
//! The language table itself is static ([`crate::language`]); the config
//! only carries deployment-specific knobs: where the parsing services run
//! and how long to wait for them.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level application configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Parsing-service connection settings.
    #[serde(default)]
    pub service: ServiceConfig,
}

// ---------------------------------------------------------------------------
// Parsing services
// ---------------------------------------------------------------------------

/// Connection settings for the per-language parsing services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Host all parsing services are reachable on (ports come from the
    /// static language table).
    #[serde(default = "default_host")]
    pub host: String,

    /// Per-request timeout in milliseconds. Extraction degrades to an empty
    /// structure map when this elapses.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_timeout_ms() -> u64 {
    1000
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&raw).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}
