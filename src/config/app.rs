//! Application configuration loaded from a TOML file.
//!
//! The file is optional: when it does not exist every setting takes its default.

use crate::config::seed::SeedCatalog;
use crate::core::DEFAULT_PERFORMANCE_WINDOW_DAYS;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Path used when `ERP_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level structure of config.toml
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Window in days used for staff and supplier performance metrics
    #[serde(default = "default_performance_window_days")]
    pub performance_window_days: u32,
    /// Initial catalog, seeded when the database holds no products
    #[serde(default)]
    pub seed: Option<SeedCatalog>,
}

const fn default_performance_window_days() -> u32 {
    DEFAULT_PERFORMANCE_WINDOW_DAYS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            performance_window_days: DEFAULT_PERFORMANCE_WINDOW_DAYS,
            seed: None,
        }
    }
}

impl AppConfig {
    fn validate(self) -> Result<Self> {
        if self.performance_window_days == 0 {
            return Err(Error::Config {
                message: "performance_window_days must be at least 1".to_string(),
            });
        }
        Ok(self)
    }
}

/// Loads the application configuration from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid or contains unknown keys
/// - `performance_window_days` is zero
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Loading configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()
}

/// Loads the configuration named by `ERP_CONFIG` (default `config.toml`).
///
/// A missing file yields [`AppConfig::default`]; an unreadable or invalid one is an error.
pub fn load_app_config() -> Result<AppConfig> {
    let path = std::env::var("ERP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        info!("No configuration file at {}, using defaults", path);
        return Ok(AppConfig::default());
    }
    load_config(&path)
}
