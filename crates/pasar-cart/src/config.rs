//! # Cart Configuration
//!
//! Limits and stock-check settings for the session carts.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PASAR_ORACLE_TIMEOUT_MS=1500                                       │
//! │     PASAR_MAX_ITEMS=50                                                 │
//! │     PASAR_MAX_ITEM_QUANTITY=20                                         │
//! │     PASAR_REVALIDATE_ON_CHECKOUT=false                                 │
//! │     PASAR_DB_PATH=/var/lib/pasar/pasar.db                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pasar/pasar.toml (Linux)                                 │
//! │     ~/Library/Application Support/id.pasar.pasar/pasar.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     3000 ms timeout, 100 lines, 999 per line, re-validate on checkout  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pasar.toml
//! oracle_timeout_ms = 3000
//! max_items = 100
//! max_item_quantity = 999
//! revalidate_on_checkout = true
//! database_path = "/var/lib/pasar/pasar.db"
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use pasar_core::{CartLimits, DEFAULT_MAX_CART_ITEMS, DEFAULT_MAX_ITEM_QUANTITY};
use pasar_db::DbConfig;

use crate::error::{ConfigError, ConfigResult};

const CONFIG_FILE: &str = "pasar.toml";
const DATABASE_FILE: &str = "pasar.db";

// =============================================================================
// Cart Config
// =============================================================================

/// Settings shared by every session cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Upper bound on one stock oracle query (milliseconds).
    /// Default: 3000
    #[serde(default = "default_oracle_timeout_ms")]
    pub oracle_timeout_ms: u64,

    /// Maximum number of distinct products in one cart.
    /// Default: 100
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Maximum quantity of a single product.
    /// Default: 999
    #[serde(default = "default_max_item_quantity")]
    pub max_item_quantity: i64,

    /// Ask the oracle again for every line before checkout.
    /// Default: true
    #[serde(default = "default_true")]
    pub revalidate_on_checkout: bool,

    /// Catalogue database file. `None` means the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

fn default_oracle_timeout_ms() -> u64 {
    3000
}

fn default_max_items() -> usize {
    DEFAULT_MAX_CART_ITEMS
}

fn default_max_item_quantity() -> i64 {
    DEFAULT_MAX_ITEM_QUANTITY
}

fn default_true() -> bool {
    true
}

impl Default for CartConfig {
    fn default() -> Self {
        CartConfig {
            oracle_timeout_ms: default_oracle_timeout_ms(),
            max_items: default_max_items(),
            max_item_quantity: default_max_item_quantity(),
            revalidate_on_checkout: default_true(),
            database_path: None,
        }
    }
}

impl CartConfig {
    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads configuration: file (if present), then environment overrides.
    /// The merged result is validated once, after the overrides.
    ///
    /// `config_path` defaults to `pasar.toml` in the platform config
    /// directory. A missing file is not an error.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses and validates a TOML document. Missing keys take their
    /// defaults.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: CartConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.oracle_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "oracle_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.max_items == 0 {
            return Err(ConfigError::Invalid(
                "max_items must be greater than 0".to_string(),
            ));
        }

        if self.max_item_quantity <= 0 {
            return Err(ConfigError::Invalid(
                "max_item_quantity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Applies `PASAR_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`; unparseable values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("PASAR_ORACLE_TIMEOUT_MS") {
            match value.parse::<u64>() {
                Ok(ms) => {
                    debug!(ms, "Overriding oracle timeout from environment");
                    self.oracle_timeout_ms = ms;
                }
                Err(_) => warn!(value = %value, "Ignoring invalid PASAR_ORACLE_TIMEOUT_MS"),
            }
        }

        if let Some(value) = lookup("PASAR_MAX_ITEMS") {
            match value.parse() {
                Ok(max) => self.max_items = max,
                Err(_) => warn!(value = %value, "Ignoring invalid PASAR_MAX_ITEMS"),
            }
        }

        if let Some(value) = lookup("PASAR_MAX_ITEM_QUANTITY") {
            match value.parse() {
                Ok(max) => self.max_item_quantity = max,
                Err(_) => warn!(value = %value, "Ignoring invalid PASAR_MAX_ITEM_QUANTITY"),
            }
        }

        if let Some(value) = lookup("PASAR_REVALIDATE_ON_CHECKOUT") {
            match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.revalidate_on_checkout = true,
                "0" | "false" | "no" | "off" => self.revalidate_on_checkout = false,
                _ => warn!(value = %value, "Ignoring invalid PASAR_REVALIDATE_ON_CHECKOUT"),
            }
        }

        if let Some(path) = lookup("PASAR_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = Some(PathBuf::from(path));
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("id", "pasar", "pasar")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Cart size limits.
    pub fn limits(&self) -> CartLimits {
        CartLimits {
            max_items: self.max_items,
            max_item_quantity: self.max_item_quantity,
        }
    }

    /// Oracle timeout as a Duration.
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }

    /// Resolved database file: configured path, else `pasar.db` in the
    /// platform data directory, else in the working directory.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join(DATABASE_FILE)))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
    }

    /// Pool configuration for the catalogue database.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path())
    }
}
