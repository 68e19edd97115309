//! # Configuration State
//!
//! Application configuration loaded once at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command line (highest priority)                                    │
//! │     --db ./scratch.db                                                  │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     COINSHELF_DB_PATH=/tmp/coinshelf.db                                │
//! │     COINSHELF_STORAGE_KEY=crypto-data                                  │
//! │     COINSHELF_SEARCH_DEBOUNCE_MS=300                                   │
//! │     COINSHELF_REPORT_PERSIST_FAILURES=true                             │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     ~/.config/coinshelf/coinshelf.toml (Linux)                         │
//! │     ~/Library/Application Support/com.coinshelf.coinshelf/ (macOS)     │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! database_path = "/var/lib/coinshelf/coinshelf.db"
//! storage_key = "crypto-data"
//! max_connections = 5
//!
//! [search]
//! debounce_ms = 300
//!
//! [persistence]
//! report_failures = true
//! ```
//!
//! Configuration is read-only after startup, so no lock is needed.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use coinshelf_core::{DEBOUNCE_SEARCH_MS, DEFAULT_STORAGE_KEY};
use coinshelf_db::DbConfig;

use crate::error::{ConfigError, ConfigResult};
use crate::state::currency::StoreOptions;

/// Upper bound for the search debounce window.
pub const MAX_DEBOUNCE_MS: u64 = 5_000;

const CONFIG_FILE_NAME: &str = "coinshelf.toml";
const DATABASE_FILE_NAME: &str = "coinshelf.db";

// =============================================================================
// Sections
// =============================================================================

/// Where and how the collection is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Key the collection is persisted under.
    pub storage_key: String,

    /// SQLite pool size.
    pub max_connections: u32,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            database_path: None,
            storage_key: default_storage_key(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Quiet period before a typed query is applied.
    pub debounce_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            debounce_ms: DEBOUNCE_SEARCH_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    /// Surface failed background writes in the list's error view.
    pub report_failures: bool,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        PersistenceSettings {
            report_failures: true,
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageSettings,
    pub search: SearchSettings,
    pub persistence: PersistenceSettings,
}

impl AppConfig {
    /// Loads configuration from all sources.
    ///
    /// ## Arguments
    /// * `path` - Explicit config file. When `None`, the platform default is
    ///   used if it exists.
    ///
    /// ## Returns
    /// Validated configuration with environment overrides applied.
    ///
    /// An explicit `path` that does not exist is an error; a missing default
    /// file just means defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    AppConfig::default()
                }
            },
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(path = %path.display(), "Loading config file");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses TOML. Missing sections and keys take their defaults.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Platform config file location, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "coinshelf", "coinshelf")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Applies `COINSHELF_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from any variable source.
    ///
    /// Values that fail to parse are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("COINSHELF_DB_PATH") {
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(key) = lookup("COINSHELF_STORAGE_KEY") {
            self.storage.storage_key = key;
        }

        if let Some(raw) = lookup("COINSHELF_SEARCH_DEBOUNCE_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.search.debounce_ms = ms,
                Err(_) => warn!(value = %raw, "Ignoring invalid COINSHELF_SEARCH_DEBOUNCE_MS"),
            }
        }

        if let Some(raw) = lookup("COINSHELF_REPORT_PERSIST_FAILURES") {
            match parse_bool(&raw) {
                Some(report) => self.persistence.report_failures = report,
                None => warn!(value = %raw, "Ignoring invalid COINSHELF_REPORT_PERSIST_FAILURES"),
            }
        }
    }

    /// Checks value ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.storage.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.storage_key must not be empty".to_string(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "storage.max_connections must be at least 1".to_string(),
            ));
        }

        if self.search.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Invalid(format!(
                "search.debounce_ms must be at most {} (got {})",
                MAX_DEBOUNCE_MS, self.search.debounce_ms
            )));
        }

        Ok(())
    }

    /// Resolves the SQLite file path.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.coinshelf.coinshelf/coinshelf.db`
    /// - **Windows**: `%APPDATA%\coinshelf\coinshelf\data\coinshelf.db`
    /// - **Linux**: `~/.local/share/coinshelf/coinshelf.db`
    ///
    /// The data directory is created if missing.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.storage.database_path {
            return Ok(path.clone());
        }

        let dirs =
            ProjectDirs::from("com", "coinshelf", "coinshelf").ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join(DATABASE_FILE_NAME))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::default()
            .storage_key(self.storage.storage_key.clone())
            .report_persist_failures(self.persistence.report_failures)
    }

    /// Builds the database configuration for the resolved path.
    pub fn db_config(&self) -> ConfigResult<DbConfig> {
        Ok(DbConfig::new(self.database_path()?).max_connections(self.storage.max_connections))
    }

    /// Renders the effective configuration as TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
