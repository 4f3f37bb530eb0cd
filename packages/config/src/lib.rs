#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Layered configuration for the panic-report toolchain.
//!
//! Values are resolved in three layers, later layers winning:
//!
//! 1. Built-in defaults embedded at compile time from `default.toml`.
//! 2. An optional TOML override file (`--config` or `PANIC_REPORT_CONFIG`).
//!    Tables are merged key by key, so an override file only needs the
//!    keys it changes.
//! 3. Environment variables:
//!    - `PANIC_REPORT_API_URL`: remote content API base URL
//!    - `PANIC_REPORT_STORE_MODE`: `local` or `remote`
//!    - `PANIC_REPORT_DATA_DIR`: directory holding `reports.json`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use panic_report_models::{ReportType, Urgency};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an override config file.
pub const CONFIG_PATH_ENV: &str = "PANIC_REPORT_CONFIG";
/// Environment variable overriding [`ApiConfig::base_url`].
pub const API_URL_ENV: &str = "PANIC_REPORT_API_URL";
/// Environment variable overriding [`StoreConfig::mode`].
pub const STORE_MODE_ENV: &str = "PANIC_REPORT_STORE_MODE";
/// Environment variable overriding [`CacheConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "PANIC_REPORT_DATA_DIR";

const DEFAULT_TOML: &str = include_str!("../default.toml");

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The override file could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A layer was not valid TOML or did not match the schema.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is not usable.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// Description of the problem.
        message: String,
    },
}

/// Fully resolved configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Remote content API.
    pub api: ApiConfig,
    /// Report store backend selection.
    pub store: StoreConfig,
    /// Local report cache.
    pub cache: CacheConfig,
    /// Simulated device capabilities.
    pub device: DeviceConfig,
    /// Panic action behaviour.
    pub panic: PanicConfig,
}

/// Remote content API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL, without trailing slash (e.g. `"http://10.12.130.72:1337"`).
    pub base_url: String,
    /// Path of the reports collection endpoint.
    pub reports_path: String,
    /// Extra headers attached to every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Request timeout in seconds. `None` keeps the HTTP client default.
    pub timeout_secs: Option<u64>,
}

impl ApiConfig {
    /// Absolute URL of the reports endpoint.
    #[must_use]
    pub fn reports_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.reports_path)
    }

    /// Request timeout, if configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Which backend makes reports durable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    /// Persist entirely on-device as a JSON snapshot.
    Local,
    /// Post each report to the remote content API.
    Remote,
}

impl std::str::FromStr for StoreMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(ConfigError::Invalid {
                message: format!("unknown store mode {other:?}: expected 'local' or 'remote'"),
            }),
        }
    }
}

/// Report store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Backend selection.
    pub mode: StoreMode,
}

/// Local report cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Directory the user is asked to grant for report storage.
    pub data_dir: PathBuf,
    /// Snapshot file name inside the granted directory.
    pub file_name: String,
    /// Persisted settings file name (holds the directory grant).
    pub settings_file_name: String,
}

impl CacheConfig {
    /// Path of the persisted settings file.
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(&self.settings_file_name)
    }
}

/// Coordinates reported by the fixed (simulated) location source.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FixedLocationConfig {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

/// Simulated device capability settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Where finished recordings are written.
    pub capture_dir: PathBuf,
    /// Fixed position; `None` means no location hardware is available.
    pub location: Option<FixedLocationConfig>,
    /// Audio file replayed as the "recording"; `None` means no microphone.
    pub audio_source: Option<PathBuf>,
}

/// Panic action settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PanicConfig {
    /// Length of the audio recording window.
    pub record_window_secs: u64,
    /// Report type used for panic reports.
    pub report_type: ReportType,
    /// Description used for panic reports.
    pub description: String,
    /// Description used when the recording could not be finalized.
    pub audio_error_description: String,
    /// Urgency used for panic reports.
    pub urgency: Urgency,
    /// How long an armed unlock sequence stays open.
    pub unlock_timeout_ms: u64,
}

impl PanicConfig {
    /// Recording window as a [`Duration`].
    #[must_use]
    pub const fn record_window(&self) -> Duration {
        Duration::from_secs(self.record_window_secs)
    }

    /// Unlock sequence window as a [`Duration`].
    #[must_use]
    pub const fn unlock_timeout(&self) -> Duration {
        Duration::from_millis(self.unlock_timeout_ms)
    }
}

impl Config {
    /// Loads the built-in defaults only.
    ///
    /// # Panics
    ///
    /// Panics if the embedded defaults are malformed (a compile-time
    /// guarantee since they ship with the crate).
    #[must_use]
    pub fn defaults() -> Self {
        Self::from_layers(&[])
            .unwrap_or_else(|e| panic!("Failed to parse embedded default config: {e}"))
    }

    /// Loads the defaults, an optional override file, and environment
    /// overrides from the process environment.
    ///
    /// If `path` is `None`, `PANIC_REPORT_CONFIG` is consulted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the override file cannot be read or any
    /// layer fails to parse or validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        let path = path.map(Path::to_path_buf).or(env_path);

        let override_toml = match &path {
            Some(path) => {
                log::debug!("Loading config overrides from {}", path.display());
                Some(
                    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                        path: path.clone(),
                        source,
                    })?,
                )
            }
            None => None,
        };

        let layers: Vec<&str> = override_toml.iter().map(String::as_str).collect();
        let mut config = Self::from_layers(&layers)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses the embedded defaults with each TOML layer merged on top.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if a layer is not valid TOML or the
    /// merged result does not match the schema.
    pub fn from_layers(layers: &[&str]) -> Result<Self, ConfigError> {
        let mut merged: toml::Table = toml::from_str(DEFAULT_TOML)?;
        for layer in layers {
            let table: toml::Table = toml::from_str(layer)?;
            merge_tables(&mut merged, table);
        }
        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// Applies environment overrides using `lookup` to read variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override has an unusable value.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(API_URL_ENV) {
            log::debug!("{API_URL_ENV} overrides api.base_url");
            self.api.base_url = url;
        }
        if let Some(mode) = lookup(STORE_MODE_ENV) {
            self.store.mode = mode.parse()?;
        }
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            self.cache.data_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Checks values that parse but cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "api.base_url must not be empty".to_string(),
            });
        }
        if !self.api.reports_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                message: format!(
                    "api.reports_path must start with '/': {:?}",
                    self.api.reports_path
                ),
            });
        }
        if self.cache.file_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "cache.file_name must not be empty".to_string(),
            });
        }
        if self.panic.record_window_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "panic.record_window_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Recursively merges `overlay` into `base`; non-table values replace.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
