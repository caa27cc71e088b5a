//! Application configuration.
//!
//! Values are layered: built-in defaults, then the optional JSON file under
//! the user's config directory, then `GAMEVAULT_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default catalog endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.rawg.io/api";
/// Quiet period before a typed search is committed.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
/// Per-request timeout against the catalog.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const CONFIG_DIR: &str = "gamevault";
const CONFIG_FILE: &str = "config.json";
const ENV_PREFIX: &str = "GAMEVAULT";
const API_KEY_VAR: &str = "GAMEVAULT_API_KEY";
const API_KEY_FALLBACK_VAR: &str = "RAWG_API_KEY";

/// Runtime settings for the catalog client and search behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Catalog API root, without trailing slash.
    pub base_url: String,
    /// Catalog API key.
    #[serde(default)]
    pub api_key: String,
    /// Search debounce window in milliseconds.
    pub debounce_ms: u64,
    /// HTTP timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location and environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration layered over the file at `path`, which may be absent.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_layered(path.as_ref(), None)
    }

    // `vars` replaces the process environment when set.
    fn load_layered(path: &Path, vars: Option<Map<String, String>>) -> Result<Self> {
        let defaults = AppConfig::default();
        let settings = Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("api_key", defaults.api_key)?
            .set_default("debounce_ms", defaults.debounce_ms)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .add_source(
                File::from(path)
                    .format(FileFormat::Json)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(vars.clone()),
            )
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .context("invalid configuration values")?;

        // Numeric parsing of the env layer would strip leading zeros from the key.
        let env_var = |name: &str| match &vars {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        if let Some(key) = env_var(API_KEY_VAR) {
            config.api_key = key;
        }
        if config.api_key.trim().is_empty() {
            if let Some(key) = env_var(API_KEY_FALLBACK_VAR) {
                config.api_key = key;
            }
        }
        if config.api_key.trim().is_empty() {
            warn!("no catalog API key configured; requests will likely be rejected");
        }

        Ok(config)
    }

    /// Debounce window as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Location of the configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write a default configuration file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(config_path())
}

fn write_default_config(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }

    let serialized = serde_json::to_string_pretty(&AppConfig::default())
        .context("failed to serialize default configuration")?;
    fs::write(path, serialized)
        .with_context(|| format!("failed to write configuration {}", path.display()))?;
    info!(path = %path.display(), "wrote default configuration");
    Ok(())
}
