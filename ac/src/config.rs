//! Analyzer configuration types and loading

use backstore::BackstoreConfig;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::notify::DEFAULT_DISPLAY_DURATION;

/// Overrides `api.base-url`
pub const API_URL_ENV: &str = "ANALYZER_API_URL";

/// Main analyzer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Analysis server
    pub api: ApiConfig,

    /// Notification display
    pub notifications: NotificationsConfig,

    /// Hosted auth + property store
    pub backstore: BackstoreConfig,

    /// Request activity trail
    pub activity: ActivityConfig,

    /// History listing
    pub history: HistoryConfig,

    /// Log level used when none is given on the command line
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(eyre::eyre!("api.base-url must not be empty"));
        }
        if self.api.timeout_ms == 0 {
            return Err(eyre::eyre!("api.timeout-ms must be greater than zero"));
        }
        if self.backstore.url.trim().is_empty() {
            return Err(eyre::eyre!("backstore.url must not be empty"));
        }
        if self.history.page_size == 0 {
            return Err(eyre::eyre!("history.page-size must be greater than zero"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        Ok(Self::load_file(config_path)?.with_env_overrides(|k| std::env::var(k).ok()))
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: ./analyzer.yml
        let local_config = PathBuf::from("analyzer.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/analyzer/analyzer.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("analyzer").join("analyzer.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply `ANALYZER_API_URL` and `BACKSTORE_URL` from the given lookup
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            tracing::debug!(%url, "Config: api.base-url overridden from environment");
            self.api.base_url = url;
        }
        self.backstore = self.backstore.with_env_overrides(lookup);
        self
    }
}

/// Analysis server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every request path is joined to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// How long a notification stays visible, in milliseconds
    #[serde(rename = "display-ms")]
    pub display_ms: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            display_ms: DEFAULT_DISPLAY_DURATION.as_millis() as u64,
        }
    }
}

impl NotificationsConfig {
    pub fn display(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Record request events to disk
    pub enabled: bool,

    /// Directory holding activity.jsonl
    pub dir: PathBuf,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("analyzer"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Entries per page
    #[serde(rename = "page-size")]
    pub page_size: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { page_size: 5 }
    }
}
