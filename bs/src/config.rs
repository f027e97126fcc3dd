//! Configuration for backstore

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::BackstoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackstoreConfig {
    /// Project URL of the hosted service
    pub url: String,

    /// Environment variable holding the anonymous API key
    #[serde(rename = "anon-key-env")]
    pub anon_key_env: String,

    /// Where the signed-in session is persisted
    #[serde(rename = "session-path")]
    pub session_path: PathBuf,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

fn default_session_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("backstore")
        .join("session.json")
}

impl Default for BackstoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key_env: "BACKSTORE_ANON_KEY".to_string(),
            session_path: default_session_path(),
            timeout_ms: 15_000,
        }
    }
}

impl BackstoreConfig {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: BackstoreConfig = serde_yaml::from_str(&content)?;
            return Ok(config.with_env_overrides(|k| std::env::var(k).ok()));
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("backstore").join("backstore.yml")),
            Some(PathBuf::from("backstore.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: BackstoreConfig = serde_yaml::from_str(&content)?;
                return Ok(config.with_env_overrides(|k| std::env::var(k).ok()));
            }
        }

        Ok(BackstoreConfig::default().with_env_overrides(|k| std::env::var(k).ok()))
    }

    /// Apply `BACKSTORE_URL` from the given lookup
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("BACKSTORE_URL").filter(|u| !u.trim().is_empty()) {
            tracing::debug!(%url, "BackstoreConfig: url overridden from environment");
            self.url = url;
        }
        self
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the anonymous API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, BackstoreError> {
        std::env::var(&self.anon_key_env).map_err(|_| BackstoreError::MissingApiKey(self.anon_key_env.clone()))
    }

    /// Project URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = BackstoreConfig::default();
        assert_eq!(config.anon_key_env, "BACKSTORE_ANON_KEY");
        assert_eq!(config.timeout_ms, 15_000);
        assert!(config.session_path.ends_with("session.json"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
url: https://project.example.co/
"#;
        let config: BackstoreConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.base_url(), "https://project.example.co");
        assert_eq!(config.anon_key_env, "BACKSTORE_ANON_KEY");
    }

    #[test]
    fn test_env_override() {
        let config = BackstoreConfig::default().with_env_overrides(|k| {
            (k == "BACKSTORE_URL").then(|| "https://override.example.co".to_string())
        });
        assert_eq!(config.url, "https://override.example.co");

        let config = BackstoreConfig::default().with_env_overrides(|_| Some("   ".to_string()));
        assert_eq!(config.url, "http://localhost:54321");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("backstore.yml");

        let config = BackstoreConfig {
            url: "https://saved.example.co".to_string(),
            anon_key_env: "MY_KEY".to_string(),
            session_path: temp.path().join("s.json"),
            timeout_ms: 5000,
        };
        config.save(&path).unwrap();

        let loaded = BackstoreConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.anon_key_env, "MY_KEY");
        assert_eq!(loaded.timeout_ms, 5000);
    }
}
