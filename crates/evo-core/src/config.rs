//! Configuration file handling.
//!
//! Reads from `~/.config/evo-admin/evo-admin.toml`, then applies `EVO_*`
//! environment overrides (a `.env` file in the working directory is honored).

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Sync backend used when neither the file nor the environment set one.
pub const DEFAULT_SYNC_API_URL: &str = "http://localhost:5000/api";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the clientes backend.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Base URL of the sync backend.
    #[serde(default = "default_sync_api_url")]
    pub sync_api_url: String,
    /// Whether the sync client sends the session token.
    #[serde(default)]
    pub sync_api_auth: bool,
    /// Rows per table page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Pause between accounts during a batch sync.
    #[serde(default = "default_sync_batch_delay_ms")]
    pub sync_batch_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Prefix of the TinTim webhook link copied from the TinTim page.
    #[serde(default = "default_tintim_webhook_base")]
    pub tintim_webhook_base: String,
    /// Session token seeded at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_sync_api_url() -> String {
    DEFAULT_SYNC_API_URL.to_string()
}

fn default_page_size() -> usize {
    crate::table::DEFAULT_PAGE_SIZE
}

fn default_sync_batch_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_tintim_webhook_base() -> String {
    "http://localhost:1212/tintimWebhook".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            sync_api_url: default_sync_api_url(),
            sync_api_auth: false,
            page_size: default_page_size(),
            sync_batch_delay_ms: default_sync_batch_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            tintim_webhook_base: default_tintim_webhook_base(),
            auth_token: None,
        }
    }
}

/// Values given on the command line; they win over env and file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub sync_api_url: Option<String>,
    pub token: Option<String>,
}

impl Config {
    /// Load configuration.
    ///
    /// With no custom path the default file is used and created with defaults
    /// if it doesn't exist. A custom path must exist.
    pub fn load(custom_path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = match custom_path {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                Self::load_from(path)?
            }
            None => {
                let config_path = Self::config_path()?;
                if config_path.exists() {
                    Self::load_from(&config_path)?
                } else {
                    let config = Config::default();
                    config.save_to(&config_path)?;
                    tracing::info!("Created default config: {}", config_path.display());
                    config
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config.sanitized())
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Apply `EVO_API_URL`, `EVO_SYNC_API_URL` and `EVO_AUTH_TOKEN`.
    ///
    /// Takes a lookup function so tests don't touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_blank("EVO_API_URL") {
            self.api_url = url;
        }
        if let Some(url) = non_blank("EVO_SYNC_API_URL") {
            self.sync_api_url = url;
        }
        if let Some(token) = non_blank("EVO_AUTH_TOKEN") {
            self.auth_token = Some(token);
        }
    }

    /// Apply command-line values.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(url) = &overrides.api_url {
            self.api_url = url.clone();
        }
        if let Some(url) = &overrides.sync_api_url {
            self.sync_api_url = url.clone();
        }
        if let Some(token) = &overrides.token {
            self.auth_token = Some(token.clone());
        }
    }

    fn sanitized(mut self) -> Self {
        if self.page_size == 0 {
            self.page_size = default_page_size();
        }
        if self.sync_api_url.trim().is_empty() {
            self.sync_api_url = default_sync_api_url();
        }
        self
    }

    /// Get the path to the default config file.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("evo-admin").join("evo-admin.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn partial_file_gets_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("evo-admin.toml");
        std::fs::write(&path, "api_url = \"https://api.evo.test\"\npage_size = 0\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url, "https://api.evo.test");
        assert_eq!(config.sync_api_url, DEFAULT_SYNC_API_URL);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.sync_batch_delay_ms, 1000);
        assert!(!config.sync_api_auth);
    }

    #[test]
    fn missing_custom_path_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b.toml");
        let config = Config {
            auth_token: Some("tok".into()),
            sync_api_auth: true,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let env: HashMap<&str, &str> = [
            ("EVO_API_URL", "http://env-api"),
            ("EVO_SYNC_API_URL", ""),
            ("EVO_AUTH_TOKEN", "env-token"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.api_url, "http://env-api");
        assert_eq!(config.sync_api_url, DEFAULT_SYNC_API_URL);
        assert_eq!(config.auth_token.as_deref(), Some("env-token"));

        config.apply_overrides(&Overrides {
            api_url: Some("http://cli-api".into()),
            sync_api_url: None,
            token: None,
        });
        assert_eq!(config.api_url, "http://cli-api");
        assert_eq!(config.auth_token.as_deref(), Some("env-token"));
    }
}
