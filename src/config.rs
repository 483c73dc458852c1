//! Application configuration loaded from environment variables.
//!
//! Everything the core needs at startup is read once here; no ambient
//! environment access happens after construction.

use std::env;
use std::path::PathBuf;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Fabula backend API (no trailing slash)
    pub api_base_url: String,
    /// Directory holding the durable local store
    pub data_dir: PathBuf,
    /// Push notification handle for this device, if the platform
    /// integration provides one
    pub push_handle: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            api_base_url: env::var("FABULA_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("FABULA_API_URL"))?,
            data_dir: env::var("FABULA_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".fabula")),
            push_handle: env::var("FABULA_PUSH_HANDLE")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            data_dir: PathBuf::from(".fabula-test"),
            push_handle: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("FABULA_API_URL", "https://api.fabula.example/");
        env::set_var("FABULA_DATA_DIR", "/tmp/fabula-test");
        env::remove_var("FABULA_PUSH_HANDLE");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.api_base_url, "https://api.fabula.example");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/fabula-test"));
        assert!(config.push_handle.is_none());
    }
}
