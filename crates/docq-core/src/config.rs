//! Configuration management for docq.
//!
//! Loads configuration from ${DOCQ_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Client configuration.
///
/// Every field has a default, so a missing file or an empty table is a
/// fully working configuration pointing at a local backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the backend, without the `/api` suffix.
    pub base_url: String,
    /// Upper bound on one request, in seconds.
    pub request_timeout_secs: u64,
    /// Whether chat requests ask the backend for retrieved context.
    pub use_rag: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 60,
            use_rag: true,
        }
    }
}

impl Config {
    /// Loads the config from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads the config from an explicit path, defaulting when absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// The request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub mod paths {
    //! Path resolution for docq configuration.
    //!
    //! DOCQ_HOME resolution order:
    //! 1. DOCQ_HOME environment variable (if set)
    //! 2. ~/.config/docq (default)

    use std::path::PathBuf;

    /// Returns the docq home directory.
    ///
    /// Checks DOCQ_HOME env var first, falls back to ~/.config/docq
    pub fn docq_home() -> PathBuf {
        if let Ok(home) = std::env::var("DOCQ_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("docq"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        docq_home().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.request_timeout_secs, 60);
        assert!(config.use_rag);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = \"http://backend:9000\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, "http://backend:9000");
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn test_full_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            base_url: "https://rag.example.com".to_string(),
            request_timeout_secs: 5,
            use_rag: false,
        };
        fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.base_url, config.base_url);
        assert_eq!(loaded.request_timeout_secs, 5);
        assert!(!loaded.use_rag);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = [not toml").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
