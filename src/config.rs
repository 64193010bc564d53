use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::client::{DEFAULT_FACT_URL, DEFAULT_IMAGE_URL};

const APP_NAME: &str = "cat-facts";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Endpoint answering with `{"fact": "..."}`.
    pub fact_url: String,
    /// Endpoint answering with raw image bytes. A nonce is appended per request.
    pub image_url: String,
    /// Per-request timeout. Unset leaves the transport default in place.
    pub request_timeout_secs: Option<u64>,
    /// Tally database. Unset uses the platform data directory.
    pub database_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fact_url: DEFAULT_FACT_URL.to_string(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
            request_timeout_secs: None,
            database_path: None,
        }
    }
}

impl AppConfig {
    /// Load from the user's config directory, then apply `CAT_FACTS_*`
    /// environment overrides. Falls back to defaults if the file is missing
    /// or fails to parse.
    pub fn load() -> Self {
        let config = match get_config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = var("CAT_FACTS_FACT_URL") {
            self.fact_url = url;
        }
        if let Some(url) = var("CAT_FACTS_IMAGE_URL") {
            self.image_url = url;
        }
        if let Some(secs) = var("CAT_FACTS_TIMEOUT_SECS") {
            match secs.trim().parse() {
                Ok(secs) => self.request_timeout_secs = Some(secs),
                Err(_) => tracing::warn!("Ignoring invalid CAT_FACTS_TIMEOUT_SECS={:?}", secs),
            }
        }
        if let Some(path) = var("CAT_FACTS_DB") {
            self.database_path = Some(PathBuf::from(path));
        }
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Pretty JSON in the same shape the config file is read in.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Save the current configuration to the user's config directory.
    /// Returns the path written.
    pub fn save(&self) -> Result<PathBuf> {
        let path = get_config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        fs::write(path, self.to_json()?).context("Failed to write config file")?;

        Ok(())
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.fact_url, "https://catfact.ninja/fact");
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = AppConfig {
            fact_url: "http://localhost:9000/fact".to_string(),
            request_timeout_secs: Some(5),
            ..AppConfig::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn json_lists_every_field() {
        let config = AppConfig {
            database_path: Some(PathBuf::from("/tmp/tally.db")),
            ..AppConfig::default()
        };
        let value: serde_json::Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();

        assert_eq!(value["fact_url"], DEFAULT_FACT_URL);
        assert_eq!(value["image_url"], DEFAULT_IMAGE_URL);
        assert!(value["request_timeout_secs"].is_null());
        assert_eq!(value["database_path"], "/tmp/tally.db");
        assert_eq!(serde_json::from_value::<AppConfig>(value).unwrap(), config);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{"image_url":"http://localhost/cat"}"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.image_url, "http://localhost/cat");
        assert_eq!(config.fact_url, DEFAULT_FACT_URL);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "not json").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CAT_FACTS_FACT_URL", "http://facts.test/fact"),
            ("CAT_FACTS_TIMEOUT_SECS", "7"),
            ("CAT_FACTS_DB", "/tmp/tally.db"),
        ]);
        let config = AppConfig::default().with_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.fact_url, "http://facts.test/fact");
        assert_eq!(config.image_url, DEFAULT_IMAGE_URL);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(7)));
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/tally.db")));
    }

    #[test]
    fn invalid_timeout_is_ignored() {
        let config = AppConfig::default().with_env(|k| {
            (k == "CAT_FACTS_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(config.request_timeout_secs.is_none());
    }
}
