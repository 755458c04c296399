use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, Result};

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";
pub const DEFAULT_CATEGORY: &str = "business";
pub const DEFAULT_COUNTRY: &str = "us";

const API_KEY_ENV: &str = "NEWSAPI_KEY";
const APP_DIR: &str = "headline-desk";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub category: String,
    pub default_country: String,
    /// Unset means the HTTP client's own defaults apply.
    pub request_timeout_secs: Option<u64>,
    pub fetch_on_start: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            default_country: DEFAULT_COUNTRY.to_string(),
            request_timeout_secs: None,
            fetch_on_start: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Load `~/.config/headline-desk/config.toml`, then apply `NEWSAPI_KEY`.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        config.apply_env_key(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    /// A blank env value leaves the file's key in place.
    fn apply_env_key(&mut self, value: Option<String>) {
        if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("headline-desk.log"))
    }

    pub fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(AppError::Config(format!(
                "no API key; set api_key in {} or the {} environment variable",
                Self::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "config.toml".to_string()),
                API_KEY_ENV
            ))),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
