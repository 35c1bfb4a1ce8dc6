//! Configuration module for the RSS generator.

use serde::Deserialize;
use std::path::Path;

use crate::{GelrssError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Externally visible host name used in feed self links.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_base_url() -> String {
    "localhost".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: default_base_url(),
        }
    }
}

impl ServerConfig {
    /// Public URL prefix under which the feeds are reachable.
    pub fn public_url(&self) -> String {
        format!("http://{}:{}", self.base_url, self.port)
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GelbooruConfig {
    /// Search endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// API key (only sent together with `user_id`).
    #[serde(default)]
    pub api_key: String,
    /// User id (only sent together with `api_key`).
    #[serde(default)]
    pub user_id: String,
    /// Total request timeout. Unset leaves the transport default in place.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_api_url() -> String {
    "https://gelbooru.com/index.php".to_string()
}

impl Default for GelbooruConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            user_id: String::new(),
            request_timeout_secs: None,
        }
    }
}

impl GelbooruConfig {
    /// Whether an API key is set. Whitespace-only values count as unset.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Whether a user id is set. Whitespace-only values count as unset.
    pub fn has_user_id(&self) -> bool {
        !self.user_id.trim().is_empty()
    }
}

/// Feed configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedsConfig {
    /// Directory holding one JSON file per feed.
    #[serde(default = "default_config_dir")]
    pub config_dir: String,
    /// Cache lifetime and sweep period in minutes.
    #[serde(default = "default_update_interval")]
    pub update_interval_minutes: u64,
    /// Write example feed files when the directory holds no usable feed.
    #[serde(default = "default_create_examples")]
    pub create_examples: bool,
}

fn default_config_dir() -> String {
    "configs".to_string()
}

fn default_update_interval() -> u64 {
    10
}

fn default_create_examples() -> bool {
    true
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            update_interval_minutes: default_update_interval(),
            create_examples: default_create_examples(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file; console only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream API configuration.
    #[serde(default)]
    pub gelbooru: GelbooruConfig,
    /// Feed configuration.
    #[serde(default)]
    pub feeds: FeedsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(GelrssError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| GelrssError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `GELBOORU_API_KEY`, `GELBOORU_USER_ID`: upstream credentials
    /// - `UPDATE_INTERVAL_MINUTES`: cache lifetime
    /// - `BASE_URL`: externally visible host
    /// - `PORT`: listening port
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("GELBOORU_API_KEY") {
            self.gelbooru.api_key = key;
        }
        if let Some(user_id) = var("GELBOORU_USER_ID") {
            self.gelbooru.user_id = user_id;
        }
        if let Some(base_url) = var("BASE_URL") {
            self.server.base_url = base_url;
        }
        if let Some(raw) = var("UPDATE_INTERVAL_MINUTES") {
            match raw.trim().parse::<u64>() {
                Ok(minutes) if minutes > 0 => self.feeds.update_interval_minutes = minutes,
                _ => tracing::warn!(
                    "Ignoring UPDATE_INTERVAL_MINUTES={raw:?}, keeping {} minutes",
                    self.feeds.update_interval_minutes
                ),
            }
        }
        if let Some(raw) = var("PORT") {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring PORT={raw:?}, keeping {}", self.server.port),
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The update interval is zero
    /// - The upstream API URL is not an http(s) URL
    pub fn validate(&self) -> Result<()> {
        if self.feeds.update_interval_minutes == 0 {
            return Err(GelrssError::Config(
                "update_interval_minutes must be at least 1".to_string(),
            ));
        }

        let api_url = url::Url::parse(&self.gelbooru.api_url)
            .map_err(|e| GelrssError::Config(format!("invalid gelbooru.api_url: {e}")))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(GelrssError::Config(format!(
                "unsupported gelbooru.api_url scheme: {}",
                api_url.scheme()
            )));
        }

        Ok(())
    }
}
