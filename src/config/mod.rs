use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Backend origin; the `/api/v1/` prefix is appended per request
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Transport timeout for a single request in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("HangOutAdmin/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// File holding the persisted access token and role
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

fn default_session_path() -> PathBuf {
    PathBuf::from("./data/session.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingConfig {
    /// Nominatim-compatible search service
    #[serde(default = "default_search_url")]
    pub search_url: String,
    /// Comma separated ISO country codes the search is restricted to
    #[serde(default = "default_country_codes")]
    pub country_codes: String,
    /// Quiet period before a typed query is sent (default: 500ms)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Shorter queries return no suggestions without hitting the service
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    /// Transport timeout for one lookup in seconds (default: 10)
    #[serde(default = "default_geocoding_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            country_codes: default_country_codes(),
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
            timeout_secs: default_geocoding_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl GeocodingConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_search_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_country_codes() -> String {
    "vn".to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_min_query_len() -> usize {
    3
}

fn default_geocoding_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse configuration file")
    }

    pub fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            geocoding: GeocodingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.session.path, PathBuf::from("./data/session.json"));
        assert_eq!(config.geocoding.min_query_len, 3);
        assert_eq!(config.geocoding.timeout_secs, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [api]
            base_url = "https://api.hangout.vn"

            [geocoding]
            debounce_ms = 250
            timeout_secs = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.hangout.vn");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.geocoding.debounce(), Duration::from_millis(250));
        assert_eq!(config.geocoding.country_codes, "vn");
        assert_eq!(config.geocoding.timeout(), Duration::from_secs(4));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("/nonexistent/hangout.toml")).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000");
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(Config::from_toml("[api\nbase_url = 1").is_err());
    }
}
