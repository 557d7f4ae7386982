use std::time::Duration;

use serde::{Deserialize, Serialize};
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::paths::Paths;
use crate::catalog::HttpPolicy;
use crate::error::{Result, SyncError};

/// Used when neither config nor environment names a Catalog Service
pub const DEFAULT_BASE_URL: &str = "https://catalogue-service.fly.dev";

/// Environment override for the Catalog Service base URL
const BASE_URL_ENV: &str = "CATALOG_SERVICE_URL";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalog Service configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// HTTP timeout and retry settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Persisted catalog cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Catalog Service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Catalog Service
    pub base_url: Option<String>,
    /// Bearer token, when the service requires one
    pub token: Option<String>,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Age after which a cached catalog is stale
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_ttl_secs() -> u64 {
    3600
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl HttpConfig {
    pub fn policy(&self) -> HttpPolicy {
        HttpPolicy {
            timeout: Duration::from_secs(self.timeout_secs),
            retries: self.retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> chrono::Duration {
        // chrono panics past ~292 billion years; a century is plenty
        const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 3600;
        chrono::Duration::seconds(self.ttl_secs.min(MAX_TTL_SECS) as i64)
    }
}

impl Config {
    /// Load configuration from a specific paths instance
    pub fn load_from(paths: &Paths) -> Result<Self> {
        if !paths.config_exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&paths.config_file)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific paths instance
    pub fn save_to(&self, paths: &Paths) -> Result<()> {
        paths.ensure_dirs()?;
        let contents = toml::to_string_pretty(self)?;
        fs::write(&paths.config_file, &contents)?;

        // May contain an API token
        #[cfg(unix)]
        {
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&paths.config_file, perms)?;
        }

        Ok(())
    }

    /// Resolve the base URL: environment, then config file, then default
    pub fn base_url(&self) -> String {
        std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Set a value by dotted key, e.g. `http.retries`
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.base_url" => {
                url::Url::parse(value).map_err(|e| {
                    SyncError::InvalidArgument(format!("Invalid URL '{value}': {e}"))
                })?;
                self.api.base_url = Some(value.to_string());
            }
            "api.token" => self.api.token = Some(value.to_string()),
            "http.timeout_secs" => self.http.timeout_secs = parse_number(key, value)?,
            "http.retries" => self.http.retries = parse_number(key, value)?,
            "http.retry_delay_ms" => self.http.retry_delay_ms = parse_number(key, value)?,
            "cache.ttl_secs" => self.cache.ttl_secs = parse_number(key, value)?,
            _ => {
                return Err(SyncError::InvalidArgument(format!(
                    "Unknown config key: '{key}'. Valid keys: api.base_url, api.token, \
                     http.timeout_secs, http.retries, http.retry_delay_ms, cache.ttl_secs"
                )))
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SyncError::InvalidArgument(format!("'{key}' expects a number, got '{value}'")))
}
