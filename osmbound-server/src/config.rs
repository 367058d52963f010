//! Server configuration, read from an optional TOML file.
//!
//! Every field has a default so an empty file (or no file) yields a working
//! configuration pointing at the public Overpass instance.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub overpass: OverpassConfig,
    pub cache: CacheConfig,
    pub http: HttpConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 3000)),
            overpass: OverpassConfig::default(),
            cache: CacheConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

/// Upstream Overpass API access
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OverpassConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Upper bound on simultaneous upstream requests
    pub max_concurrent: usize,
    /// Additional attempts after the first failure
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OVERPASS_ENDPOINT.to_string(),
            timeout_secs: 30,
            max_concurrent: 5,
            max_retries: 3,
            retry_delay_ms: 2000,
        }
    }
}

impl OverpassConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    /// How often expired collections are swept out
    pub purge_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            purge_interval_secs: 10 * 60,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs)
    }
}

/// Inbound HTTP handling
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Allowed CORS origins, any origin when empty
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            request_timeout_secs: 60,
            max_concurrent_requests: 64,
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ServerConfig {
    /// Loads the configuration from `path`, or the defaults when `None`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}
