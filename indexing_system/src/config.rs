/// Configuration module for the indexing service client
use crate::error::{IndexerError, IndexerResult};
use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `MULTIPROXY__INDEXER__BASE_URL`
pub const ENV_PREFIX: &str = "MULTIPROXY";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Indexing service configuration
    pub indexer: IndexerConfig,
}

/// Indexing service connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Base URL of the indexing service
    pub base_url: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Default page size for pending transaction listings
    pub page_size: u32,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4350".to_string(),
            request_timeout_secs: 30,
            page_size: 20,
        }
    }
}

impl IndexerConfig {
    /// Config pointing at `base_url` with default settings
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Validate settings
    pub fn validate(&self) -> IndexerResult<()> {
        url::Url::parse(&self.base_url)?;
        if self.page_size == 0 {
            return Err(IndexerError::Config(
                "Page size must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(IndexerError::Config(
                "Request timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from `MULTIPROXY__*` environment variables over defaults
    pub fn from_env() -> IndexerResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.indexer.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing keys take defaults
    pub fn from_file(path: &str) -> IndexerResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| IndexerError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| IndexerError::Config(format!("Failed to parse config: {}", e)))?;

        config.indexer.validate()?;
        Ok(config)
    }
}
