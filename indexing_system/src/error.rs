/// Error types for the indexing service client
use multiproxy_engine::EngineError;
use thiserror::Error;

/// Main error type for the indexing service client
#[derive(Error, Debug)]
pub enum IndexerError {
    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with an unexpected status
    #[error("Indexer returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Account or transaction unknown to the indexer
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record violates an engine model invariant
    #[error("Model error: {0}")]
    Model(#[from] EngineError),

    /// Malformed service URL
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl From<config::ConfigError> for IndexerError {
    fn from(err: config::ConfigError) -> Self {
        IndexerError::Config(err.to_string())
    }
}

/// Result type alias for indexer operations
pub type IndexerResult<T> = Result<T, IndexerError>;
