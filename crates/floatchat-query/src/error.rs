//! Error types for query interpretation and filter resolution

use std::time::Duration;

use thiserror::Error;

/// Errors raised while talking to external services, loading data or reading
/// configuration.
///
/// Extraction, geocoding and filtering recover from every variant locally; only
/// setup paths (configuration, dataset loading, client construction) return
/// these to the caller.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Geocoding failed: {0}")]
    GeocodeFailed(String),

    #[error("Dataset error: {0}")]
    DatasetError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl QueryError {
    /// Whether the error came from an unreachable or slow external service.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            QueryError::NetworkError(_) | QueryError::Timeout(_) | QueryError::HttpStatus { .. }
        )
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            QueryError::Timeout(Duration::ZERO)
        } else if err.is_decode() {
            QueryError::MalformedResponse(err.to_string())
        } else {
            QueryError::NetworkError(err.to_string())
        }
    }
}

impl From<config::ConfigError> for QueryError {
    fn from(err: config::ConfigError) -> Self {
        QueryError::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for QueryError {
    fn from(err: toml::ser::Error) -> Self {
        QueryError::ConfigError(err.to_string())
    }
}
