// CLI error types

use std::path::PathBuf;

use floatchat_query::QueryError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset not available: {}", path.display())]
    DatasetUnavailable { path: PathBuf },

    #[error("Query error: {0}")]
    Query(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!(
                    "Invalid argument: {}\n\nRun 'floatchat --help' for usage information.",
                    message
                )
            }
            CliError::Io(e) => format!("File operation failed: {}", e),
            CliError::Config(msg) => {
                format!(
                    "Configuration error: {}\n\nRun 'floatchat config' to see the effective configuration.",
                    msg
                )
            }
            CliError::DatasetUnavailable { path } => {
                format!(
                    "Dataset not available at {}\n\nPass --data <PATH> or set [dataset] path in floatchat.toml.",
                    path.display()
                )
            }
            CliError::Query(msg) => format!("Query failed: {}", msg),
            CliError::Output(msg) => format!("Could not write results: {}", msg),
        }
    }

    /// Get technical details for verbose mode
    pub fn technical_details(&self) -> String {
        format!("{:?}", self)
    }
}

impl From<QueryError> for CliError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::ConfigError(msg) => CliError::Config(msg),
            QueryError::IoError(e) => CliError::Io(e),
            other => CliError::Query(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

impl From<csv::Error> for CliError {
    fn from(err: csv::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
