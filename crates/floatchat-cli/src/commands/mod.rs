// Command handlers for the floatchat CLI

pub mod config;
pub mod interpret;
pub mod query;
pub mod status;
pub mod summary;

pub use config::ConfigCommand;
pub use interpret::InterpretCommand;
pub use query::QueryCommand;
pub use status::StatusCommand;
pub use summary::SummaryCommand;

use crate::error::CliResult;

/// Trait for command handlers
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Execute the command
    async fn execute(&self) -> CliResult<()>;
}
