// FloatChat CLI library

pub mod commands;
pub mod context;
pub mod error;
pub mod format;
pub mod logging;
pub mod output;
pub mod router;

pub use context::AppContext;
pub use error::{CliError, CliResult};
pub use format::OutputFormat;
pub use router::{Cli, CommandRouter, Commands};
