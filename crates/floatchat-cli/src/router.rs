// Command routing and dispatch

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{
    Command, ConfigCommand, InterpretCommand, QueryCommand, StatusCommand, SummaryCommand,
};
use crate::context::AppContext;
use crate::error::CliResult;
use crate::format::OutputFormat;
use crate::logging;

/// FloatChat - ask questions about ARGO float data in plain language
#[derive(Parser, Debug)]
#[command(name = "floatchat")]
#[command(bin_name = "floatchat")]
#[command(about = "Ask questions about ARGO float measurements in plain language")]
#[command(
    long_about = "FloatChat turns questions like \"temperature in the Arabian Sea from 2010 to 2015\" into filters over a consolidated ARGO measurement table.\n\nQuick Start:\n  • floatchat query \"salinity near Sri Lanka\"\n  • floatchat interpret \"pressure between 100-500 m\"\n  • floatchat summary\n  • floatchat status"
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of ./floatchat.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Dataset CSV to load instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimize output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use keyword extraction and the built-in region table only
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Interpret a question and show the matching measurements
    Query {
        /// The question, e.g. "temperature in the Arabian Sea"
        #[arg(value_name = "TEXT", required = true, num_args = 1..)]
        text: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Maximum number of rows to print
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Show how a question is understood without querying data
    Interpret {
        #[arg(value_name = "TEXT", required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Summarize the loaded dataset
    Summary {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether the language model service is reachable
    Status,

    /// Print the effective configuration as TOML
    Config,
}

/// Command router
pub struct CommandRouter;

impl CommandRouter {
    /// Parse arguments and execute the selected command
    pub async fn route() -> CliResult<()> {
        let cli = Cli::parse();
        Self::execute(cli).await
    }

    pub async fn execute(cli: Cli) -> CliResult<()> {
        let context = AppContext::load(&cli)?;
        logging::init_logging(logging::resolve_level(
            cli.verbose,
            cli.quiet,
            &context.config.logging.level,
        ));

        let command: Box<dyn Command> = match cli.command {
            Commands::Query {
                text,
                format,
                limit,
            } => Box::new(QueryCommand::new(context, text.join(" "), format, limit)),
            Commands::Interpret { text } => Box::new(InterpretCommand::new(context, text.join(" "))),
            Commands::Summary { json } => Box::new(SummaryCommand::new(context, json)),
            Commands::Status => Box::new(StatusCommand::new(context)),
            Commands::Config => Box::new(ConfigCommand::new(context)),
        };

        command.execute().await
    }
}
