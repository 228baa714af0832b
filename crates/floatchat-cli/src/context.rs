// Shared state handed to every command

use floatchat_query::{ConfigManager, FloatChatConfig, QueryCoordinator};
use tracing::debug;

use crate::error::{CliError, CliResult};
use crate::router::Cli;

/// Effective configuration plus the global flags commands care about
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: FloatChatConfig,
    pub offline: bool,
    pub verbose: bool,
}

impl AppContext {
    /// Load layered configuration and apply command-line overrides
    pub fn load(cli: &Cli) -> CliResult<Self> {
        let manager = match &cli.config {
            Some(path) => ConfigManager::with_path(path),
            None => ConfigManager::new(),
        };
        let mut config = manager.load()?;

        if let Some(data) = &cli.data {
            debug!("Dataset path overridden to {}", data.display());
            config.dataset.path = data.clone();
        }

        Ok(Self {
            config,
            offline: cli.offline,
            verbose: cli.verbose,
        })
    }

    pub fn from_config(config: FloatChatConfig, offline: bool) -> Self {
        Self {
            config,
            offline,
            verbose: false,
        }
    }

    pub fn coordinator(&self) -> CliResult<QueryCoordinator> {
        Ok(QueryCoordinator::from_config(&self.config, self.offline)?)
    }

    pub fn dataset_unavailable(&self) -> CliError {
        CliError::DatasetUnavailable {
            path: self.config.dataset.path.clone(),
        }
    }
}
