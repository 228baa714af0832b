// Effective configuration

use super::Command;
use crate::context::AppContext;
use crate::error::CliResult;

pub struct ConfigCommand {
    context: AppContext,
}

impl ConfigCommand {
    pub fn new(context: AppContext) -> Self {
        Self { context }
    }
}

#[async_trait::async_trait]
impl Command for ConfigCommand {
    async fn execute(&self) -> CliResult<()> {
        print!("{}", self.context.config.to_toml()?);
        Ok(())
    }
}
