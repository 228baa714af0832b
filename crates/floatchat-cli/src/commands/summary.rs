// Dataset overview

use super::Command;
use crate::context::AppContext;
use crate::error::CliResult;
use crate::format::render_summary;
use crate::output::OutputStyle;

pub struct SummaryCommand {
    context: AppContext,
    json: bool,
}

impl SummaryCommand {
    pub fn new(context: AppContext, json: bool) -> Self {
        Self { context, json }
    }
}

#[async_trait::async_trait]
impl Command for SummaryCommand {
    async fn execute(&self) -> CliResult<()> {
        let coordinator = self.context.coordinator()?;
        let summary = coordinator
            .dataset_summary()
            .ok_or_else(|| self.context.dataset_unavailable())?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        let style = OutputStyle::default();
        println!("{}", style.header("Dataset Summary"));
        println!();
        for (key, value) in render_summary(&summary) {
            println!("{}", style.key_value(&key, &value));
        }
        Ok(())
    }
}
