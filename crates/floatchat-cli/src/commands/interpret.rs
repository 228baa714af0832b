// Show how a question is understood

use super::Command;
use crate::context::AppContext;
use crate::error::CliResult;
use crate::output::OutputStyle;

pub struct InterpretCommand {
    context: AppContext,
    text: String,
}

impl InterpretCommand {
    pub fn new(context: AppContext, text: String) -> Self {
        Self { context, text }
    }
}

#[async_trait::async_trait]
impl Command for InterpretCommand {
    async fn execute(&self) -> CliResult<()> {
        let style = OutputStyle::default();
        let interpretation = self.context.coordinator()?.interpret(&self.text).await;

        println!("{}", style.info(&format!("Interpreted: {}", interpretation.descriptor)));
        if self.context.verbose {
            println!("{}", style.key_value("strategy", &interpretation.strategy.to_string()));
            println!("{}", serde_json::to_string_pretty(&interpretation.descriptor)?);
        }
        Ok(())
    }
}
