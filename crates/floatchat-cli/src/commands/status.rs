// Language model service availability

use floatchat_query::{OllamaClient, ServiceStatus};

use super::Command;
use crate::context::AppContext;
use crate::error::CliResult;
use crate::output::OutputStyle;

pub struct StatusCommand {
    context: AppContext,
}

impl StatusCommand {
    pub fn new(context: AppContext) -> Self {
        Self { context }
    }

    /// Ask the service for its models; `None` when the model is switched off
    pub async fn check(&self) -> CliResult<Option<ServiceStatus>> {
        let ollama = &self.context.config.ollama;
        if self.context.offline || !ollama.enabled {
            return Ok(None);
        }

        let client = OllamaClient::with_timeout(&ollama.base_url, ollama.probe_timeout())?;
        Ok(Some(ServiceStatus::check(&client, ollama.probe_timeout()).await))
    }
}

#[async_trait::async_trait]
impl Command for StatusCommand {
    async fn execute(&self) -> CliResult<()> {
        let style = OutputStyle::default();
        let ollama = &self.context.config.ollama;

        let Some(status) = self.check().await? else {
            println!("{}", style.info("Language model disabled - using keyword extraction"));
            return Ok(());
        };

        if status.reachable {
            let model = status.model.as_deref().unwrap_or("no models installed");
            println!("{}", style.success(&format!("Ollama connected ({})", model)));
        } else {
            println!(
                "{}",
                style.warning("Ollama not available - using fallback keyword extraction")
            );
        }
        println!("{}", style.key_value("endpoint", &ollama.base_url));
        println!("{}", style.key_value("model", &ollama.model));
        Ok(())
    }
}
