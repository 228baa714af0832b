// Run a natural-language query against the dataset

use floatchat_query::{MeasurementRecord, QueryResponse};

use super::Command;
use crate::context::AppContext;
use crate::error::{CliError, CliResult};
use crate::format::{render_csv, render_json, render_stats, render_table, OutputFormat};
use crate::output::OutputStyle;

pub struct QueryCommand {
    context: AppContext,
    text: String,
    format: OutputFormat,
    limit: usize,
}

impl QueryCommand {
    pub fn new(context: AppContext, text: String, format: OutputFormat, limit: usize) -> Self {
        Self {
            context,
            text,
            format,
            limit,
        }
    }

    /// Run the full cycle; an unloaded dataset is an error here
    pub async fn run(&self) -> CliResult<QueryResponse> {
        if self.limit == 0 {
            return Err(CliError::InvalidArgument {
                message: "--limit must be at least 1".to_string(),
            });
        }
        if self.text.trim().is_empty() {
            return Err(CliError::InvalidArgument {
                message: "query text is empty".to_string(),
            });
        }
        let coordinator = self.context.coordinator()?;
        let response = coordinator.run(&self.text).await;
        if response.result.is_unavailable() {
            return Err(self.context.dataset_unavailable());
        }
        Ok(response)
    }

    /// Confirmation line shown before any results
    pub fn interpretation_line(&self, response: &QueryResponse) -> String {
        let mut line = format!("Interpreted: {}", response.descriptor());
        if self.context.verbose {
            line.push_str(&format!(" (via {} extraction)", response.interpretation.strategy));
        }
        line
    }

    pub fn render(&self, response: &QueryResponse, style: &OutputStyle) -> CliResult<String> {
        let shown: Vec<MeasurementRecord> = response.result.rows.records().take(self.limit).collect();

        match self.format {
            OutputFormat::Json => render_json(response, &shown),
            OutputFormat::Csv => render_csv(&shown),
            OutputFormat::Table => Ok(self.render_table(response, &shown, style)),
        }
    }

    fn render_table(
        &self,
        response: &QueryResponse,
        shown: &[MeasurementRecord],
        style: &OutputStyle,
    ) -> String {
        let result = &response.result;
        let mut out = Vec::new();
        out.push(style.info(&self.interpretation_line(response)));

        if result.is_empty() {
            out.push(style.warning("No data found matching your criteria"));
            return out.join("\n") + "\n";
        }

        out.push(style.success(&format!("Found {} records", result.matched)));
        if result.truncated() {
            out.push(style.warning(&format!(
                "Showing the {} most recent of {} matching records",
                result.len(),
                result.matched
            )));
        }

        if let Some(stats) = response.parameter_stats() {
            out.push(String::new());
            out.push(style.header(&format!("{} statistics", capitalize(stats.parameter.as_str()))));
            out.extend(render_stats(&stats).into_iter().map(|line| format!("  {}", line)));
        }

        out.push(String::new());
        let mut text = out.join("\n");
        text.push('\n');
        text.push_str(&render_table(shown));

        let hidden = result.len().saturating_sub(shown.len());
        if hidden > 0 {
            text.push_str(&style.info(&format!(
                "... {} more rows (use --limit to show more)",
                hidden
            )));
            text.push('\n');
        }
        text
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[async_trait::async_trait]
impl Command for QueryCommand {
    async fn execute(&self) -> CliResult<()> {
        let style = OutputStyle::default();
        let response = self.run().await?;

        if self.format != OutputFormat::Table {
            eprintln!("{}", self.interpretation_line(&response));
        }
        print!("{}", self.render(&response, &style)?);
        Ok(())
    }
}
