//! Model-backed extraction through a text-completion service

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{ExtractionStrategy, StrategyKind};
use crate::{
    completion::{CompletionClient, GenerateRequest},
    deadline::{call_with_deadline, Deadline},
    descriptor::{DepthRange, Parameter, QueryDescriptor},
    error::QueryError,
    Result,
};

/// Prompt sent for the connectivity probe
const PROBE_PROMPT: &str = "Test";

/// Build the fixed extraction prompt for `query`
pub fn build_prompt(query: &str) -> String {
    format!(
        r#"Analyze this oceanographic data query and extract the following information:

Query: "{query}"

Extract ONLY the following (return 'none' if not mentioned):
1. Parameter: temperature, salinity, or pressure
2. Location: arabian sea, bay of bengal, indian ocean, madagascar, maldives, or sri lanka
3. Date: specific date (YYYY-MM-DD format)
4. Date range: start and end dates (YYYY-MM-DD format)
5. Depth range: min and max depth in meters

Format your response exactly like this:
Parameter: [parameter or none]
Location: [location or none]
Date: [date or none]
Date_range: [start_date,end_date or none]
Depth_range: [min_depth,max_depth or none]"#
    )
}

/// Extraction strategy backed by a completion model
pub struct ModelStrategy {
    client: Arc<dyn CompletionClient>,
    model: String,
    request_timeout: Duration,
    probe_timeout: Duration,
}

impl ModelStrategy {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        model: impl Into<String>,
        request_timeout: Duration,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            request_timeout,
            probe_timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }
}

#[async_trait]
impl ExtractionStrategy for ModelStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Model
    }

    /// Ask for a trivial completion; success needs a `response` field and
    /// `done == true`.
    async fn is_available(&self) -> bool {
        let request = GenerateRequest::new(&self.model, PROBE_PROMPT);
        match call_with_deadline(self.probe_timeout, self.client.generate(&request)).await {
            Deadline::Completed(Ok(reply)) => {
                let ok = reply.response.is_some() && reply.done;
                if !ok {
                    debug!("Completion probe returned an incomplete reply");
                }
                ok
            }
            Deadline::Completed(Err(e)) => {
                debug!("Completion probe failed: {}", e);
                false
            }
            Deadline::TimedOut(limit) => {
                debug!("Completion probe timed out after {:?}", limit);
                false
            }
        }
    }

    async fn extract(&self, text: &str) -> Result<QueryDescriptor> {
        let request = GenerateRequest::new(&self.model, build_prompt(text));
        let reply = call_with_deadline(self.request_timeout, self.client.generate(&request))
            .await
            .into_result()?;

        let body = reply
            .response
            .ok_or_else(|| QueryError::MalformedResponse("missing 'response' field".to_string()))?;

        Ok(parse_model_response(&body))
    }
}

/// Parse the labeled-field reply into a descriptor.
///
/// Lines split on their first colon; keys and values are trimmed and
/// lower-cased. `none`, empty and unparseable values leave the field unset. If
/// both a date and a date range come back, the single date wins.
pub fn parse_model_response(response: &str) -> QueryDescriptor {
    let mut parameter = None;
    let mut location = None;
    let mut date = None;
    let mut date_range = None;
    let mut depth_range = None;

    for line in response.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = normalize_key(key);
        let value = clean_value(value);
        if value.is_empty() || value == "none" {
            continue;
        }

        match key.as_str() {
            "parameter" => match value.parse::<Parameter>() {
                Ok(p) => parameter = Some(p),
                Err(e) => debug!("Dropping parameter field: {}", e),
            },
            "location" => location = Some(value),
            "date" => date = parse_date(&value, "date"),
            "date_range" => date_range = parse_date_range(&value),
            "depth_range" => depth_range = parse_depth_range(&value),
            _ => {}
        }
    }

    let mut descriptor = QueryDescriptor::new();
    if let Some(parameter) = parameter {
        descriptor = descriptor.with_parameter(parameter);
    }
    if let Some(location) = location {
        descriptor = descriptor.with_location(location);
    }
    if let Some((start, end)) = date_range {
        descriptor = descriptor.with_date_range(start, end);
    }
    if let Some(date) = date {
        descriptor = descriptor.with_date(date);
    }
    if let Some(range) = depth_range {
        descriptor = descriptor.with_depth_range(range);
    }
    descriptor
}

/// "Date range" and "date_range" both name the same field; list markers such
/// as "4." are ignored.
fn normalize_key(key: &str) -> String {
    key.trim()
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == '-' || c == '*')
        .trim()
        .to_lowercase()
        .replace(' ', "_")
}

fn clean_value(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c| c == '[' || c == ']' || c == '"' || c == '\'')
        .trim()
        .to_lowercase()
}

fn parse_date(value: &str, field: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("Dropping {} field '{}': {}", field, value, e);
            None
        }
    }
}

fn parse_date_range(value: &str) -> Option<(NaiveDate, NaiveDate)> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != 2 {
        warn!("Dropping date_range field '{}': expected two dates", value);
        return None;
    }
    let start = parse_date(parts[0], "date_range")?;
    let end = parse_date(parts[1], "date_range")?;
    Some((start, end))
}

/// An empty side is an open bound; anything non-numeric drops the field.
fn parse_depth_range(value: &str) -> Option<DepthRange> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != 2 {
        warn!("Dropping depth_range field '{}': expected two numbers", value);
        return None;
    }

    let mut bounds = [None, None];
    for (slot, part) in bounds.iter_mut().zip(&parts) {
        let part = part.trim().trim_end_matches('m').trim();
        if part.is_empty() {
            continue;
        }
        match part.parse::<f64>() {
            Ok(v) if v.is_finite() => *slot = Some(v),
            _ => {
                warn!("Dropping depth_range field '{}': '{}' is not a number", value, part);
                return None;
            }
        }
    }

    match bounds {
        [None, None] => None,
        [min, max] => Some(DepthRange { min, max }),
    }
}
