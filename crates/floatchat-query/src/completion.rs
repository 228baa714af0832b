//! Text-completion service client (Ollama)
//!
//! Only the non-streaming `/api/generate` call and the `/api/tags` listing are
//! needed. Callers bound every call with [`crate::deadline::call_with_deadline`];
//! the HTTP client carries its own timeout as a second line.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{error::QueryError, Result};

/// Default pool idle timeout (90 seconds)
const DEFAULT_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Upper bound for a single HTTP exchange; per-call deadlines are shorter
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Body of `POST /api/generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

impl GenerateRequest {
    /// Non-streaming request, the only mode used here
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: false,
        }
    }
}

/// Relevant part of the `/api/generate` reply.
///
/// `response` stays optional so a probe can tell a well-formed reply from one
/// missing the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Option<Vec<ModelTag>>,
}

/// Mockable text-completion client
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one non-streaming completion request
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;

    /// Names of the models installed on the service
    async fn list_models(&self) -> Result<Vec<String>>;
}

/// Ollama HTTP client
pub struct OllamaClient {
    client: Arc<Client>,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    /// # Errors
    /// Returns `ConfigError` if `base_url` is empty
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(QueryError::ConfigError(
                "Ollama base URL is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT_SECS))
            .build()
            .map_err(|e| QueryError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
        })
    }

    pub fn with_default_endpoint() -> Result<Self> {
        Self::new("http://localhost:11434")
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/api/generate", self.base_url);
        debug!("POST {} (model: {})", url, request.model);

        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Completion request failed: HTTP {}: {}", status, message);
            return Err(QueryError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<GenerateResponse>(&body)
            .map_err(|e| QueryError::MalformedResponse(format!("generate reply: {}", e)))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(QueryError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let tags: TagsResponse = serde_json::from_str(&body)
            .map_err(|e| QueryError::MalformedResponse(format!("tags reply: {}", e)))?;

        Ok(tags
            .models
            .unwrap_or_default()
            .into_iter()
            .map(|tag| tag.name)
            .collect())
    }
}
