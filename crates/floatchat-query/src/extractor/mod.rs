//! Entity extraction: free text to [`QueryDescriptor`]
//!
//! Two interchangeable strategies sit behind [`ExtractionStrategy`]. The
//! model-backed one runs only when its connectivity probe succeeds; the keyword
//! one always works, so [`EntityExtractor::extract`] is total.

pub mod keyword;
pub mod model;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use keyword::KeywordStrategy;
pub use model::{build_prompt, parse_model_response, ModelStrategy};

use crate::{completion::CompletionClient, config::OllamaConfig, descriptor::QueryDescriptor, Result};

/// Which strategy produced a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Model,
    Keyword,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Model => f.write_str("model"),
            StrategyKind::Keyword => f.write_str("keyword"),
        }
    }
}

/// One way of turning text into a descriptor
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Cheap check run before [`ExtractionStrategy::extract`]
    async fn is_available(&self) -> bool {
        true
    }

    async fn extract(&self, text: &str) -> Result<QueryDescriptor>;
}

/// Descriptor plus the strategy that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub descriptor: QueryDescriptor,
    pub strategy: StrategyKind,
}

/// Runs the primary strategy when reachable and falls back to keywords
pub struct EntityExtractor {
    primary: Option<Box<dyn ExtractionStrategy>>,
    fallback: KeywordStrategy,
}

impl EntityExtractor {
    pub fn new(primary: Box<dyn ExtractionStrategy>) -> Self {
        Self {
            primary: Some(primary),
            fallback: KeywordStrategy::new(),
        }
    }

    /// Keyword extraction only
    pub fn offline() -> Self {
        Self {
            primary: None,
            fallback: KeywordStrategy::new(),
        }
    }

    /// Model-backed extractor for `client`, or offline when disabled
    pub fn from_config(client: Arc<dyn CompletionClient>, config: &OllamaConfig) -> Self {
        if !config.enabled {
            return Self::offline();
        }
        Self::new(Box::new(ModelStrategy::new(
            client,
            config.model.clone(),
            config.request_timeout(),
            config.probe_timeout(),
        )))
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Never fails: every error ends in the keyword strategy
    pub async fn extract(&self, text: &str) -> QueryDescriptor {
        self.interpret(text).await.descriptor
    }

    /// Like [`EntityExtractor::extract`], also reporting the strategy used
    pub async fn interpret(&self, text: &str) -> Interpretation {
        if let Some(primary) = &self.primary {
            if primary.is_available().await {
                match primary.extract(text).await {
                    Ok(descriptor) => {
                        info!("Extracted entities with {} strategy", primary.kind());
                        return Interpretation {
                            descriptor,
                            strategy: primary.kind(),
                        };
                    }
                    Err(e) if e.is_unavailable() => {
                        warn!("{} service unavailable, using keywords: {}", primary.kind(), e)
                    }
                    Err(e) => warn!("{} extraction failed, using keywords: {}", primary.kind(), e),
                }
            } else {
                info!("{} strategy not available, using fallback keyword extraction", primary.kind());
            }
        }

        Interpretation {
            descriptor: self.fallback.extract_sync(text),
            strategy: StrategyKind::Keyword,
        }
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::offline()
    }
}
