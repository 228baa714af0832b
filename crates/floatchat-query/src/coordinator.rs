//! End-to-end query cycle: extract, then filter

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::completion::{CompletionClient, OllamaClient};
use crate::config::FloatChatConfig;
use crate::dataset::DatasetHandle;
use crate::deadline::{call_with_deadline, Deadline};
use crate::descriptor::QueryDescriptor;
use crate::extractor::{EntityExtractor, Interpretation};
use crate::geo::{GeoResolver, InMemoryGeocodeCache, NominatimGeocoder};
use crate::pipeline::{FilterPipeline, QueryResult};
use crate::summary::{DatasetSummary, ParameterStats};
use crate::Result;

/// Reachability of the text-completion service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub reachable: bool,
    /// First installed model, when reachable
    pub model: Option<String>,
}

impl ServiceStatus {
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            model: None,
        }
    }

    /// List models on `client`, bounded by `timeout`. Needs no dataset.
    pub async fn check(client: &dyn CompletionClient, timeout: Duration) -> Self {
        match call_with_deadline(timeout, client.list_models()).await {
            Deadline::Completed(Ok(models)) => Self {
                reachable: true,
                model: models.into_iter().next(),
            },
            Deadline::Completed(Err(e)) => {
                debug!("Model listing failed: {}", e);
                Self::unreachable()
            }
            Deadline::TimedOut(limit) => {
                debug!("Model listing timed out after {:?}", limit);
                Self::unreachable()
            }
        }
    }
}

/// Outcome of one query: what was understood and what matched
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    pub interpretation: Interpretation,
    pub result: QueryResult,
}

impl QueryResponse {
    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.interpretation.descriptor
    }

    /// Statistics for the requested parameter over the returned rows
    pub fn parameter_stats(&self) -> Option<ParameterStats> {
        let parameter = self.descriptor().parameter?;
        ParameterStats::compute(&self.result.rows, parameter)
    }
}

/// Wires an [`EntityExtractor`] to a [`FilterPipeline`] over one dataset
pub struct QueryCoordinator {
    extractor: EntityExtractor,
    pipeline: FilterPipeline,
    dataset: DatasetHandle,
    completion: Option<Arc<dyn CompletionClient>>,
    status_timeout: Duration,
}

impl QueryCoordinator {
    pub fn new(extractor: EntityExtractor, pipeline: FilterPipeline, dataset: DatasetHandle) -> Self {
        Self {
            extractor,
            pipeline,
            dataset,
            completion: None,
            status_timeout: Duration::from_secs(8),
        }
    }

    /// Client used by [`QueryCoordinator::service_status`]
    pub fn with_completion_client(mut self, client: Arc<dyn CompletionClient>, timeout: Duration) -> Self {
        self.completion = Some(client);
        self.status_timeout = timeout;
        self
    }

    /// Build every component from configuration.
    ///
    /// `offline` skips both the completion service and the geocoder. A dataset
    /// that fails to load is logged and left unloaded; queries then report it.
    ///
    /// # Errors
    /// Returns `ConfigError` when an HTTP client cannot be constructed
    pub fn from_config(config: &FloatChatConfig, offline: bool) -> Result<Self> {
        let dataset = match DatasetHandle::load_csv(&config.dataset.path) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Dataset unavailable: {}", e);
                DatasetHandle::unloaded()
            }
        };
        Self::from_config_with_dataset(config, offline, dataset)
    }

    /// Like [`QueryCoordinator::from_config`] with an already-loaded dataset
    pub fn from_config_with_dataset(
        config: &FloatChatConfig,
        offline: bool,
        dataset: DatasetHandle,
    ) -> Result<Self> {
        let resolver = if offline || !config.geocoder.enabled {
            GeoResolver::static_only()
        } else {
            let geocoder = NominatimGeocoder::new(
                config.geocoder.base_url.clone(),
                &config.geocoder.user_agent,
                config.geocoder.timeout(),
            )?;
            GeoResolver::new(Arc::new(geocoder), Arc::new(InMemoryGeocodeCache::new()))
                .with_timeout(config.geocoder.timeout())
        };
        let resolver = resolver.with_margin(config.geocoder.margin_degrees);

        let pipeline = FilterPipeline::new(Arc::new(resolver), &config.pipeline);

        if offline || !config.ollama.enabled {
            debug!("Completion service disabled, using keyword extraction only");
            return Ok(Self::new(EntityExtractor::offline(), pipeline, dataset));
        }

        let client: Arc<dyn CompletionClient> = Arc::new(OllamaClient::with_timeout(
            config.ollama.base_url.clone(),
            config.ollama.probe_timeout(),
        )?);
        let extractor = EntityExtractor::from_config(Arc::clone(&client), &config.ollama);

        Ok(Self::new(extractor, pipeline, dataset)
            .with_completion_client(client, config.ollama.probe_timeout()))
    }

    pub fn dataset(&self) -> &DatasetHandle {
        &self.dataset
    }

    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    /// Extraction only
    pub async fn interpret(&self, text: &str) -> Interpretation {
        self.extractor.interpret(text).await
    }

    /// Full cycle; never fails
    pub async fn run(&self, text: &str) -> QueryResponse {
        let interpretation = self.extractor.interpret(text).await;
        info!("Interpreted: {}", interpretation.descriptor);

        let result = self.pipeline.apply(&self.dataset, &interpretation.descriptor).await;
        if result.is_unavailable() {
            warn!("Query ran without a dataset");
        } else {
            info!("Query matched {} records, returning {}", result.matched, result.len());
        }

        QueryResponse {
            interpretation,
            result,
        }
    }

    /// `None` when no dataset is loaded
    pub fn dataset_summary(&self) -> Option<DatasetSummary> {
        self.dataset.table().map(|table| DatasetSummary::compute(table.as_ref()))
    }

    pub async fn service_status(&self) -> ServiceStatus {
        match &self.completion {
            Some(client) => ServiceStatus::check(client.as_ref(), self.status_timeout).await,
            None => ServiceStatus::unreachable(),
        }
    }
}
