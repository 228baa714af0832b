//! Natural-language query core for FloatChat
//!
//! Turns a free-text request about ARGO float measurements into a
//! [`QueryDescriptor`] and applies it to an in-memory measurement table:
//!
//! - [`EntityExtractor`]: model-backed extraction with a keyword fallback
//! - [`GeoResolver`]: location names to bounding boxes
//! - [`FilterPipeline`]: parameter, location, date and depth stages plus a result cap
//! - [`QueryCoordinator`]: the end-to-end cycle
//!
//! # Example
//!
//! ```no_run
//! use floatchat_query::{ConfigManager, QueryCoordinator};
//!
//! # async fn run() -> floatchat_query::Result<()> {
//! let config = ConfigManager::new().load()?;
//! let coordinator = QueryCoordinator::from_config(&config, false)?;
//! let response = coordinator.run("temperature in the Arabian Sea from 2010 to 2015").await;
//! println!("{} ({} rows)", response.descriptor(), response.result.len());
//! # Ok(())
//! # }
//! ```

pub mod completion;
pub mod config;
pub mod coordinator;
pub mod dataset;
pub mod deadline;
pub mod descriptor;
pub mod error;
pub mod extractor;
pub mod geo;
pub mod pipeline;
pub mod summary;

pub use completion::{CompletionClient, GenerateRequest, GenerateResponse, OllamaClient};
pub use config::{ConfigManager, FloatChatConfig};
pub use coordinator::{QueryCoordinator, QueryResponse, ServiceStatus};
pub use dataset::{Column, DatasetHandle, MeasurementRecord, MeasurementTable, TableView};
pub use deadline::{call_with_deadline, Deadline};
pub use descriptor::{DepthRange, Parameter, QueryDescriptor, TemporalFilter};
pub use error::QueryError;
pub use extractor::{EntityExtractor, ExtractionStrategy, Interpretation, KeywordStrategy, ModelStrategy, StrategyKind};
pub use geo::{GeoBounds, GeoPoint, GeoResolver, GeocodeCache, Geocoder, InMemoryGeocodeCache, NominatimGeocoder};
pub use pipeline::{DatasetStatus, FilterPipeline, FilterStage, QueryResult};
pub use summary::{DatasetSummary, ParameterStats};

/// Result type for query operations
pub type Result<T> = std::result::Result<T, QueryError>;
