//! Configuration loading
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. Global config (`~/.config/floatchat/config.toml`)
//! 3. Project config (`./floatchat.toml`) or an explicit path
//! 4. Environment variables (`FLOATCHAT__OLLAMA__MODEL=llama3` and so on)

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::QueryError, Result};

/// Widest anchor window accepted, roughly a thousand years either side
pub const MAX_ANCHOR_WINDOW_DAYS: i64 = 365_000;

/// Dataset location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// CSV file holding the consolidated measurements
    pub path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("processed_data/master_dataset.csv"),
        }
    }
}

/// Text-completion service used by the model-backed extraction strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    /// Bound on the extraction request itself
    pub request_timeout_secs: u64,
    /// Bound on the connectivity probe that precedes it
    pub probe_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:11434".to_string(),
            model: "gemma2:2b".to_string(),
            request_timeout_secs: 3,
            probe_timeout_secs: 8,
        }
    }
}

impl OllamaConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Point geocoder used for locations missing from the static region table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub enabled: bool,
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Half-width of the box built around a geocoded point, in degrees
    pub margin_degrees: f64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "floatchat-v1.0".to_string(),
            timeout_secs: 10,
            margin_degrees: 2.0,
        }
    }
}

impl GeocoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Filter pipeline tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Results above this size keep only the most recent rows
    pub result_cap: usize,
    /// Half-width of the window around an anchor date
    pub anchor_window_days: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            result_cap: 10_000,
            anchor_window_days: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of error, warn, info, debug, trace
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatChatConfig {
    pub dataset: DatasetConfig,
    pub ollama: OllamaConfig,
    pub geocoder: GeocoderConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

impl FloatChatConfig {
    /// Reject values no component can work with
    pub fn validate(&self) -> Result<()> {
        if self.ollama.base_url.trim().is_empty() {
            return Err(QueryError::ConfigError(
                "Ollama base URL is required".to_string(),
            ));
        }
        if self.ollama.model.trim().is_empty() {
            return Err(QueryError::ConfigError(
                "Ollama model name is required".to_string(),
            ));
        }
        if self.ollama.request_timeout_secs == 0 || self.ollama.probe_timeout_secs == 0 {
            return Err(QueryError::ConfigError(
                "Ollama timeouts must be greater than 0".to_string(),
            ));
        }
        if self.geocoder.base_url.trim().is_empty() {
            return Err(QueryError::ConfigError(
                "Geocoder base URL is required".to_string(),
            ));
        }
        if self.geocoder.timeout_secs == 0 {
            return Err(QueryError::ConfigError(
                "Geocoder timeout must be greater than 0".to_string(),
            ));
        }
        let margin = self.geocoder.margin_degrees;
        if margin.is_nan() || margin < 0.0 {
            return Err(QueryError::ConfigError(
                "Geocoder margin must be a non-negative number of degrees".to_string(),
            ));
        }
        if self.pipeline.result_cap == 0 {
            return Err(QueryError::ConfigError(
                "Result cap must be greater than 0".to_string(),
            ));
        }
        if !(0..=MAX_ANCHOR_WINDOW_DAYS).contains(&self.pipeline.anchor_window_days) {
            return Err(QueryError::ConfigError(format!(
                "Anchor window must be between 0 and {} days",
                MAX_ANCHOR_WINDOW_DAYS
            )));
        }
        Ok(())
    }

    /// Render as TOML, as written to a config file
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Layered configuration loader
pub struct ConfigManager {
    global_path: Option<PathBuf>,
    project_path: PathBuf,
    project_required: bool,
    env_prefix: String,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            global_path: Self::default_global_path(),
            project_path: PathBuf::from("floatchat.toml"),
            project_required: false,
            env_prefix: "FLOATCHAT".to_string(),
        }
    }

    /// Use `path` instead of `./floatchat.toml`; it becomes required
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: path.into(),
            project_required: true,
            ..Self::new()
        }
    }

    /// Skip the per-user config file
    pub fn without_global(mut self) -> Self {
        self.global_path = None;
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    fn default_global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("floatchat").join("config.toml"))
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    pub fn load(&self) -> Result<FloatChatConfig> {
        let mut builder = Config::builder().add_source(Config::try_from(&FloatChatConfig::default())?);

        if let Some(global) = &self.global_path {
            debug!("Loading global config from {:?}", global);
            builder = builder.add_source(File::from(global.clone()).required(false));
        }

        debug!("Loading project config from {:?}", self.project_path);
        builder = builder
            .add_source(File::from(self.project_path.clone()).required(self.project_required))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .separator("__")
                    .try_parsing(true),
            );

        let config: FloatChatConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_service_contract() {
        let config = FloatChatConfig::default();
        assert_eq!(config.ollama.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.ollama.probe_timeout(), Duration::from_secs(8));
        assert_eq!(config.geocoder.timeout(), Duration::from_secs(10));
        assert_eq!(config.geocoder.margin_degrees, 2.0);
        assert_eq!(config.pipeline.result_cap, 10_000);
        assert_eq!(config.pipeline.anchor_window_days, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_cap() {
        let mut config = FloatChatConfig::default();
        config.pipeline.result_cap = 0;
        match config.validate() {
            Err(QueryError::ConfigError(msg)) => assert!(msg.contains("Result cap")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_rejects_empty_url() {
        let mut config = FloatChatConfig::default();
        config.ollama.base_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_nan_margin() {
        let mut config = FloatChatConfig::default();
        config.geocoder.margin_degrees = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_negative_margin() {
        let mut config = FloatChatConfig::default();
        config.geocoder.margin_degrees = -0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_bounds_anchor_window() {
        let mut config = FloatChatConfig::default();
        config.pipeline.anchor_window_days = MAX_ANCHOR_WINDOW_DAYS;
        assert!(config.validate().is_ok());

        config.pipeline.anchor_window_days = i64::MAX / 2;
        match config.validate() {
            Err(QueryError::ConfigError(msg)) => assert!(msg.contains("Anchor window")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }

        config.pipeline.anchor_window_days = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[ollama]\nmodel = \"llama3\"\n\n[pipeline]\nresult_cap = 500"
        )
        .unwrap();

        let config = ConfigManager::with_path(file.path())
            .without_global()
            .with_env_prefix("FLOATCHAT_TEST_PARTIAL")
            .load()
            .unwrap();

        assert_eq!(config.ollama.model, "llama3");
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.pipeline.result_cap, 500);
        assert_eq!(config.pipeline.anchor_window_days, 30);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = ConfigManager::with_path("/nonexistent/floatchat.toml")
            .without_global()
            .with_env_prefix("FLOATCHAT_TEST_MISSING")
            .load();
        assert!(matches!(result, Err(QueryError::ConfigError(_))));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let rendered = FloatChatConfig::default().to_toml().unwrap();
        assert!(rendered.contains("[ollama]"));
        assert!(rendered.contains("gemma2:2b"));
        let parsed: FloatChatConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, FloatChatConfig::default());
    }
}
