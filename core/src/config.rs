use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;

/// How per-chunk and merged topic weights are repaired before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightStrategy {
    /// Rescale the top level so it sums to 100, carrying each subtree along.
    #[default]
    Rescale,
    /// Re-derive every sibling list from the word count of its citations.
    CitationLength,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineSettings {
    pub fan_out: usize,
    pub workers: usize,
    pub top_k: usize,
    pub chunk_timeout_ms: u64,
    pub merge_timeout_ms: u64,
    pub weight_strategy: WeightStrategy,
    pub max_weight: f64,
    pub validate_merged: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            fan_out: 8,
            workers: 8,
            top_k: 5,
            chunk_timeout_ms: 120_000,
            merge_timeout_ms: 180_000,
            weight_strategy: WeightStrategy::Rescale,
            max_weight: 100.0,
            validate_merged: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IngestionSettings {
    pub max_chars: usize,
    pub overlap_chars: usize,
    pub embedding_model: String,
    pub embedding_dims: usize,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            max_chars: 2000,
            overlap_chars: 200,
            embedding_model: "embedding-default-v1".to_string(),
            embedding_dims: 384,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct JudgeSettings {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout_ms: u64,
    pub max_retries: usize,
    pub api_key_env: String,
}

impl Default for JudgeSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.2,
            timeout_ms: 120_000,
            max_retries: 3,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub max_entries: usize,
    pub ttl_seconds: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 256,
            ttl_seconds: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineSettings,
    pub ingestion: IngestionSettings,
    pub judge: JudgeSettings,
    pub cache: CacheSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Layers `{dir}/default`, `{dir}/{RUN_MODE}` and `DOCTOPIC__*`
    /// environment variables, later sources winning.
    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let default_path = dir.join("default");
        let mode_path = dir.join(&run_mode);

        let builder = Config::builder()
            .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
            .add_source(File::with_name(&mode_path.to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("DOCTOPIC").separator("__"));

        builder.build()?.try_deserialize()
    }
}
