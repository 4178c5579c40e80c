use doctopic_core::config::{PipelineSettings, WeightStrategy};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub fan_out: usize,
    pub workers: usize,
    pub top_k: usize,
    /// None disables the limit.
    pub chunk_timeout: Option<Duration>,
    pub merge_timeout: Option<Duration>,
    pub weight_strategy: WeightStrategy,
    pub max_weight: f64,
    pub validate_merged: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&PipelineSettings::default())
    }
}

impl From<&PipelineSettings> for PipelineConfig {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            fan_out: settings.fan_out.max(1),
            workers: settings.workers.max(1),
            top_k: settings.top_k,
            chunk_timeout: millis(settings.chunk_timeout_ms),
            merge_timeout: millis(settings.merge_timeout_ms),
            weight_strategy: settings.weight_strategy,
            max_weight: settings.max_weight,
            validate_merged: settings.validate_merged,
        }
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}
