//! Upload-to-topics facade: ingest documents, build the similarity index and
//! run the topic pipeline, returning records in a JSON envelope.

use doctopic_core::config::AppConfig;
use doctopic_core::error::{DoctopicError, ErrorCode};
use doctopic_core::ingest::IngestionRequest;
use doctopic_core::model::FlatTopicRecord;
use ingestion::{select_pdf_uploads, DocumentProcessor, IngestionError, UploadError};
use serde::{Deserialize, Serialize};
use slm::Judge;
use std::sync::Arc;
use storage::{InMemoryTopicCache, TopicCache, TopicCacheConfig};
use thiserror::Error;
use topics::{PipelineConfig, PipelineError, TopicPipeline};
use tracing::info;

pub use ingestion::UploadedFile;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Ingestion(#[from] IngestionError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl DoctopicError for AnalysisError {
    fn error_code(&self) -> ErrorCode {
        match self {
            AnalysisError::Upload(err) => err.error_code(),
            AnalysisError::Ingestion(err) => err.error_code(),
            AnalysisError::Pipeline(err) => err.error_code(),
        }
    }
}

/// `{"data": [...]}` on success; `{"data": [], "error": "..."}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub data: Vec<FlatTopicRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResponse {
    pub fn from_result(result: Result<Vec<FlatTopicRecord>, AnalysisError>) -> Self {
        match result {
            Ok(data) => Self { data, error: None },
            Err(err) => Self {
                data: Vec::new(),
                error: Some(err.to_string()),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

pub struct DocumentAnalyzer {
    processor: DocumentProcessor,
    judge: Arc<dyn Judge>,
    cache: Option<Arc<dyn TopicCache>>,
    pipeline_config: PipelineConfig,
}

impl DocumentAnalyzer {
    pub fn new(config: &AppConfig, judge: Arc<dyn Judge>) -> Self {
        let cache: Option<Arc<dyn TopicCache>> = config.cache.enabled.then(|| {
            Arc::new(InMemoryTopicCache::with_config(TopicCacheConfig::from(
                &config.cache,
            ))) as Arc<dyn TopicCache>
        });

        Self {
            processor: DocumentProcessor::from_settings(&config.ingestion),
            judge,
            cache,
            pipeline_config: PipelineConfig::from(&config.pipeline),
        }
    }

    /// Keeps only `application/pdf` uploads, then analyzes them together.
    pub async fn analyze_uploads(
        &self,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<FlatTopicRecord>, AnalysisError> {
        let requests = select_pdf_uploads(files)?;
        self.analyze_requests(requests).await
    }

    pub async fn analyze_requests(
        &self,
        requests: Vec<IngestionRequest>,
    ) -> Result<Vec<FlatTopicRecord>, AnalysisError> {
        let processed = self.processor.process(requests).await?;
        info!(segments = processed.segments.len(), "documents ingested");

        let mut pipeline = TopicPipeline::new(
            self.judge.clone(),
            processed.index.clone(),
            self.pipeline_config.clone(),
        );
        if let Some(cache) = &self.cache {
            pipeline.set_cache(cache.clone());
        }
        Ok(pipeline.run(&processed.segments).await?)
    }

    pub async fn respond_to_uploads(&self, files: Vec<UploadedFile>) -> AnalysisResponse {
        AnalysisResponse::from_result(self.analyze_uploads(files).await)
    }
}
