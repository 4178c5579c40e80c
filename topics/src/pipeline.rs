use crate::analyzer::{ChunkAnalysis, ChunkSource, HierarchyAnalyzer};
use crate::config::PipelineConfig;
use crate::error::{ChunkError, PipelineError};
use crate::flatten::flatten;
use crate::merger::HierarchyMerger;
use crate::partition::chunk_document;
use crate::retrieve::ContextRetriever;
use crate::validate::ResponseValidator;
use doctopic_core::ingest::Segment;
use doctopic_core::model::{FlatTopicRecord, TopicTree};
use doctopic_core::retrieval::SimilarityIndex;
use jobs::WorkerPool;
use serde::Serialize;
use slm::Judge;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use storage::TopicCache;
use tracing::{error, info, warn};

/// Per-run chunk accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub chunks: usize,
    pub analyzed: usize,
    pub cached: usize,
    pub empty: usize,
    pub skipped: usize,
    pub timed_out: usize,
    pub merge_inputs: usize,
}

impl RunReport {
    fn record(&mut self, outcome: &Result<ChunkAnalysis, ChunkError>) {
        match outcome {
            Ok(analysis) => match analysis.source {
                ChunkSource::Judge => self.analyzed += 1,
                ChunkSource::Cache => self.cached += 1,
                ChunkSource::Empty => self.empty += 1,
            },
            Err(ChunkError::Timeout(_)) => {
                self.skipped += 1;
                self.timed_out += 1;
            }
            Err(_) => self.skipped += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub records: Vec<FlatTopicRecord>,
    pub merged: TopicTree,
    pub report: RunReport,
}

/// Partition, analyze chunks in parallel, merge once, flatten.
///
/// Each run owns a [`WorkerPool`] sized by `workers`; chunk tasks and the
/// merge both execute on it and it is shut down before the run returns.
pub struct TopicPipeline {
    judge: Arc<dyn Judge>,
    index: Arc<dyn SimilarityIndex>,
    cache: Option<Arc<dyn TopicCache>>,
    config: PipelineConfig,
}

impl TopicPipeline {
    pub fn new(
        judge: Arc<dyn Judge>,
        index: Arc<dyn SimilarityIndex>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            judge,
            index,
            cache: None,
            config,
        }
    }

    pub fn set_cache(&mut self, cache: Arc<dyn TopicCache>) {
        self.cache = Some(cache);
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(&self, segments: &[Segment]) -> Result<Vec<FlatTopicRecord>, PipelineError> {
        Ok(self.run_with_report(segments).await?.records)
    }

    pub async fn run_with_report(
        &self,
        segments: &[Segment],
    ) -> Result<PipelineOutput, PipelineError> {
        let started = Instant::now();
        let pool = WorkerPool::start(self.config.workers);
        let result = self.run_on(&pool, segments).await;
        pool.shutdown().await;

        match &result {
            Ok(output) => info!(
                segments = segments.len(),
                records = output.records.len(),
                report = ?output.report,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "topic pipeline finished"
            ),
            Err(err) => error!(
                segments = segments.len(),
                error = %err,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "topic pipeline failed"
            ),
        }
        result
    }

    async fn run_on(
        &self,
        pool: &WorkerPool,
        segments: &[Segment],
    ) -> Result<PipelineOutput, PipelineError> {
        let chunks = chunk_document(segments, self.config.fan_out);
        let analyzer = Arc::new(self.analyzer());
        let mut report = RunReport {
            chunks: chunks.len(),
            ..RunReport::default()
        };

        let mut handles = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let analyzer = analyzer.clone();
            let limit = self.config.chunk_timeout;
            let index = chunk.index;
            let handle = pool
                .submit(async move {
                    with_deadline(limit, analyzer.analyze(&chunk))
                        .await
                        .unwrap_or_else(|elapsed| Err(ChunkError::Timeout(elapsed)))
                })
                .await?;
            handles.push((index, handle));
        }

        // Every chunk reaches a terminal state before the merge starts.
        let mut trees = Vec::new();
        for (index, handle) in handles {
            let outcome = match handle.join().await {
                Ok(outcome) => outcome,
                Err(err) => Err(ChunkError::from(err)),
            };
            report.record(&outcome);
            match outcome {
                Ok(analysis) if !analysis.tree.is_empty() => trees.push(analysis.tree),
                Ok(_) => {}
                Err(err) => warn!(chunk = index, error = %err, "chunk skipped"),
            }
        }
        report.merge_inputs = trees.len();
        info!(
            chunks = report.chunks,
            usable = trees.len(),
            skipped = report.skipped,
            "chunk analysis complete"
        );

        let merger = self.merger();
        let limit = self.config.merge_timeout;
        let merged = pool
            .submit(async move {
                match with_deadline(limit, merger.merge(&trees)).await {
                    Ok(result) => result.map_err(PipelineError::from),
                    Err(elapsed) => Err(PipelineError::MergeTimeout(elapsed)),
                }
            })
            .await?
            .join()
            .await??;

        Ok(PipelineOutput {
            records: flatten(&merged.topics),
            merged,
            report,
        })
    }

    fn analyzer(&self) -> HierarchyAnalyzer {
        let analyzer = HierarchyAnalyzer::new(
            self.judge.clone(),
            ContextRetriever::new(self.index.clone(), self.config.top_k),
            ResponseValidator::new(self.config.max_weight),
            self.config.weight_strategy,
        );
        match &self.cache {
            Some(cache) => analyzer.with_cache(cache.clone()),
            None => analyzer,
        }
    }

    fn merger(&self) -> HierarchyMerger {
        HierarchyMerger::new(
            self.judge.clone(),
            ResponseValidator::new(self.config.max_weight),
            self.config.weight_strategy,
            self.config.validate_merged,
        )
    }
}

/// `Err(limit)` if `future` does not finish within `limit`.
async fn with_deadline<F: Future>(
    limit: Option<Duration>,
    future: F,
) -> Result<F::Output, Duration> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, future).await.map_err(|_| limit),
        None => Ok(future.await),
    }
}
