use crate::error::ChunkError;
use crate::partition::DocumentChunk;
use crate::reply::interpret_reply;
use crate::retrieve::ContextRetriever;
use crate::validate::ResponseValidator;
use doctopic_core::config::WeightStrategy;
use doctopic_core::ingest::ContentHash;
use doctopic_core::model::TopicTree;
use slm::prompts::{render_chunk_prompt, topic_schema};
use slm::Judge;
use std::sync::Arc;
use storage::TopicCache;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkSource {
    /// No text; the judge was not called.
    Empty,
    Cache,
    Judge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkAnalysis {
    pub tree: TopicTree,
    pub source: ChunkSource,
}

/// Produces one validated topic tree per chunk.
pub struct HierarchyAnalyzer {
    judge: Arc<dyn Judge>,
    retriever: ContextRetriever,
    validator: ResponseValidator,
    strategy: WeightStrategy,
    cache: Option<Arc<dyn TopicCache>>,
}

impl HierarchyAnalyzer {
    pub fn new(
        judge: Arc<dyn Judge>,
        retriever: ContextRetriever,
        validator: ResponseValidator,
        strategy: WeightStrategy,
    ) -> Self {
        Self {
            judge,
            retriever,
            validator,
            strategy,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn TopicCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn analyze(&self, chunk: &DocumentChunk) -> Result<ChunkAnalysis, ChunkError> {
        let text = chunk.text();
        if text.trim().is_empty() {
            debug!(chunk = chunk.index, "empty chunk");
            return Ok(ChunkAnalysis {
                tree: TopicTree::default(),
                source: ChunkSource::Empty,
            });
        }

        let key = self.cache_key(&text);
        if let Some(tree) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            debug!(chunk = chunk.index, "chunk topics served from cache");
            return Ok(ChunkAnalysis {
                tree,
                source: ChunkSource::Cache,
            });
        }

        let combined = self.retriever.enrich(&text).await?;
        let prompt = render_chunk_prompt(&combined);
        let raw = self
            .judge
            .judge(&prompt, &topic_schema())
            .await
            .map_err(ChunkError::Judge)?;

        let tree = interpret_reply(&raw, &self.validator, self.strategy, true)?;
        debug!(
            chunk = chunk.index,
            topics = tree.topics.len(),
            nodes = tree.node_count(),
            "chunk analyzed"
        );

        if let Some(cache) = &self.cache {
            cache.put(&key, tree.clone());
        }
        Ok(ChunkAnalysis {
            tree,
            source: ChunkSource::Judge,
        })
    }

    /// Depends on the chunk's own text, not on retrieved context, so a
    /// rebuilt index does not invalidate cached trees.
    fn cache_key(&self, text: &str) -> String {
        format!("{}\n{:?}\n{}", self.judge.model_id(), self.strategy, text).content_hash()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReplyError;
    use doctopic_core::ingest::Segment;
    use doctopic_core::retrieval::NoContext;
    use slm::ScriptedJudge;
    use storage::InMemoryTopicCache;

    fn chunk(texts: &[&str]) -> DocumentChunk {
        DocumentChunk {
            index: 0,
            segments: texts.iter().map(|t| Segment::new(*t)).collect(),
        }
    }

    fn analyzer(judge: Arc<ScriptedJudge>) -> HierarchyAnalyzer {
        HierarchyAnalyzer::new(
            judge,
            ContextRetriever::new(Arc::new(NoContext), 5),
            ResponseValidator::default(),
            WeightStrategy::Rescale,
        )
    }

    const REVENUE: &str = r#"{"topics": [{"name": "Revenue", "value": 100, "citation": "Revenue grew 20% YoY", "pages": "Page 1, Lines 1-3"}]}"#;

    #[tokio::test]
    async fn empty_chunk_skips_the_judge() {
        let judge = Arc::new(ScriptedJudge::new([REVENUE]));
        let analysis = analyzer(judge.clone()).analyze(&chunk(&[])).await.unwrap();

        assert_eq!(analysis.source, ChunkSource::Empty);
        assert!(analysis.tree.is_empty());
        assert_eq!(judge.calls(), 0);
    }

    #[tokio::test]
    async fn prompt_carries_chunk_text() {
        let judge = Arc::new(ScriptedJudge::new([REVENUE]));
        let analysis = analyzer(judge.clone())
            .analyze(&chunk(&["Revenue grew 20% YoY."]))
            .await
            .unwrap();

        assert_eq!(analysis.source, ChunkSource::Judge);
        assert_eq!(analysis.tree.topics[0].name, "Revenue");
        assert!(judge.prompts()[0].contains("Text for analysis: Revenue grew 20% YoY."));
    }

    #[tokio::test]
    async fn invalid_reply_is_a_chunk_error() {
        let judge = Arc::new(ScriptedJudge::new([r#"{"topics": "Revenue"}"#]));
        let err = analyzer(judge).analyze(&chunk(&["text"])).await.unwrap_err();
        assert!(matches!(err, ChunkError::Reply(ReplyError::Invalid(_))));
    }

    #[tokio::test]
    async fn judge_failure_is_a_chunk_error() {
        let judge = Arc::new(ScriptedJudge::new(Vec::<String>::new()));
        judge.push_error("model overloaded");
        let err = analyzer(judge).analyze(&chunk(&["text"])).await.unwrap_err();
        assert!(matches!(err, ChunkError::Judge(_)));
    }

    #[tokio::test]
    async fn validated_trees_are_cached() {
        let judge = Arc::new(ScriptedJudge::new([REVENUE]));
        let cache = Arc::new(InMemoryTopicCache::new());
        let analyzer = analyzer(judge.clone()).with_cache(cache.clone());
        let chunk = chunk(&["Revenue grew 20% YoY."]);

        let first = analyzer.analyze(&chunk).await.unwrap();
        let second = analyzer.analyze(&chunk).await.unwrap();

        assert_eq!(judge.calls(), 1);
        assert_eq!(second.source, ChunkSource::Cache);
        assert_eq!(second.tree, first.tree);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn rejected_trees_are_not_cached() {
        let judge = Arc::new(ScriptedJudge::new(["not json"]));
        let cache = Arc::new(InMemoryTopicCache::new());
        let analyzer = analyzer(judge).with_cache(cache.clone());

        assert!(analyzer.analyze(&chunk(&["text"])).await.is_err());
        assert!(cache.is_empty());
    }
}
