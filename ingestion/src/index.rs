use crate::embedding::Embedder;
use doctopic_core::ingest::Segment;
use doctopic_core::retrieval::{BoxFuture, RetrievalError, SimilarityIndex};
use std::collections::HashMap;
use std::sync::Arc;
use storage::index::{IndexError, LinearAnnIndex};

/// Embedded segments of one document set, searchable by text.
pub struct DocumentIndex {
    embedder: Arc<dyn Embedder>,
    model_id: String,
    ann: LinearAnnIndex,
    texts: HashMap<u64, String>,
}

impl DocumentIndex {
    /// Segment ids are their positions in `segments`.
    pub async fn build(
        segments: &[Segment],
        embedder: Arc<dyn Embedder>,
        model_id: &str,
    ) -> Result<Self, IndexError> {
        let mut ann = LinearAnnIndex::new();
        let mut texts = HashMap::with_capacity(segments.len());

        for (i, segment) in segments.iter().enumerate() {
            let id = i as u64;
            let embedding = embedder.embed(&segment.content, model_id).await;
            ann.insert(id, embedding)?;
            texts.insert(id, segment.content.clone());
        }

        tracing::debug!(segments = texts.len(), model_id, "document index built");
        Ok(Self {
            embedder,
            model_id: model_id.to_string(),
            ann,
            texts,
        })
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

impl SimilarityIndex for DocumentIndex {
    fn similar<'a>(
        &'a self,
        query: &'a str,
        k: usize,
    ) -> BoxFuture<'a, Result<Vec<String>, RetrievalError>> {
        Box::pin(async move {
            if k == 0 || self.ann.is_empty() {
                return Ok(Vec::new());
            }

            let embedding = self.embedder.embed(query, &self.model_id).await;
            self.ann
                .search(&embedding, k)
                .into_iter()
                .map(|(id, _)| {
                    self.texts
                        .get(&id)
                        .cloned()
                        .ok_or_else(|| {
                            RetrievalError::Search(format!("segment {} has no text", id))
                        })
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::DeterministicEmbedder;

    #[tokio::test]
    async fn similar_returns_closest_segment_first() {
        let segments = vec![
            Segment::new("The office lease in Boston expires next March."),
            Segment::new("Revenue grew 20% year over year driven by subscriptions."),
            Segment::new("Headcount reached 140 employees across three sites."),
        ];
        let index = DocumentIndex::build(
            &segments,
            Arc::new(DeterministicEmbedder::new(1024)),
            "embedding-default-v1",
        )
        .await
        .unwrap();

        let hits = index.similar("revenue grew with subscriptions", 2).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert!(hits[0].starts_with("Revenue grew"));
        assert_eq!(index.len(), 3);
    }

    #[tokio::test]
    async fn zero_k_or_empty_index_returns_nothing() {
        let empty = DocumentIndex::build(&[], Arc::new(DeterministicEmbedder::default()), "m")
            .await
            .unwrap();
        assert!(empty.similar("anything", 5).await.unwrap().is_empty());

        let one = DocumentIndex::build(
            &[Segment::new("text")],
            Arc::new(DeterministicEmbedder::default()),
            "m",
        )
        .await
        .unwrap();
        assert!(one.similar("text", 0).await.unwrap().is_empty());
    }
}
