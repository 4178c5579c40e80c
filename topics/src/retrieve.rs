use doctopic_core::retrieval::{RetrievalError, SimilarityIndex};
use std::sync::Arc;

/// Appends the `top_k` most similar indexed segments to a chunk's text.
#[derive(Clone)]
pub struct ContextRetriever {
    index: Arc<dyn SimilarityIndex>,
    top_k: usize,
}

impl ContextRetriever {
    pub fn new(index: Arc<dyn SimilarityIndex>, top_k: usize) -> Self {
        Self { index, top_k }
    }

    /// Retrieved segments in similarity order, minus those already present
    /// verbatim in `chunk_text`.
    pub async fn context_for(&self, chunk_text: &str) -> Result<Vec<String>, RetrievalError> {
        if self.top_k == 0 {
            return Ok(Vec::new());
        }

        let hits = self.index.similar(chunk_text, self.top_k).await?;
        Ok(hits
            .into_iter()
            .filter(|hit| !hit.trim().is_empty() && !chunk_text.contains(hit.as_str()))
            .collect())
    }

    /// `chunk_text` followed by its context, space separated.
    pub async fn enrich(&self, chunk_text: &str) -> Result<String, RetrievalError> {
        let context = self.context_for(chunk_text).await?;
        if context.is_empty() {
            return Ok(chunk_text.to_string());
        }

        let mut combined = String::with_capacity(
            chunk_text.len() + context.iter().map(|c| c.len() + 1).sum::<usize>(),
        );
        combined.push_str(chunk_text);
        for segment in &context {
            combined.push(' ');
            combined.push_str(segment);
        }
        Ok(combined)
    }
}
