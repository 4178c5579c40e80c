use doctopic_core::config::IngestionSettings;
use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait Embedder: Send + Sync {
    fn embed<'a>(&'a self, text: &'a str, model_id: &'a str) -> BoxFuture<'a, Vec<f32>>;

    fn dims(&self) -> usize;
}

pub struct DeterministicEmbedder {
    dims: usize,
}

impl DeterministicEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }
}

impl Default for DeterministicEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl From<&IngestionSettings> for DeterministicEmbedder {
    fn from(settings: &IngestionSettings) -> Self {
        Self::new(settings.embedding_dims)
    }
}

impl Embedder for DeterministicEmbedder {
    fn embed<'a>(&'a self, text: &'a str, model_id: &'a str) -> BoxFuture<'a, Vec<f32>> {
        let dims = self.dims;
        Box::pin(async move {
            doctopic_core::embedding::deterministic_embedding(text, model_id, dims)
        })
    }

    fn dims(&self) -> usize {
        self.dims
    }
}
