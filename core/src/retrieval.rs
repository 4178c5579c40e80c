use crate::error::{DoctopicError, ErrorCode};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("similarity index unavailable: {0}")]
    Unavailable(String),
    #[error("similarity search failed: {0}")]
    Search(String),
}

impl DoctopicError for RetrievalError {
    fn error_code(&self) -> ErrorCode {
        match self {
            RetrievalError::Unavailable(_) => ErrorCode::Unavailable,
            RetrievalError::Search(_) => ErrorCode::Internal,
        }
    }
}

/// Read-only "top-k similar to this text" over an already built index.
pub trait SimilarityIndex: Send + Sync {
    fn similar<'a>(
        &'a self,
        query: &'a str,
        k: usize,
    ) -> BoxFuture<'a, Result<Vec<String>, RetrievalError>>;
}

/// Index that never returns context. Used when retrieval is disabled.
pub struct NoContext;

impl SimilarityIndex for NoContext {
    fn similar<'a>(
        &'a self,
        _query: &'a str,
        _k: usize,
    ) -> BoxFuture<'a, Result<Vec<String>, RetrievalError>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}
