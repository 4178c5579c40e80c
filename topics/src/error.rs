use crate::flatten::FlattenError;
use crate::normalize::NormalizeError;
use crate::validate::ValidationError;
use doctopic_core::error::{DoctopicError, ErrorCode};
use doctopic_core::retrieval::RetrievalError;
use jobs::PoolError;
use std::time::Duration;
use thiserror::Error;

/// Why a model reply could not be turned into a usable tree.
#[derive(Error, Debug)]
pub enum ReplyError {
    #[error("reply is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid reply: {0}")]
    Invalid(#[from] ValidationError),
    #[error("weights could not be normalized: {0}")]
    Normalize(#[from] NormalizeError),
}

/// A chunk that ends in one of these is skipped; the run continues.
#[derive(Error, Debug)]
pub enum ChunkError {
    #[error("context retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("judge call failed: {0}")]
    Judge(anyhow::Error),
    #[error(transparent)]
    Reply(#[from] ReplyError),
    #[error("chunk analysis timed out after {0:?}")]
    Timeout(Duration),
    #[error("chunk task did not complete: {0}")]
    Aborted(#[from] PoolError),
}

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("chunk results could not be serialized: {0}")]
    Serialize(serde_json::Error),
    #[error("judge call failed: {0}")]
    Judge(anyhow::Error),
    #[error(transparent)]
    Reply(#[from] ReplyError),
}

/// Run-level failure; no records are returned.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("merge failed: {0}")]
    Merge(#[from] MergeError),
    #[error("merge timed out after {0:?}")]
    MergeTimeout(Duration),
    #[error("worker pool error: {0}")]
    Pool(#[from] PoolError),
}

impl DoctopicError for ValidationError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidModelOutput
    }
}

impl DoctopicError for NormalizeError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidModelOutput
    }
}

impl DoctopicError for ReplyError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidModelOutput
    }
}

impl DoctopicError for FlattenError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidArgument
    }
}

impl DoctopicError for MergeError {
    fn error_code(&self) -> ErrorCode {
        match self {
            MergeError::Serialize(_) => ErrorCode::Internal,
            MergeError::Judge(_) => ErrorCode::Unavailable,
            MergeError::Reply(err) => err.error_code(),
        }
    }
}

impl DoctopicError for ChunkError {
    fn error_code(&self) -> ErrorCode {
        match self {
            ChunkError::Retrieval(err) => err.error_code(),
            ChunkError::Judge(_) => ErrorCode::Unavailable,
            ChunkError::Reply(err) => err.error_code(),
            ChunkError::Timeout(_) => ErrorCode::DeadlineExceeded,
            ChunkError::Aborted(err) => err.error_code(),
        }
    }
}

impl DoctopicError for PipelineError {
    fn error_code(&self) -> ErrorCode {
        match self {
            PipelineError::Merge(err) => err.error_code(),
            PipelineError::MergeTimeout(_) => ErrorCode::DeadlineExceeded,
            PipelineError::Pool(err) => err.error_code(),
        }
    }
}
