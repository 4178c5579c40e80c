use doctopic_core::error::{DoctopicError, ErrorCode};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use tokio::sync::mpsc;

/// A unit of work for the pool. Results travel back through a oneshot
/// captured inside the future.
pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("worker pool is shut down")]
    Closed,
    #[error("task ended without producing a result")]
    TaskAborted,
}

impl DoctopicError for PoolError {
    fn error_code(&self) -> ErrorCode {
        match self {
            PoolError::Closed => ErrorCode::Unavailable,
            PoolError::TaskAborted => ErrorCode::Internal,
        }
    }
}

#[async_trait::async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: Job) -> Result<(), PoolError>;
}

/// Bounded in-memory queue over a Tokio channel.
#[derive(Clone)]
pub struct ChannelJobQueue {
    sender: mpsc::Sender<Job>,
}

impl ChannelJobQueue {
    pub fn new(sender: mpsc::Sender<Job>) -> Self {
        Self { sender }
    }
}

#[async_trait::async_trait]
impl JobQueue for ChannelJobQueue {
    async fn enqueue(&self, job: Job) -> Result<(), PoolError> {
        self.sender.send(job).await.map_err(|_| PoolError::Closed)
    }
}
