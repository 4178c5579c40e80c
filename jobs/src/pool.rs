use crate::queue::{ChannelJobQueue, Job, JobQueue, PoolError};
use crate::worker::Worker;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::info;

/// Fixed number of workers sharing one bounded queue.
///
/// Must be started inside a Tokio runtime. Call [`WorkerPool::shutdown`] to
/// close the queue and wait for queued and in-flight jobs; dropping the pool
/// instead closes the queue and lets the workers drain in the background.
pub struct WorkerPool {
    size: usize,
    queue: Option<ChannelJobQueue>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn start(size: usize) -> Self {
        Self::with_queue_depth(size, size.max(1) * 4)
    }

    pub fn with_queue_depth(size: usize, queue_depth: usize) -> Self {
        let size = size.max(1);
        let (sender, receiver) = mpsc::channel::<Job>(queue_depth.max(1));
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| tokio::spawn(Worker::new(id, receiver.clone()).run()))
            .collect();

        info!(workers = size, "worker pool started");
        Self {
            size,
            queue: Some(ChannelJobQueue::new(sender)),
            workers,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Queues `task`; waits only if the queue is full.
    pub async fn submit<F, T>(&self, task: F) -> Result<TaskHandle<T>, PoolError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let queue = self.queue.as_ref().ok_or(PoolError::Closed)?;
        let (sender, receiver) = oneshot::channel();

        let job: Job = Box::pin(async move {
            // The caller may have stopped waiting; nothing to do then.
            let _ = sender.send(task.await);
        });
        queue.enqueue(job).await?;

        Ok(TaskHandle { receiver })
    }

    pub async fn shutdown(mut self) {
        self.queue.take();
        let workers = std::mem::take(&mut self.workers);
        for worker in workers {
            let _ = worker.await;
        }
        info!(workers = self.size, "worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the sender ends each worker loop once the queue drains.
        self.queue.take();
    }
}

/// Result slot of a submitted task.
pub struct TaskHandle<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Waits for the task. A task that panicked yields `TaskAborted`.
    pub async fn join(self) -> Result<T, PoolError> {
        self.receiver.await.map_err(|_| PoolError::TaskAborted)
    }
}
