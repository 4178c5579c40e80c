use crate::queue::Job;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info};

pub struct Worker {
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
}

impl Worker {
    pub fn new(id: usize, receiver: Arc<Mutex<mpsc::Receiver<Job>>>) -> Self {
        Self { id, receiver }
    }

    /// Pulls jobs until the queue is closed and drained. Each job runs in
    /// its own task so a panic is contained to that job.
    pub async fn run(self) {
        debug!(worker = self.id, "worker started");
        let mut completed = 0usize;

        loop {
            let job = {
                let mut receiver = self.receiver.lock().await;
                receiver.recv().await
            };
            let Some(job) = job else {
                break;
            };

            if let Err(e) = tokio::spawn(job).await {
                error!(worker = self.id, "job failed: {}", e);
            }
            completed += 1;
        }

        info!(worker = self.id, completed, "worker stopped");
    }
}
