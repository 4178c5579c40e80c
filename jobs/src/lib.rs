pub mod pool;
pub mod queue;
pub mod worker;

pub use pool::{TaskHandle, WorkerPool};
pub use queue::{ChannelJobQueue, Job, JobQueue, PoolError};
