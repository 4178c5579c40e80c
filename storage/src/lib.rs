pub mod index;
pub mod topic_cache;

pub use index::{IndexError, LinearAnnIndex};
pub use topic_cache::{InMemoryTopicCache, TopicCache, TopicCacheConfig};
