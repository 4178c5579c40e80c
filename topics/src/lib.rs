//! Topic extraction over a segmented document: chunk partitioning, context
//! retrieval, per-chunk analysis, a single merge and dotted-id flattening.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod flatten;
pub mod merger;
pub mod normalize;
pub mod partition;
pub mod pipeline;
pub mod reply;
pub mod retrieve;
pub mod validate;

pub use analyzer::{ChunkAnalysis, ChunkSource, HierarchyAnalyzer};
pub use config::PipelineConfig;
pub use error::{ChunkError, MergeError, PipelineError, ReplyError};
pub use flatten::{flatten, flatten_value, unflatten, FlattenError};
pub use merger::HierarchyMerger;
pub use normalize::{normalize, NormalizeError};
pub use partition::{chunk_document, partition, DocumentChunk};
pub use pipeline::{PipelineOutput, RunReport, TopicPipeline};
pub use retrieve::ContextRetriever;
pub use validate::{ResponseValidator, ValidationError};
