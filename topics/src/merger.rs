use crate::error::MergeError;
use crate::reply::interpret_reply;
use crate::validate::ResponseValidator;
use doctopic_core::config::WeightStrategy;
use doctopic_core::model::TopicTree;
use slm::prompts::{render_merge_prompt, topic_schema};
use slm::Judge;
use std::sync::Arc;
use tracing::info;

/// Reconciles per-chunk trees into one hierarchy with a single judge call.
pub struct HierarchyMerger {
    judge: Arc<dyn Judge>,
    validator: ResponseValidator,
    strategy: WeightStrategy,
    validate_merged: bool,
}

impl HierarchyMerger {
    pub fn new(
        judge: Arc<dyn Judge>,
        validator: ResponseValidator,
        strategy: WeightStrategy,
        validate_merged: bool,
    ) -> Self {
        Self {
            judge,
            validator,
            strategy,
            validate_merged,
        }
    }

    /// Always calls the judge, with `[]` when there are no trees. The
    /// merged reply's shape is always checked; its weights only when
    /// `validate_merged` is set.
    pub async fn merge(&self, trees: &[TopicTree]) -> Result<TopicTree, MergeError> {
        let analyses = serde_json::to_string(trees).map_err(MergeError::Serialize)?;
        let prompt = render_merge_prompt(&analyses);
        let raw = self
            .judge
            .judge(&prompt, &topic_schema())
            .await
            .map_err(MergeError::Judge)?;

        let merged = interpret_reply(&raw, &self.validator, self.strategy, self.validate_merged)?;
        info!(
            inputs = trees.len(),
            topics = merged.topics.len(),
            nodes = merged.node_count(),
            "chunk results merged"
        );
        Ok(merged)
    }
}
