//! Weight repair applied to model replies before validation. Every function
//! here returns a new tree; the input is never modified.

use crate::validate::weights_match;
use doctopic_core::config::WeightStrategy;
use doctopic_core::model::{TopicNode, TopicTree};
use thiserror::Error;

pub const TOP_LEVEL_TOTAL: f64 = 100.0;

/// Scaled weights are snapped to this many steps per unit.
const WEIGHT_STEPS: f64 = 1e12;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("top-level weights sum to {0}; cannot rescale to {TOP_LEVEL_TOTAL}")]
    NonPositiveTotal(f64),
}

pub fn normalize(tree: &TopicTree, strategy: WeightStrategy) -> Result<TopicTree, NormalizeError> {
    match strategy {
        WeightStrategy::Rescale => rescale(tree),
        WeightStrategy::CitationLength => Ok(weight_by_citation_length(tree)),
    }
}

/// Scales every top-level subtree by `100 / sum` so the top level totals
/// 100 and nested sums keep matching their parents. A tree that already
/// totals 100 at two decimals is returned unchanged.
pub fn rescale(tree: &TopicTree) -> Result<TopicTree, NormalizeError> {
    let total = tree.total_weight();
    if tree.is_empty() || weights_match(total, TOP_LEVEL_TOTAL) {
        return Ok(tree.clone());
    }
    if !total.is_finite() || total <= 0.0 {
        return Err(NormalizeError::NonPositiveTotal(total));
    }

    let factor = TOP_LEVEL_TOTAL / total;
    Ok(TopicTree::new(
        tree.topics.iter().map(|t| scale_subtree(t, factor)).collect(),
    ))
}

fn scale_subtree(node: &TopicNode, factor: f64) -> TopicNode {
    TopicNode {
        name: node.name.clone(),
        value: snap(node.value * factor),
        citation: node.citation.clone(),
        pages: node.pages.clone(),
        subtopics: node.subtopics.iter().map(|c| scale_subtree(c, factor)).collect(),
        subsubtopics: node
            .subsubtopics
            .iter()
            .map(|c| scale_subtree(c, factor))
            .collect(),
    }
}

fn snap(value: f64) -> f64 {
    (value * WEIGHT_STEPS).round() / WEIGHT_STEPS
}

/// Re-derives every weight from citation length: the top level shares 100
/// and each child list shares its parent's weight, in proportion to the
/// number of words in each sibling's citation. Siblings with no citation
/// words fall back to their reported weights, then to an even split.
pub fn weight_by_citation_length(tree: &TopicTree) -> TopicTree {
    TopicTree::new(redistribute(&tree.topics, TOP_LEVEL_TOTAL))
}

fn redistribute(siblings: &[TopicNode], budget: f64) -> Vec<TopicNode> {
    siblings
        .iter()
        .zip(shares(siblings))
        .map(|(node, share)| {
            let value = budget * share;
            TopicNode {
                name: node.name.clone(),
                value,
                citation: node.citation.clone(),
                pages: node.pages.clone(),
                subtopics: redistribute(&node.subtopics, value),
                subsubtopics: redistribute(&node.subsubtopics, value),
            }
        })
        .collect()
}

fn shares(siblings: &[TopicNode]) -> Vec<f64> {
    let words: Vec<f64> = siblings
        .iter()
        .map(|n| n.citation.split_whitespace().count() as f64)
        .collect();
    if let Some(shares) = proportions(&words) {
        return shares;
    }

    let reported: Vec<f64> = siblings
        .iter()
        .map(|n| if n.value.is_finite() { n.value.max(0.0) } else { 0.0 })
        .collect();
    proportions(&reported)
        .unwrap_or_else(|| vec![1.0 / siblings.len() as f64; siblings.len()])
}

fn proportions(amounts: &[f64]) -> Option<Vec<f64>> {
    let total: f64 = amounts.iter().sum();
    (total > 0.0).then(|| amounts.iter().map(|a| a / total).collect())
}
