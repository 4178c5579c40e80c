use doctopic_core::config::WeightStrategy;
use doctopic_core::model::{TopicNode, TopicTree};
use proptest::prelude::*;
use topics::normalize::rescale;
use topics::{flatten, normalize, partition, unflatten, ResponseValidator};

fn name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Z][a-z]{0,8}").unwrap()
}

fn weight() -> impl Strategy<Value = f64> {
    (1u32..1000).prop_map(|w| f64::from(w) / 10.0)
}

/// Parent weight is the sum of its children, so every generated tree is
/// internally consistent below the top level.
fn with_children(name: String, own: f64, children: Vec<TopicNode>, nested: bool) -> TopicNode {
    if children.is_empty() {
        return TopicNode::leaf(name, own, "quoted line", "Page 1");
    }
    let total = children.iter().map(|c| c.value).sum();
    let node = TopicNode::leaf(name, total, "quoted line", "Page 1");
    if nested {
        node.with_subsubtopics(children)
    } else {
        node.with_subtopics(children)
    }
}

fn subsubtopic() -> impl Strategy<Value = TopicNode> {
    (name(), weight()).prop_map(|(name, w)| TopicNode::leaf(name, w, "quoted line", "Page 2"))
}

fn subtopic() -> impl Strategy<Value = TopicNode> {
    (name(), weight(), proptest::collection::vec(subsubtopic(), 0..3))
        .prop_map(|(name, w, children)| with_children(name, w, children, true))
}

fn topic() -> impl Strategy<Value = TopicNode> {
    (name(), weight(), proptest::collection::vec(subtopic(), 0..4))
        .prop_map(|(name, w, children)| with_children(name, w, children, false))
}

fn tree() -> impl Strategy<Value = TopicTree> {
    proptest::collection::vec(topic(), 1..6).prop_map(TopicTree::new)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn partition_covers_input_in_order(n in 0usize..200, fan_out in 1usize..20) {
        let items: Vec<usize> = (0..n).collect();
        let groups = partition(&items, fan_out);

        prop_assert_eq!(groups.len(), fan_out);
        let sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();
        let max = sizes.iter().copied().max().unwrap_or(0);
        let min = sizes.iter().copied().min().unwrap_or(0);
        prop_assert!(max - min <= 1);
        prop_assert_eq!(groups.concat(), items);
    }

    #[test]
    fn rescale_totals_hundred_and_is_idempotent(tree in tree()) {
        let once = rescale(&tree).unwrap();
        prop_assert!((once.total_weight() - 100.0).abs() < 1e-9);
        prop_assert_eq!(rescale(&once).unwrap(), once.clone());
        prop_assert!(ResponseValidator::default().validate_tree(&once).is_ok());
    }

    #[test]
    fn citation_length_trees_always_validate(tree in tree()) {
        let weighted = normalize(&tree, WeightStrategy::CitationLength).unwrap();
        prop_assert!((weighted.total_weight() - 100.0).abs() < 1e-9);
        prop_assert!(ResponseValidator::default().validate_tree(&weighted).is_ok());
    }

    #[test]
    fn flatten_then_unflatten_restores_tree(tree in tree()) {
        let records = flatten(&tree.topics);
        prop_assert_eq!(records.len(), tree.node_count());

        let rebuilt = TopicTree::new(unflatten(&records).unwrap());
        prop_assert_eq!(rebuilt.depth(), tree.depth());
        prop_assert_eq!(rebuilt, tree);
    }

    #[test]
    fn off_leaf_is_rejected_beyond_rounding(offset in 0.02f64..5.0) {
        let tree = TopicTree::new(vec![TopicNode::leaf("A", 100.0, "", "").with_subtopics(vec![
            TopicNode::leaf("A1", 50.0, "", ""),
            TopicNode::leaf("A2", 50.0 + offset, "", ""),
        ])]);
        prop_assert!(ResponseValidator::default().validate_tree(&tree).is_err());
    }
}
