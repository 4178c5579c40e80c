//! Structural and arithmetic checks on topic hierarchies.
//!
//! A reply is checked in two passes. [`ResponseValidator::check_shape`]
//! walks the raw JSON so malformed replies are reported with the path of
//! the offending node; [`ResponseValidator::validate_tree`] then checks
//! the weights of the decoded tree.

use doctopic_core::model::{TopicNode, TopicTree};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Levels below the root: topic, subtopic, sub-subtopic.
pub const MAX_DEPTH: usize = 3;

const CHILD_KEYS: [&str; 2] = ["subtopics", "subsubtopics"];
const FLOAT_SLACK: f64 = 1e-9;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("reply is not a JSON object")]
    NotAnObject,
    #[error("reply has no topics field")]
    MissingTopics,
    #[error("topics is not a list")]
    TopicsNotSequence,
    #[error("{path} is not an object")]
    NodeNotObject { path: String },
    #[error("{path} has no name")]
    MissingName { path: String },
    #[error("{path} has no numeric value")]
    MissingWeight { path: String },
    #[error("{path}.{key} is not a list")]
    ChildrenNotSequence { path: String, key: String },
    #[error("{path} nests deeper than {MAX_DEPTH} levels")]
    TooDeep { path: String },
    #[error("{path} has both subtopics and subsubtopics")]
    MixedChildren { path: String },
    #[error("{path} weight {value} is outside [0, {max}]")]
    WeightOutOfRange { path: String, value: f64, max: f64 },
    #[error("{path} children sum to {actual}, expected {expected}")]
    SumMismatch {
        path: String,
        expected: f64,
        actual: f64,
    },
    #[error("reply could not be decoded: {0}")]
    Decode(String),
}

/// True when `a` and `b` agree once rounded to two decimals.
pub fn weights_match(a: f64, b: f64) -> bool {
    (a * 100.0).round() == (b * 100.0).round() || (a - b).abs() < FLOAT_SLACK
}

#[derive(Debug, Clone, Copy)]
pub struct ResponseValidator {
    max_weight: f64,
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self { max_weight: 100.0 }
    }
}

impl ResponseValidator {
    pub fn new(max_weight: f64) -> Self {
        Self { max_weight }
    }

    pub fn check_shape(&self, candidate: &Value) -> Result<(), ValidationError> {
        let root = candidate.as_object().ok_or(ValidationError::NotAnObject)?;
        let topics = root.get("topics").ok_or(ValidationError::MissingTopics)?;
        let topics = topics
            .as_array()
            .ok_or(ValidationError::TopicsNotSequence)?;
        check_node_shapes(topics, "topics", 1)
    }

    /// Shape check followed by conversion into a [`TopicTree`].
    pub fn decode(&self, candidate: &Value) -> Result<TopicTree, ValidationError> {
        self.check_shape(candidate)?;
        TopicTree::deserialize(candidate).map_err(|e| ValidationError::Decode(e.to_string()))
    }

    pub fn validate_tree(&self, tree: &TopicTree) -> Result<(), ValidationError> {
        self.check_nodes(&tree.topics, "topics", 1)
    }

    /// Full check of a raw reply; returns the decoded tree when it passes.
    pub fn validate(&self, candidate: &Value) -> Result<TopicTree, ValidationError> {
        let tree = self.decode(candidate)?;
        self.validate_tree(&tree)?;
        Ok(tree)
    }

    pub fn is_valid_response(&self, candidate: &Value) -> bool {
        self.validate(candidate).is_ok()
    }

    /// `[0, max_weight]`, letting float noise above the bound through.
    fn in_bounds(&self, value: f64) -> bool {
        value.is_finite()
            && value >= 0.0
            && (value <= self.max_weight || weights_match(value, self.max_weight))
    }

    fn check_nodes(
        &self,
        nodes: &[TopicNode],
        path: &str,
        level: usize,
    ) -> Result<(), ValidationError> {
        for (i, node) in nodes.iter().enumerate() {
            let here = format!("{path}[{i}]");
            if level > MAX_DEPTH {
                return Err(ValidationError::TooDeep { path: here });
            }
            if !self.in_bounds(node.value) {
                return Err(ValidationError::WeightOutOfRange {
                    path: here,
                    value: node.value,
                    max: self.max_weight,
                });
            }
            if !node.subtopics.is_empty() && !node.subsubtopics.is_empty() {
                return Err(ValidationError::MixedChildren { path: here });
            }

            for (key, children) in CHILD_KEYS
                .iter()
                .zip([&node.subtopics, &node.subsubtopics])
            {
                if children.is_empty() {
                    continue;
                }
                let actual: f64 = children.iter().map(|c| c.value).sum();
                if !weights_match(actual, node.value) {
                    return Err(ValidationError::SumMismatch {
                        path: here,
                        expected: node.value,
                        actual,
                    });
                }
                self.check_nodes(children, &format!("{here}.{key}"), level + 1)?;
            }
        }
        Ok(())
    }
}

fn check_node_shapes(nodes: &[Value], path: &str, level: usize) -> Result<(), ValidationError> {
    for (i, node) in nodes.iter().enumerate() {
        let here = format!("{path}[{i}]");
        if level > MAX_DEPTH {
            return Err(ValidationError::TooDeep { path: here });
        }
        let fields = node
            .as_object()
            .ok_or_else(|| ValidationError::NodeNotObject { path: here.clone() })?;
        check_fields(fields, &here)?;

        for key in CHILD_KEYS {
            match fields.get(key) {
                None | Some(Value::Null) => {}
                Some(Value::Array(children)) => {
                    check_node_shapes(children, &format!("{here}.{key}"), level + 1)?
                }
                Some(_) => {
                    return Err(ValidationError::ChildrenNotSequence {
                        path: here,
                        key: key.to_string(),
                    })
                }
            }
        }
    }
    Ok(())
}

fn check_fields(fields: &Map<String, Value>, path: &str) -> Result<(), ValidationError> {
    if !matches!(fields.get("name"), Some(Value::String(_))) {
        return Err(ValidationError::MissingName {
            path: path.to_string(),
        });
    }
    if wire_weight(fields).is_none() {
        return Err(ValidationError::MissingWeight {
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Numeric `value`, else numeric `percentage` (older replies put the excerpt
/// text under `value`).
pub(crate) fn wire_weight(fields: &Map<String, Value>) -> Option<f64> {
    fields
        .get("value")
        .and_then(Value::as_f64)
        .or_else(|| fields.get("percentage").and_then(Value::as_f64))
}
