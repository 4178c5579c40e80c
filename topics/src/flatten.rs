//! Converts a merged hierarchy into dotted-id records and back.
//!
//! Ids are assigned in pre-order: top-level nodes are `1, 2, …` and the
//! children of node `p` are `p.1, p.2, …`. A node's `subtopics` and
//! `subsubtopics` are numbered with independent counters under the same
//! parent id, so if both are present their ids can collide. The validator
//! rejects such nodes before they get here.

use crate::validate::wire_weight;
use doctopic_core::model::{FlatTopicRecord, TopicNode};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

const CHILD_KEYS: [&str; 2] = ["subtopics", "subsubtopics"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlattenError {
    #[error("{path} is not a list")]
    NotASequence { path: String },
    #[error("{path} is not an object")]
    NotAnObject { path: String },
    #[error("{path} has no name")]
    MissingName { path: String },
    #[error("record {id} refers to unknown parent {parent}")]
    OrphanRecord { id: String, parent: String },
}

pub fn flatten(topics: &[TopicNode]) -> Vec<FlatTopicRecord> {
    let mut records = Vec::with_capacity(topics.iter().map(TopicNode::node_count).sum());
    flatten_into(topics, "", &mut records);
    records
}

fn flatten_into(nodes: &[TopicNode], parent: &str, out: &mut Vec<FlatTopicRecord>) {
    for (i, node) in nodes.iter().enumerate() {
        let id = child_id(parent, i);
        out.push(FlatTopicRecord {
            id: id.clone(),
            parent: parent.to_string(),
            name: node.name.clone(),
            value: node.value,
            citation: node.citation.clone(),
            pages: node.pages.clone(),
        });
        flatten_into(&node.subtopics, &id, out);
        flatten_into(&node.subsubtopics, &id, out);
    }
}

/// Flattens an untyped `topics` array. Missing weights, citations and
/// pages default to zero and empty strings; anything that is not a list of
/// named objects fails with the path of the offending value.
pub fn flatten_value(topics: &Value) -> Result<Vec<FlatTopicRecord>, FlattenError> {
    let mut records = Vec::new();
    flatten_value_into(topics, "topics", "", &mut records)?;
    Ok(records)
}

fn flatten_value_into(
    nodes: &Value,
    path: &str,
    parent: &str,
    out: &mut Vec<FlatTopicRecord>,
) -> Result<(), FlattenError> {
    let nodes = nodes.as_array().ok_or_else(|| FlattenError::NotASequence {
        path: path.to_string(),
    })?;

    for (i, node) in nodes.iter().enumerate() {
        let here = format!("{path}[{i}]");
        let fields = node.as_object().ok_or_else(|| FlattenError::NotAnObject {
            path: here.clone(),
        })?;
        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| FlattenError::MissingName { path: here.clone() })?;

        let id = child_id(parent, i);
        out.push(FlatTopicRecord {
            id: id.clone(),
            parent: parent.to_string(),
            name: name.to_string(),
            value: wire_weight(fields).unwrap_or(0.0),
            citation: match string_field(fields.get("citation")) {
                citation if citation.is_empty() => string_field(fields.get("value")),
                citation => citation,
            },
            pages: string_field(fields.get("pages")),
        });

        for key in CHILD_KEYS {
            match fields.get(key) {
                None | Some(Value::Null) => {}
                Some(children) => {
                    flatten_value_into(children, &format!("{here}.{key}"), &id, out)?
                }
            }
        }
    }
    Ok(())
}

fn string_field(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_string()
}

fn child_id(parent: &str, index: usize) -> String {
    if parent.is_empty() {
        (index + 1).to_string()
    } else {
        format!("{parent}.{}", index + 1)
    }
}

/// Rebuilds the hierarchy from records using their `parent` links, in
/// record order. Children of top-level records become `subtopics`, deeper
/// children `subsubtopics`.
pub fn unflatten(records: &[FlatTopicRecord]) -> Result<Vec<TopicNode>, FlattenError> {
    let mut children: HashMap<&str, Vec<&FlatTopicRecord>> = HashMap::new();
    let ids: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();

    for record in records {
        if !record.parent.is_empty() && !ids.contains(record.parent.as_str()) {
            return Err(FlattenError::OrphanRecord {
                id: record.id.clone(),
                parent: record.parent.clone(),
            });
        }
        children.entry(record.parent.as_str()).or_default().push(record);
    }

    Ok(build_level(&children, "", 1))
}

fn build_level(
    children: &HashMap<&str, Vec<&FlatTopicRecord>>,
    parent: &str,
    level: usize,
) -> Vec<TopicNode> {
    let Some(records) = children.get(parent) else {
        return Vec::new();
    };

    records
        .iter()
        .map(|record| {
            let node = TopicNode::leaf(
                record.name.clone(),
                record.value,
                record.citation.clone(),
                record.pages.clone(),
            );
            let nested = build_level(children, &record.id, level + 1);
            if level == 1 {
                node.with_subtopics(nested)
            } else {
                node.with_subsubtopics(nested)
            }
        })
        .collect()
}
