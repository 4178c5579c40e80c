use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A weighted topic with its supporting excerpt. A node normally carries
/// only one of the two child lists; both are "one level down".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireTopicNode")]
pub struct TopicNode {
    pub name: String,
    #[serde(serialize_with = "serialize_weight")]
    pub value: f64,
    pub citation: String,
    pub pages: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtopics: Vec<TopicNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subsubtopics: Vec<TopicNode>,
}

/// Node as models write it. The weight is a numeric `value`, or
/// `percentage` when `value` holds the excerpt text instead.
#[derive(Deserialize)]
struct WireTopicNode {
    name: String,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    percentage: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    citation: String,
    #[serde(default, deserialize_with = "nullable")]
    pages: String,
    #[serde(default, deserialize_with = "nullable")]
    subtopics: Vec<TopicNode>,
    #[serde(default, deserialize_with = "nullable")]
    subsubtopics: Vec<TopicNode>,
}

impl TryFrom<WireTopicNode> for TopicNode {
    type Error = String;

    fn try_from(wire: WireTopicNode) -> Result<Self, Self::Error> {
        let (value, citation) = match wire.value {
            Some(Value::Number(n)) => (n.as_f64(), wire.citation),
            Some(Value::String(text)) if wire.citation.is_empty() => (wire.percentage, text),
            _ => (wire.percentage, wire.citation),
        };
        let value = value.ok_or_else(|| format!("topic {:?} has no numeric weight", wire.name))?;
        Ok(Self {
            name: wire.name,
            value,
            citation,
            pages: wire.pages,
            subtopics: wire.subtopics,
            subsubtopics: wire.subsubtopics,
        })
    }
}

impl TopicNode {
    pub fn leaf(
        name: impl Into<String>,
        value: f64,
        citation: impl Into<String>,
        pages: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value,
            citation: citation.into(),
            pages: pages.into(),
            subtopics: Vec::new(),
            subsubtopics: Vec::new(),
        }
    }

    pub fn with_subtopics(mut self, children: Vec<TopicNode>) -> Self {
        self.subtopics = children;
        self
    }

    pub fn with_subsubtopics(mut self, children: Vec<TopicNode>) -> Self {
        self.subsubtopics = children;
        self
    }

    pub fn has_children(&self) -> bool {
        !self.subtopics.is_empty() || !self.subsubtopics.is_empty()
    }

    /// Children of both kinds, `subtopics` first.
    pub fn children(&self) -> impl Iterator<Item = &TopicNode> {
        self.subtopics.iter().chain(self.subsubtopics.iter())
    }

    /// Number of levels rooted at this node (a leaf is 1).
    pub fn depth(&self) -> usize {
        1 + self.children().map(TopicNode::depth).max().unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        1 + self.children().map(TopicNode::node_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TopicTree {
    pub topics: Vec<TopicNode>,
}

impl TopicTree {
    pub fn new(topics: Vec<TopicNode>) -> Self {
        Self { topics }
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.topics.iter().map(TopicNode::node_count).sum()
    }

    pub fn depth(&self) -> usize {
        self.topics.iter().map(TopicNode::depth).max().unwrap_or(0)
    }

    pub fn total_weight(&self) -> f64 {
        self.topics.iter().map(|t| t.value).sum()
    }
}

/// Display-ready row of a flattened hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatTopicRecord {
    pub id: String,
    pub parent: String,
    pub name: String,
    #[serde(serialize_with = "serialize_weight")]
    pub value: f64,
    pub citation: String,
    pub pages: String,
}

impl FlatTopicRecord {
    /// Number of dotted components in the id (top level is 1).
    pub fn level(&self) -> usize {
        self.id.split('.').count()
    }
}

/// Integral weights are written as JSON integers so `100.0` renders `100`.
pub fn serialize_weight<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Treats an explicit `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integral_weight_serializes_as_integer() {
        let record = FlatTopicRecord {
            id: "1".to_string(),
            parent: String::new(),
            name: "Revenue".to_string(),
            value: 100.0,
            citation: "Revenue grew 20% YoY".to_string(),
            pages: "Page 1, Lines 1-3".to_string(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["value"], json!(100));

        let fractional = FlatTopicRecord {
            value: 33.5,
            ..record
        };
        let value = serde_json::to_value(&fractional).unwrap();
        assert_eq!(value["value"], json!(33.5));
    }

    #[test]
    fn percentage_weight_with_excerpt_in_value() {
        let node: TopicNode = serde_json::from_value(json!({
            "name": "Revenue",
            "percentage": 100,
            "value": "Revenue grew 20% YoY",
            "pages": "Page 1"
        }))
        .unwrap();

        assert_eq!(node.value, 100.0);
        assert_eq!(node.citation, "Revenue grew 20% YoY");
    }

    #[test]
    fn missing_weight_is_a_decode_error() {
        let err = serde_json::from_value::<TopicNode>(json!({"name": "A", "value": "text"}))
            .unwrap_err();
        assert!(err.to_string().contains("no numeric weight"));
    }

    #[test]
    fn optional_fields_default_and_percentage_alias_is_accepted() {
        let node: TopicNode = serde_json::from_value(json!({
            "name": "Market",
            "percentage": 40,
            "citation": null
        }))
        .unwrap();

        assert_eq!(node.value, 40.0);
        assert_eq!(node.citation, "");
        assert_eq!(node.pages, "");
        assert!(!node.has_children());
    }

    #[test]
    fn depth_and_count_cover_both_child_lists() {
        let tree = TopicTree::new(vec![TopicNode::leaf("A", 100.0, "", "")
            .with_subtopics(vec![TopicNode::leaf("A1", 100.0, "", "")
                .with_subsubtopics(vec![TopicNode::leaf("A1a", 100.0, "", "")])])]);

        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn empty_child_lists_are_omitted_on_the_wire() {
        let value = serde_json::to_value(TopicNode::leaf("A", 50.0, "c", "p")).unwrap();
        assert!(value.get("subtopics").is_none());
        assert!(value.get("subsubtopics").is_none());
    }
}
