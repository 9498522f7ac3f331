use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// PropertyValue: typed property bag shared by nodes and relationships
// ---------------------------------------------------------------------------

/// A property value stored on a graph node or relationship.
///
/// Serialized untagged, so a property map reads and writes as plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<PropertyValue>),
    Map(BTreeMap<String, PropertyValue>),
}

/// Property map keyed by property name.
pub type Properties = BTreeMap<String, PropertyValue>;

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// True for a non-empty list. Scoring checks parameters this way.
    pub fn is_non_empty_list(&self) -> bool {
        matches!(self, PropertyValue::List(items) if !items.is_empty())
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Number(value as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(values: Vec<T>) -> Self {
        PropertyValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Build a property map from `(key, value)` pairs.
pub fn properties<K, V, I>(pairs: I) -> Properties
where
    K: Into<String>,
    V: Into<PropertyValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Generate a fresh identifier for callers that do not bring their own.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// GraphNode: an entity in the concept graph
// ---------------------------------------------------------------------------

/// A node in the concept graph. `node_type` is a free-form category such as
/// `"concept"`, `"domain"`, `"intent"`, `"parameter"` or `"asset"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Unique within a store.
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub properties: Properties,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, properties: Properties) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            node_type: node_type.into(),
            properties,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Text value of a property, if it holds text.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(PropertyValue::as_str)
    }

    /// Shallow-merge `partial` into the properties and bump `updated_at`.
    pub fn merge_properties(&mut self, partial: Properties) {
        self.properties.extend(partial);
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// GraphRelationship: a directed, typed link between two nodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRelationship {
    pub id: String,
    /// The relationship goes FROM this node.
    pub source_id: String,
    /// The relationship goes TO this node.
    pub target_id: String,
    #[serde(rename = "type")]
    pub relationship_type: String,
    pub properties: Properties,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GraphRelationship {
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relationship_type: impl Into<String>,
        properties: Properties,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            relationship_type: relationship_type.into(),
            properties,
            created_at: now,
            updated_at: now,
        }
    }

    /// The endpoint opposite `node_id`. For a self-loop this is the node itself.
    pub fn other_endpoint(&self, node_id: &str) -> &str {
        if self.source_id == node_id {
            &self.target_id
        } else {
            &self.source_id
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source_id == node_id || self.target_id == node_id
    }

    pub fn merge_properties(&mut self, partial: Properties) {
        self.properties.extend(partial);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_shallow_and_bumps_timestamp() {
        let mut node = GraphNode::new(
            "n1",
            "concept",
            properties([("name", PropertyValue::from("circle")), ("sides", 0i64.into())]),
        );
        let created = node.updated_at;

        node.merge_properties(properties([("sides", 1i64)]));

        assert_eq!(node.text("name"), Some("circle"));
        assert_eq!(node.property("sides").and_then(PropertyValue::as_f64), Some(1.0));
        assert!(node.updated_at >= created);
    }

    #[test]
    fn test_other_endpoint() {
        let rel = GraphRelationship::new("r1", "a", "b", "related", Properties::new());
        assert_eq!(rel.other_endpoint("a"), "b");
        assert_eq!(rel.other_endpoint("b"), "a");
        assert!(rel.touches("a"));
        assert!(!rel.touches("c"));
    }

    #[test]
    fn test_property_values_serialize_as_plain_json() {
        let props = properties([
            ("key", PropertyValue::from("color")),
            ("values", vec!["red", "blue"].into()),
            ("weight", 0.5.into()),
        ]);
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"key": "color", "values": ["red", "blue"], "weight": 0.5})
        );

        let back: Properties = serde_json::from_value(json).unwrap();
        assert_eq!(back, props);
    }
}
