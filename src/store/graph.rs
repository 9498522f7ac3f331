use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StudioError, StudioResult};
use crate::model::graph::{GraphNode, GraphRelationship, Properties, PropertyValue};

// ---------------------------------------------------------------------------
// Filters and queries
// ---------------------------------------------------------------------------

/// Which side of a relationship the anchor node must be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The node is the source.
    Outgoing,
    /// The node is the target.
    Incoming,
    #[default]
    Both,
}

impl Direction {
    fn admits(&self, rel: &GraphRelationship, node_id: &str) -> bool {
        match self {
            Direction::Outgoing => rel.source_id == node_id,
            Direction::Incoming => rel.target_id == node_id,
            Direction::Both => rel.touches(node_id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationshipFilter {
    pub direction: Direction,
    #[serde(rename = "type")]
    pub relationship_type: Option<String>,
}

impl RelationshipFilter {
    pub fn outgoing() -> Self {
        Self {
            direction: Direction::Outgoing,
            ..Default::default()
        }
    }

    pub fn incoming() -> Self {
        Self {
            direction: Direction::Incoming,
            ..Default::default()
        }
    }

    pub fn of_type(mut self, relationship_type: impl Into<String>) -> Self {
        self.relationship_type = Some(relationship_type.into());
        self
    }

    fn admits(&self, rel: &GraphRelationship, node_id: &str) -> bool {
        self.direction.admits(rel, node_id)
            && self
                .relationship_type
                .as_deref()
                .map_or(true, |t| rel.relationship_type == t)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelatedNodeFilter {
    pub direction: Direction,
    pub relationship_type: Option<String>,
    /// Only keep related nodes of this type.
    #[serde(rename = "type")]
    pub node_type: Option<String>,
}

impl RelatedNodeFilter {
    fn relationship_filter(&self) -> RelationshipFilter {
        RelationshipFilter {
            direction: self.direction,
            relationship_type: self.relationship_type.clone(),
        }
    }
}

/// One relationship requirement in a [`GraphQuery`]: the candidate must have
/// at least one related node satisfying it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationshipConstraint {
    pub direction: Direction,
    pub relationship_type: Option<String>,
    pub node_type: Option<String>,
    /// The related node must be exactly this node.
    pub node_id: Option<String>,
}

impl RelationshipConstraint {
    pub fn to_node(node_id: impl Into<String>) -> Self {
        Self {
            node_id: Some(node_id.into()),
            ..Default::default()
        }
    }

    fn related_filter(&self) -> RelatedNodeFilter {
        RelatedNodeFilter {
            direction: self.direction,
            relationship_type: self.relationship_type.clone(),
            node_type: self.node_type.clone(),
        }
    }
}

/// Node query: exact type, exact property values, and relationship
/// constraints, all ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphQuery {
    pub node_type: Option<String>,
    pub properties: Properties,
    pub relationships: Vec<RelationshipConstraint>,
}

impl GraphQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_relationship(mut self, constraint: RelationshipConstraint) -> Self {
        self.relationships.push(constraint);
        self
    }
}

/// Result of a breadth-first traversal.
#[derive(Debug, Clone, Default)]
pub struct TraversalResult {
    /// Nodes discovered, with their depth from the start node.
    pub nodes: Vec<(String, usize)>,
    /// Relationships followed during the search.
    pub relationships: Vec<String>,
}

// ---------------------------------------------------------------------------
// GraphStore trait
// ---------------------------------------------------------------------------

/// Storage for the concept graph.
///
/// Lookups of missing ids return `None`/`false`/empty rather than erroring.
/// Only `get_nodes_by_type` and `execute_query` scan every node.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Insert a node. Fails with `DuplicateNode` if the id is taken.
    async fn create_node(
        &self,
        id: &str,
        node_type: &str,
        properties: Properties,
    ) -> StudioResult<GraphNode>;

    /// Look up a node by id.
    async fn get_node(&self, id: &str) -> StudioResult<Option<GraphNode>>;

    /// Shallow-merge properties into an existing node.
    async fn update_node(&self, id: &str, partial: Properties) -> StudioResult<Option<GraphNode>>;

    /// Remove a node and every relationship touching it.
    async fn delete_node(&self, id: &str) -> StudioResult<bool>;

    /// Insert a relationship. Returns `None` without writing anything if
    /// either endpoint is missing.
    async fn create_relationship(
        &self,
        id: &str,
        source_id: &str,
        target_id: &str,
        relationship_type: &str,
        properties: Properties,
    ) -> StudioResult<Option<GraphRelationship>>;

    /// Look up a relationship by id.
    async fn get_relationship(&self, id: &str) -> StudioResult<Option<GraphRelationship>>;

    /// Shallow-merge properties into an existing relationship. Endpoints and
    /// type never change.
    async fn update_relationship(
        &self,
        id: &str,
        partial: Properties,
    ) -> StudioResult<Option<GraphRelationship>>;

    /// Remove a relationship from the store and from both endpoints' indices.
    async fn delete_relationship(&self, id: &str) -> StudioResult<bool>;

    /// Relationships a node participates in, filtered by direction and type.
    async fn get_node_relationships(
        &self,
        node_id: &str,
        filter: &RelationshipFilter,
    ) -> StudioResult<Vec<GraphRelationship>>;

    /// The node at the other end of each matching relationship, in
    /// relationship order. Parallel relationships yield the same node again.
    async fn get_related_nodes(
        &self,
        node_id: &str,
        filter: &RelatedNodeFilter,
    ) -> StudioResult<Vec<GraphNode>>;

    /// Every node of `node_type`, in creation order.
    async fn get_nodes_by_type(&self, node_type: &str) -> StudioResult<Vec<GraphNode>>;

    /// Nodes matching every clause of `query`, in creation order.
    async fn execute_query(&self, query: &GraphQuery) -> StudioResult<Vec<GraphNode>>;

    /// Breadth-first walk from `start_id` following matching relationships.
    async fn traverse(
        &self,
        start_id: &str,
        filter: &RelationshipFilter,
        max_depth: usize,
    ) -> StudioResult<TraversalResult>;

    /// Number of stored nodes.
    async fn node_count(&self) -> usize;

    /// Number of stored relationships.
    async fn relationship_count(&self) -> usize;

    /// Drop every node and relationship.
    async fn clear(&self);
}

// ---------------------------------------------------------------------------
// InMemoryGraphStore
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct StoredNode {
    /// Insertion sequence; full scans report nodes in creation order.
    seq: u64,
    node: GraphNode,
}

#[derive(Debug, Default)]
struct GraphState {
    nodes: HashMap<String, StoredNode>,
    relationships: HashMap<String, GraphRelationship>,
    /// Relationship ids each node participates in, as either endpoint.
    node_relationships: HashMap<String, Vec<String>>,
    next_seq: u64,
}

impl GraphState {
    fn relationships_of(&self, node_id: &str, filter: &RelationshipFilter) -> Vec<&GraphRelationship> {
        self.node_relationships
            .get(node_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.relationships.get(id))
                    .filter(|rel| filter.admits(rel, node_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn related_nodes(&self, node_id: &str, filter: &RelatedNodeFilter) -> Vec<&GraphNode> {
        let mut related = Vec::new();

        for rel in self.relationships_of(node_id, &filter.relationship_filter()) {
            if let Some(stored) = self.nodes.get(rel.other_endpoint(node_id)) {
                let type_ok = filter
                    .node_type
                    .as_deref()
                    .map_or(true, |t| stored.node.node_type == t);
                if type_ok {
                    related.push(&stored.node);
                }
            }
        }

        related
    }

    fn nodes_in_order(&self) -> Vec<&GraphNode> {
        let mut stored: Vec<&StoredNode> = self.nodes.values().collect();
        stored.sort_by_key(|s| s.seq);
        stored.into_iter().map(|s| &s.node).collect()
    }

    fn unlink(&mut self, node_id: &str, rel_id: &str) {
        if let Some(list) = self.node_relationships.get_mut(node_id) {
            list.retain(|id| id != rel_id);
        }
    }
}

/// In-memory concept graph with a per-node relationship index.
///
/// All state sits behind one async `RwLock`, so a single store can be shared
/// between concurrent translations and HTTP handlers.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    state: RwLock<GraphState>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn create_node(
        &self,
        id: &str,
        node_type: &str,
        properties: Properties,
    ) -> StudioResult<GraphNode> {
        let mut state = self.state.write().await;
        if state.nodes.contains_key(id) {
            return Err(StudioError::DuplicateNode(id.to_string()));
        }

        let node = GraphNode::new(id, node_type, properties);
        let seq = state.next_seq;
        state.next_seq += 1;
        state.nodes.insert(
            id.to_string(),
            StoredNode {
                seq,
                node: node.clone(),
            },
        );
        state.node_relationships.entry(id.to_string()).or_default();
        Ok(node)
    }

    async fn get_node(&self, id: &str) -> StudioResult<Option<GraphNode>> {
        let state = self.state.read().await;
        Ok(state.nodes.get(id).map(|s| s.node.clone()))
    }

    async fn update_node(&self, id: &str, partial: Properties) -> StudioResult<Option<GraphNode>> {
        let mut state = self.state.write().await;
        Ok(state.nodes.get_mut(id).map(|stored| {
            stored.node.merge_properties(partial);
            stored.node.clone()
        }))
    }

    async fn delete_node(&self, id: &str) -> StudioResult<bool> {
        let mut state = self.state.write().await;
        if state.nodes.remove(id).is_none() {
            return Ok(false);
        }

        let rel_ids = state.node_relationships.remove(id).unwrap_or_default();
        for rel_id in &rel_ids {
            if let Some(rel) = state.relationships.remove(rel_id) {
                let other = rel.other_endpoint(id).to_string();
                if other != id {
                    state.unlink(&other, rel_id);
                }
            }
        }

        debug!(node_id = id, cascaded = rel_ids.len(), "deleted node");
        Ok(true)
    }

    async fn create_relationship(
        &self,
        id: &str,
        source_id: &str,
        target_id: &str,
        relationship_type: &str,
        properties: Properties,
    ) -> StudioResult<Option<GraphRelationship>> {
        let mut state = self.state.write().await;
        if state.relationships.contains_key(id) {
            return Err(StudioError::DuplicateRelationship(id.to_string()));
        }
        if !state.nodes.contains_key(source_id) || !state.nodes.contains_key(target_id) {
            debug!(
                relationship_id = id,
                source_id, target_id, "relationship endpoint missing; not created"
            );
            return Ok(None);
        }

        let rel = GraphRelationship::new(id, source_id, target_id, relationship_type, properties);
        state.relationships.insert(id.to_string(), rel.clone());
        state
            .node_relationships
            .entry(source_id.to_string())
            .or_default()
            .push(id.to_string());
        if target_id != source_id {
            state
                .node_relationships
                .entry(target_id.to_string())
                .or_default()
                .push(id.to_string());
        }

        Ok(Some(rel))
    }

    async fn get_relationship(&self, id: &str) -> StudioResult<Option<GraphRelationship>> {
        let state = self.state.read().await;
        Ok(state.relationships.get(id).cloned())
    }

    async fn update_relationship(
        &self,
        id: &str,
        partial: Properties,
    ) -> StudioResult<Option<GraphRelationship>> {
        let mut state = self.state.write().await;
        Ok(state.relationships.get_mut(id).map(|rel| {
            rel.merge_properties(partial);
            rel.clone()
        }))
    }

    async fn delete_relationship(&self, id: &str) -> StudioResult<bool> {
        let mut state = self.state.write().await;
        match state.relationships.remove(id) {
            Some(rel) => {
                state.unlink(&rel.source_id, id);
                state.unlink(&rel.target_id, id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_node_relationships(
        &self,
        node_id: &str,
        filter: &RelationshipFilter,
    ) -> StudioResult<Vec<GraphRelationship>> {
        let state = self.state.read().await;
        Ok(state
            .relationships_of(node_id, filter)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn get_related_nodes(
        &self,
        node_id: &str,
        filter: &RelatedNodeFilter,
    ) -> StudioResult<Vec<GraphNode>> {
        let state = self.state.read().await;
        Ok(state
            .related_nodes(node_id, filter)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn get_nodes_by_type(&self, node_type: &str) -> StudioResult<Vec<GraphNode>> {
        let state = self.state.read().await;
        Ok(state
            .nodes_in_order()
            .into_iter()
            .filter(|n| n.node_type == node_type)
            .cloned()
            .collect())
    }

    async fn execute_query(&self, query: &GraphQuery) -> StudioResult<Vec<GraphNode>> {
        let state = self.state.read().await;

        let results = state
            .nodes_in_order()
            .into_iter()
            .filter(|node| {
                query
                    .node_type
                    .as_deref()
                    .map_or(true, |t| node.node_type == t)
            })
            .filter(|node| {
                query
                    .properties
                    .iter()
                    .all(|(key, value)| node.properties.get(key) == Some(value))
            })
            .filter(|node| {
                query.relationships.iter().all(|constraint| {
                    state
                        .related_nodes(&node.id, &constraint.related_filter())
                        .iter()
                        .any(|related| {
                            constraint
                                .node_id
                                .as_deref()
                                .map_or(true, |id| related.id == id)
                        })
                })
            })
            .cloned()
            .collect();

        Ok(results)
    }

    async fn traverse(
        &self,
        start_id: &str,
        filter: &RelationshipFilter,
        max_depth: usize,
    ) -> StudioResult<TraversalResult> {
        let state = self.state.read().await;
        if !state.nodes.contains_key(start_id) {
            return Err(StudioError::NodeNotFound(start_id.to_string()));
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut result = TraversalResult::default();
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();

        queue.push_back((start_id.to_string(), 0));
        visited.insert(start_id.to_string());

        while let Some((current_id, depth)) = queue.pop_front() {
            if depth >= max_depth {
                result.nodes.push((current_id, depth));
                continue;
            }

            for rel in state.relationships_of(&current_id, filter) {
                result.relationships.push(rel.id.clone());
                let next = rel.other_endpoint(&current_id);
                if visited.insert(next.to_string()) {
                    queue.push_back((next.to_string(), depth + 1));
                }
            }
            result.nodes.push((current_id, depth));
        }

        Ok(result)
    }

    async fn node_count(&self) -> usize {
        self.state.read().await.nodes.len()
    }

    async fn relationship_count(&self) -> usize {
        self.state.read().await.relationships.len()
    }

    async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = GraphState::default();
    }
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
