use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::StudioResult;
use crate::model::graph::{GraphNode, Properties};
use crate::model::intent::{CommandDomain, Intent, IntentType, TranslationContext, TranslationResult};
use crate::parse::intent::classify_intent;
use crate::store::graph::{GraphStore, RelationshipFilter};
use crate::store::seed::{CONCEPT, DOMAIN, INTENT, PARAMETER};
use crate::translate::{guarded_lookup, TranslationStrategy, GRAPH_ENHANCED};

/// Hints only apply below this confidence.
pub const HINT_THRESHOLD: f64 = 0.8;
pub const HINT_BOOST: f64 = 0.1;
pub const HINT_CAP: f64 = 0.85;

/// Legacy node type some graphs use for parameter nodes.
const VALUE: &str = "value";

/// Scoring classifier refined by concepts found in the graph.
pub struct GraphEnhancedStrategy {
    graph: Arc<dyn GraphStore>,
    graph_timeout: Duration,
    max_depth: usize,
}

impl GraphEnhancedStrategy {
    pub fn new(graph: Arc<dyn GraphStore>, graph_timeout: Duration) -> Self {
        Self {
            graph,
            graph_timeout,
            max_depth: 1,
        }
    }

    /// How far past a matched concept to follow outgoing relationships.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Concept nodes whose keyword occurs in the input, each followed by the
    /// nodes reachable from it. Every node appears once.
    async fn related_concepts(&self, input: &str) -> StudioResult<Vec<GraphNode>> {
        let lowered = input.to_lowercase();
        let concepts = self.graph.get_nodes_by_type(CONCEPT).await?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut related = Vec::new();
        for concept in concepts {
            let keyword = concept.text("keyword").or_else(|| concept.text("name"));
            let Some(keyword) = keyword.map(str::to_lowercase) else {
                continue;
            };
            if keyword.is_empty() || !lowered.contains(&keyword) {
                continue;
            }

            let reached = self
                .graph
                .traverse(&concept.id, &RelationshipFilter::outgoing(), self.max_depth)
                .await?;
            for (id, _depth) in reached.nodes {
                if !seen.insert(id.clone()) {
                    continue;
                }
                if id == concept.id {
                    related.push(concept.clone());
                } else if let Some(node) = self.graph.get_node(&id).await? {
                    related.push(node);
                }
            }
        }
        Ok(related)
    }
}

/// Type and domain suggested by the first intent or domain node.
fn first_hint(related: &[GraphNode]) -> Option<(Option<IntentType>, CommandDomain)> {
    related.iter().find_map(|node| match node.node_type.as_str() {
        INTENT => {
            let intent_type: IntentType = node.text("intentType")?.parse().ok()?;
            let domain = node
                .text("domain")
                .and_then(|d| d.parse().ok())
                .unwrap_or_else(|| intent_type.domain());
            Some((Some(intent_type), domain))
        }
        DOMAIN => {
            let domain = node.text("name")?.parse().ok()?;
            Some((None, domain))
        }
        _ => None,
    })
}

/// Fold graph knowledge into the classifier's intent. Parameters found in the
/// input win over parameters stored in the graph.
fn apply_hints(intent: Intent, related: &[GraphNode]) -> Intent {
    let mut parameters: Properties = intent.parameters.clone();
    for node in related {
        if node.node_type != PARAMETER && node.node_type != VALUE {
            continue;
        }
        if let (Some(key), Some(value)) = (node.text("key"), node.property("value")) {
            parameters
                .entry(key.to_string())
                .or_insert_with(|| value.clone());
        }
    }
    let intent = intent.with_parameters(parameters);

    if intent.confidence >= HINT_THRESHOLD {
        return intent;
    }
    let Some((intent_type, domain)) = first_hint(related) else {
        return intent;
    };

    let confidence = (intent.confidence + HINT_BOOST).min(HINT_CAP);
    debug!(
        from = %intent.intent_type,
        to = ?intent_type,
        %domain,
        confidence,
        "applying graph hint"
    );
    let intent = match intent_type {
        Some(t) => intent.with_type(t, domain),
        None => intent.with_domain(domain),
    };
    intent.with_confidence(confidence)
}

#[async_trait]
impl TranslationStrategy for GraphEnhancedStrategy {
    fn name(&self) -> &str {
        GRAPH_ENHANCED
    }

    async fn translate(&self, input: &str, _context: &TranslationContext) -> TranslationResult {
        let intent = classify_intent(input);

        let related = guarded_lookup(GRAPH_ENHANCED, self.graph_timeout, self.related_concepts(input))
            .await
            .unwrap_or_default();
        if related.is_empty() {
            return TranslationResult::from_intent(intent);
        }

        TranslationResult::from_intent(apply_hints(intent, &related)).with_related_nodes(related)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::graph::{properties, Properties, PropertyValue};
    use crate::store::graph::test_support::{FailingGraphStore, SlowGraphStore};
    use crate::store::graph::InMemoryGraphStore;
    use crate::store::seed::{concept_node_id, seed_concept_graph};

    const TIMEOUT: Duration = Duration::from_millis(250);

    async fn seeded() -> GraphEnhancedStrategy {
        let graph = Arc::new(InMemoryGraphStore::new());
        seed_concept_graph(graph.as_ref()).await.unwrap();
        GraphEnhancedStrategy::new(graph, TIMEOUT)
    }

    #[tokio::test]
    async fn test_concept_hint_overrides_weak_classification() {
        let strategy = seeded().await;
        let result = strategy
            .translate("paint a sunset", &TranslationContext::default())
            .await;

        // classifier alone: unknown at 0.3
        assert_eq!(result.intent.intent_type, IntentType::StyleApplyTheme);
        assert_eq!(result.intent.domain, CommandDomain::Styling);
        assert!((result.confidence - 0.4).abs() < 1e-9);
        assert_eq!(
            result.parameters.get("palette"),
            Some(&PropertyValue::from("warm"))
        );
        assert_eq!(result.related_nodes[0].id, concept_node_id("sunset"));
    }

    #[tokio::test]
    async fn test_no_concept_matches_plain_classifier() {
        let strategy = seeded().await;
        let input = "draw a red circle";
        let result = strategy.translate(input, &TranslationContext::default()).await;
        assert_eq!(result.intent, classify_intent(input));
        assert!(result.related_nodes.is_empty());
    }

    #[tokio::test]
    async fn test_strong_classification_keeps_type() {
        let strategy = seeded().await;
        // scores well on its own, so only parameters are merged
        let result = strategy
            .translate("draw a circle square triangle star logo", &TranslationContext::default())
            .await;
        assert_eq!(result.intent.intent_type, IntentType::DrawShape);
        assert!(result.confidence >= HINT_THRESHOLD);
        assert_eq!(
            result.parameters.get("target"),
            Some(&PropertyValue::from("logo"))
        );
    }

    #[tokio::test]
    async fn test_domain_hint_keeps_type() {
        let graph = Arc::new(InMemoryGraphStore::new());
        graph
            .create_node("c", CONCEPT, properties([("name", "Brochure")]))
            .await
            .unwrap();
        graph
            .create_node("d", DOMAIN, properties([("name", "website")]))
            .await
            .unwrap();
        graph
            .create_node("v", VALUE, properties([("key", "pages"), ("value", "3")]))
            .await
            .unwrap();
        graph
            .create_relationship("r1", "c", "d", "belongs_to", Properties::new())
            .await
            .unwrap();
        graph
            .create_relationship("r2", "c", "v", "has_parameter", Properties::new())
            .await
            .unwrap();

        let result = GraphEnhancedStrategy::new(graph, TIMEOUT)
            .translate("print a brochure", &TranslationContext::default())
            .await;
        assert_eq!(result.intent.intent_type, IntentType::Unknown);
        assert_eq!(result.intent.domain, CommandDomain::Website);
        assert!((result.confidence - 0.4).abs() < 1e-9);
        assert_eq!(result.parameters.get("pages"), Some(&PropertyValue::from("3")));
    }

    #[tokio::test]
    async fn test_depth_zero_finds_only_concepts() {
        let graph = Arc::new(InMemoryGraphStore::new());
        seed_concept_graph(graph.as_ref()).await.unwrap();
        let result = GraphEnhancedStrategy::new(graph, TIMEOUT)
            .with_max_depth(0)
            .translate("paint a sunset", &TranslationContext::default())
            .await;
        assert_eq!(result.intent.intent_type, IntentType::Unknown);
        assert_eq!(result.related_nodes.len(), 1);
    }

    #[tokio::test]
    async fn test_graph_failure_falls_back_to_classifier() {
        let strategy = GraphEnhancedStrategy::new(Arc::new(FailingGraphStore), TIMEOUT);
        let result = strategy
            .translate("paint a sunset", &TranslationContext::default())
            .await;
        assert_eq!(result.intent.intent_type, IntentType::Unknown);
        assert_eq!(result.confidence, 0.3);
        assert!(result.related_nodes.is_empty());
    }

    #[tokio::test]
    async fn test_slow_graph_falls_back_to_classifier() {
        let inner = InMemoryGraphStore::new();
        seed_concept_graph(&inner).await.unwrap();
        let graph = Arc::new(SlowGraphStore::new(inner, Duration::from_millis(200)));

        let result = GraphEnhancedStrategy::new(graph, Duration::from_millis(1))
            .translate("paint a sunset", &TranslationContext::default())
            .await;
        assert_eq!(result.intent.intent_type, IntentType::Unknown);
        assert_eq!(result.confidence, 0.3);
        assert!(result.parameters.get("palette").is_none());
        assert!(result.related_nodes.is_empty());
    }
}
