use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::StudioError;
use crate::model::graph::GraphNode;
use crate::model::intent::{
    CommandDomain, Intent, IntentType, TranslationContext, TranslationResult,
};
use crate::store::graph::{GraphQuery, GraphStore, RelationshipConstraint};
use crate::store::seed::INTENT;
use crate::translate::pattern::PatternMatchingStrategy;
use crate::translate::{guarded_lookup, TranslationStrategy, CONTEXT_AWARE};

/// Below this, a pattern match is replaced by the most recent intent.
pub const OVERRIDE_THRESHOLD: f64 = 0.5;
pub const OVERRIDE_BOOST: f64 = 0.2;
pub const OVERRIDE_CAP: f64 = 0.7;
pub const REINFORCE_BOOST: f64 = 0.1;
pub const REINFORCE_CAP: f64 = 0.9;
pub const RESPOND_CONFIDENCE: f64 = 0.4;

/// Pattern matching adjusted by conversation history and the selected asset.
pub struct ContextAwareStrategy {
    pattern: PatternMatchingStrategy,
    graph: Arc<dyn GraphStore>,
    graph_timeout: Duration,
}

impl ContextAwareStrategy {
    pub fn new(graph: Arc<dyn GraphStore>, graph_timeout: Duration) -> Self {
        Self {
            pattern: PatternMatchingStrategy::new(),
            graph,
            graph_timeout,
        }
    }

    /// Lean on the most recent intent: take it over when the pattern match is
    /// weak, reinforce it when the pattern match agrees.
    fn apply_history(&self, intent: Intent, context: &TranslationContext) -> Intent {
        let Some(recent) = context.most_recent_intent() else {
            return intent;
        };

        if intent.confidence < OVERRIDE_THRESHOLD {
            let confidence = (intent.confidence + OVERRIDE_BOOST).min(OVERRIDE_CAP);
            debug!(from = %intent.intent_type, to = %recent.intent_type, "overriding weak match with recent intent");
            intent
                .with_type(recent.intent_type, recent.domain)
                .with_confidence(confidence)
        } else if intent.intent_type == recent.intent_type {
            let confidence = (intent.confidence + REINFORCE_BOOST).min(REINFORCE_CAP);
            intent.with_confidence(confidence)
        } else {
            intent
        }
    }

    /// Nodes linked to the selected asset: intent nodes for this exact type
    /// first, then anything else in the intent's domain.
    async fn asset_context(&self, intent: &Intent, asset_id: &str) -> Vec<GraphNode> {
        let same_type = GraphQuery::new()
            .of_type(INTENT)
            .with_property("intentType", intent.intent_type.as_str())
            .with_relationship(RelationshipConstraint::to_node(asset_id));
        let same_domain = GraphQuery::new()
            .with_property("domain", intent.domain.as_str())
            .with_relationship(RelationshipConstraint::to_node(asset_id));

        let lookup = async {
            let mut nodes = self.graph.execute_query(&same_type).await?;
            for node in self.graph.execute_query(&same_domain).await? {
                if !nodes.iter().any(|n| n.id == node.id) {
                    nodes.push(node);
                }
            }
            Ok::<_, StudioError>(nodes)
        };

        guarded_lookup(CONTEXT_AWARE, self.graph_timeout, lookup)
            .await
            .unwrap_or_default()
    }
}

#[async_trait]
impl TranslationStrategy for ContextAwareStrategy {
    fn name(&self) -> &str {
        CONTEXT_AWARE
    }

    async fn translate(&self, input: &str, context: &TranslationContext) -> TranslationResult {
        let intent = self.apply_history(self.pattern.classify(input), context);

        let related = match context.selected_asset_id.as_deref() {
            Some(asset_id) => self.asset_context(&intent, asset_id).await,
            None => Vec::new(),
        };

        // never outranks the intent it accompanies
        let respond = Intent::new(
            IntentType::Respond,
            CommandDomain::General,
            intent.parameters.clone(),
            RESPOND_CONFIDENCE.min(intent.confidence),
            input,
        );

        TranslationResult::from_intent(intent)
            .with_related_nodes(related)
            .with_alternative(respond)
    }
}
