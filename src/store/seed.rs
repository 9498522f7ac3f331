use tracing::info;

use crate::error::StudioResult;
use crate::model::graph::{properties, Properties, PropertyValue};
use crate::model::intent::{CommandDomain, IntentType};
use crate::store::graph::GraphStore;

// ---------------------------------------------------------------------------
// Starter concept graph
// ---------------------------------------------------------------------------
//
// Layout:
//   concept --suggests--> intent --in_domain--> domain
//   concept --belongs_to--> domain
//   concept --has_parameter--> parameter {key, value}

pub const CONCEPT: &str = "concept";
pub const DOMAIN: &str = "domain";
pub const INTENT: &str = "intent";
pub const PARAMETER: &str = "parameter";

pub const SUGGESTS: &str = "suggests";
pub const BELONGS_TO: &str = "belongs_to";
pub const IN_DOMAIN: &str = "in_domain";
pub const HAS_PARAMETER: &str = "has_parameter";

struct ConceptSeed {
    keyword: &'static str,
    intent: IntentType,
    parameter: Option<(&'static str, &'static str)>,
}

const CONCEPTS: &[ConceptSeed] = &[
    ConceptSeed { keyword: "sunset", intent: IntentType::StyleApplyTheme, parameter: Some(("palette", "warm")) },
    ConceptSeed { keyword: "ocean", intent: IntentType::StyleApplyTheme, parameter: Some(("palette", "cool")) },
    ConceptSeed { keyword: "neon", intent: IntentType::StyleChangeColor, parameter: Some(("palette", "neon")) },
    ConceptSeed { keyword: "logo", intent: IntentType::DrawShape, parameter: Some(("target", "logo")) },
    ConceptSeed { keyword: "doodle", intent: IntentType::DrawFreehand, parameter: Some(("tool", "pencil")) },
    ConceptSeed { keyword: "wiggle", intent: IntentType::AnimateBounce, parameter: Some(("easing", "elastic")) },
    ConceptSeed { keyword: "spinner", intent: IntentType::AnimateRotate, parameter: Some(("iterations", "infinite")) },
    ConceptSeed { keyword: "heartbeat", intent: IntentType::AnimateScale, parameter: Some(("easing", "ease-in-out")) },
    ConceptSeed { keyword: "navbar", intent: IntentType::WebsiteAddComponent, parameter: Some(("component", "navbar")) },
    ConceptSeed { keyword: "landing", intent: IntentType::WebsiteCreatePage, parameter: None },
];

pub fn domain_node_id(domain: CommandDomain) -> String {
    format!("domain:{}", domain)
}

pub fn intent_node_id(intent_type: IntentType) -> String {
    format!("intent:{}", intent_type)
}

pub fn concept_node_id(keyword: &str) -> String {
    format!("concept:{}", keyword)
}

/// Counts of what a seeding run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedStats {
    pub nodes: usize,
    pub relationships: usize,
}

async fn ensure_node(
    store: &dyn GraphStore,
    id: &str,
    node_type: &str,
    props: Properties,
    stats: &mut SeedStats,
) -> StudioResult<()> {
    if store.get_node(id).await?.is_none() {
        store.create_node(id, node_type, props).await?;
        stats.nodes += 1;
    }
    Ok(())
}

async fn ensure_relationship(
    store: &dyn GraphStore,
    source: &str,
    target: &str,
    relationship_type: &str,
    stats: &mut SeedStats,
) -> StudioResult<()> {
    let id = format!("{}:{}->{}", relationship_type, source, target);
    if store.get_relationship(&id).await?.is_none()
        && store
            .create_relationship(&id, source, target, relationship_type, Properties::new())
            .await?
            .is_some()
    {
        stats.relationships += 1;
    }
    Ok(())
}

/// Load the starter concept graph. Safe to call repeatedly; existing nodes
/// and relationships are left alone.
pub async fn seed_concept_graph(store: &dyn GraphStore) -> StudioResult<SeedStats> {
    let mut stats = SeedStats::default();

    for domain in CommandDomain::ALL {
        ensure_node(
            store,
            &domain_node_id(domain),
            DOMAIN,
            properties([("name", domain.as_str())]),
            &mut stats,
        )
        .await?;
    }

    for seed in CONCEPTS {
        let intent_id = intent_node_id(seed.intent);
        let domain_id = domain_node_id(seed.intent.domain());
        ensure_node(
            store,
            &intent_id,
            INTENT,
            properties([
                ("intentType", seed.intent.as_str()),
                ("domain", seed.intent.domain().as_str()),
            ]),
            &mut stats,
        )
        .await?;
        ensure_relationship(store, &intent_id, &domain_id, IN_DOMAIN, &mut stats).await?;

        let concept_id = concept_node_id(seed.keyword);
        ensure_node(
            store,
            &concept_id,
            CONCEPT,
            properties([
                ("keyword", PropertyValue::from(seed.keyword)),
                ("domain", seed.intent.domain().as_str().into()),
            ]),
            &mut stats,
        )
        .await?;

        // Intent first: graph-enhanced translation takes the first hint.
        ensure_relationship(store, &concept_id, &intent_id, SUGGESTS, &mut stats).await?;
        ensure_relationship(store, &concept_id, &domain_id, BELONGS_TO, &mut stats).await?;

        if let Some((key, value)) = seed.parameter {
            let param_id = format!("parameter:{}={}", key, value);
            ensure_node(
                store,
                &param_id,
                PARAMETER,
                properties([("key", key), ("value", value)]),
                &mut stats,
            )
            .await?;
            ensure_relationship(store, &concept_id, &param_id, HAS_PARAMETER, &mut stats).await?;
        }
    }

    info!(
        nodes = stats.nodes,
        relationships = stats.relationships,
        "seeded concept graph"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::graph::{InMemoryGraphStore, RelatedNodeFilter};

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = InMemoryGraphStore::new();
        let first = seed_concept_graph(&store).await.unwrap();
        assert!(first.nodes > 0);
        assert!(first.relationships > 0);

        let nodes = store.node_count().await;
        let second = seed_concept_graph(&store).await.unwrap();
        assert_eq!(second, SeedStats::default());
        assert_eq!(store.node_count().await, nodes);
    }

    #[tokio::test]
    async fn test_concept_links_intent_first() {
        let store = InMemoryGraphStore::new();
        seed_concept_graph(&store).await.unwrap();

        let related = store
            .get_related_nodes(&concept_node_id("sunset"), &RelatedNodeFilter::default())
            .await
            .unwrap();
        let types: Vec<&str> = related.iter().map(|n| n.node_type.as_str()).collect();
        assert_eq!(types, vec![INTENT, DOMAIN, PARAMETER]);
        assert_eq!(related[0].text("intentType"), Some("style.applyTheme"));
        assert_eq!(related[2].text("key"), Some("palette"));
        assert_eq!(related[2].text("value"), Some("warm"));
    }
}
