pub mod graph;
pub mod seed;

pub use graph::{
    Direction, GraphQuery, GraphStore, InMemoryGraphStore, RelatedNodeFilter,
    RelationshipConstraint, RelationshipFilter, TraversalResult,
};
pub use seed::{seed_concept_graph, SeedStats};
