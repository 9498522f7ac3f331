use thiserror::Error;

/// Central error type for studio-intent operations.
///
/// Lookups of missing graph entities are not errors: they come back as
/// `Option`/`bool`. Classification never errors either; unmatched input
/// degrades to a low-confidence intent.
#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Duplicate node ID: {0}")]
    DuplicateNode(String),

    #[error("Duplicate relationship ID: {0}")]
    DuplicateRelationship(String),

    #[error("Strategy not found: {0}")]
    StrategyNotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for studio-intent results.
pub type StudioResult<T> = Result<T, StudioError>;
