//! Error types for the graph layer.

use modgraph_core::{AnalyzeError, RecordError};
use thiserror::Error;

/// Errors for programmer mistakes and persistence failures.
///
/// Expected absences (unknown ids, unreachable targets) are not errors;
/// queries return empty results for them.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unknown edge kind `{0}`")]
    UnknownEdgeKind(String),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
