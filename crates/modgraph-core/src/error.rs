//! Error types for record validation and body analysis.

use thiserror::Error;

/// Problems with a record handed over by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A key field needed to build the node identifier is empty.
    #[error("{kind} record is missing required field `{field}`")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    /// A string could not be mapped onto one of our enums.
    #[error("unknown {what} `{value}`")]
    UnknownValue { what: &'static str, value: String },
}

impl RecordError {
    pub(crate) fn missing(kind: &'static str, field: &'static str) -> Self {
        Self::MissingField { kind, field }
    }
}

/// Errors raised while analyzing method bodies.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The Java grammar could not be loaded into the parser.
    #[error("Failed to load Java grammar: {0}")]
    Language(String),

    /// Tree-sitter produced no tree for the input.
    #[error("Tree-sitter returned no tree")]
    NoTree,
}
