//! Edge types for the knowledge graph.
//!
//! The graph is a multigraph: the same pair of nodes may be joined by
//! several edges, each with its own kind and attributes.

use crate::error::GraphError;
use modgraph_core::AccessType;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The type of relationship between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// Method calls method.
    Calls,

    /// Class uses another class (field types).
    DependsOn,

    /// Method reads or writes a field.
    Accesses,

    /// Class declares a method or field.
    Declares,

    /// Endpoint is served by a method.
    Handles,

    /// Class implements an interface.
    Implements,

    /// Class extends a class.
    Extends,

    /// Node carries an annotation.
    AnnotatedWith,

    /// Method returns a type.
    Returns,

    /// Method takes a parameter of a type.
    Parameter,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 10] = [
        Self::Calls,
        Self::DependsOn,
        Self::Accesses,
        Self::Declares,
        Self::Handles,
        Self::Implements,
        Self::Extends,
        Self::AnnotatedWith,
        Self::Returns,
        Self::Parameter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calls => "CALLS",
            Self::DependsOn => "DEPENDS_ON",
            Self::Accesses => "ACCESSES",
            Self::Declares => "DECLARES",
            Self::Handles => "HANDLES",
            Self::Implements => "IMPLEMENTS",
            Self::Extends => "EXTENDS",
            Self::AnnotatedWith => "ANNOTATED_WITH",
            Self::Returns => "RETURNS",
            Self::Parameter => "PARAMETER",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = GraphError;

    /// Accepts `CALLS`, `calls`, `depends-on`, `depends_on`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| GraphError::UnknownEdgeKind(s.to_string()))
    }
}

/// An edge in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// The kind of relationship.
    pub kind: EdgeKind,

    /// Read/write tag, only set on ACCESSES edges.
    pub access: Option<AccessType>,

    /// Line in the source body where this edge originates.
    pub line: Option<u32>,
}

impl Edge {
    /// Creates a new edge.
    pub fn new(kind: EdgeKind) -> Self {
        Self {
            kind,
            access: None,
            line: None,
        }
    }

    /// Creates an ACCESSES edge.
    pub fn access(access: AccessType) -> Self {
        Self {
            kind: EdgeKind::Accesses,
            access: Some(access),
            line: None,
        }
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Same kind and access tag; location is ignored.
    pub fn same_relation(&self, other: &Edge) -> bool {
        self.kind == other.kind && self.access == other.access
    }
}

/// A flattened edge for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub access: Option<AccessType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edge_kind() {
        assert_eq!("CALLS".parse::<EdgeKind>().unwrap(), EdgeKind::Calls);
        assert_eq!("depends-on".parse::<EdgeKind>().unwrap(), EdgeKind::DependsOn);
        assert_eq!(
            "annotated_with".parse::<EdgeKind>().unwrap(),
            EdgeKind::AnnotatedWith
        );
    }

    #[test]
    fn test_unknown_edge_kind_is_an_error() {
        let err = "INHERITS".parse::<EdgeKind>().unwrap_err();
        assert!(matches!(err, GraphError::UnknownEdgeKind(ref s) if s == "INHERITS"));
    }

    #[test]
    fn test_same_relation_ignores_line() {
        let a = Edge::access(AccessType::Read).with_line(3);
        let b = Edge::access(AccessType::Read);
        let c = Edge::access(AccessType::Write);
        assert!(a.same_relation(&b));
        assert!(!a.same_relation(&c));
    }
}
