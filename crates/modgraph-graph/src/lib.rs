//! Modgraph Graph - Knowledge graph of a Java codebase
//!
//! This crate holds the typed multigraph of classes, methods, fields,
//! endpoints and annotations, and everything that reads or writes it:
//! ingestion, relationship mining, reachability queries, the bounded
//! summary signature, style classification, architecture and security
//! assessment, and document projection.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with additional indexes for:
//! - Id and name lookups
//! - Per-kind counters and the entry-point set
//! - Call and field-access maps kept in step with the edges
//!
//! # Example
//!
//! ```no_run
//! use modgraph_graph::KnowledgeGraph;
//! use modgraph_core::{AccessType, ClassRecord, FieldRecord, MethodRecord};
//!
//! let mut graph = KnowledgeGraph::new();
//! graph.add_class(ClassRecord::new("Foo", "com.x", "Foo.java"));
//! let bar = graph.add_method(MethodRecord::new("bar", "com.x.Foo"));
//! let baz = graph.add_field(FieldRecord::new("baz", "com.x.Foo", "int"));
//! graph.add_field_access(&bar, &baz, AccessType::Read);
//!
//! let readers = graph.methods_accessing_field("com.x.Foo.baz", Some(AccessType::Read));
//! ```

mod assessment;
mod builder;
mod classify;
pub mod documents;
mod edge;
mod error;
mod extractor;
mod graph;
mod node;
mod snapshot;
mod store;
mod summary;
mod symbol_table;
mod traversal;

pub use assessment::{
    assess_architecture, assess_security, ArchitectureReport, ComplianceGap, DataProtection,
    SecurityReport, Severity, TechnicalDebt, Vulnerability,
};
pub use builder::{GraphBuilder, IngestReport};
pub use classify::{
    apply_classification, rest_maturity, ApiStyle, Classification, HeuristicClassifier,
    PatternClassifier, RestMaturity,
};
pub use documents::Document;
pub use edge::{Edge, EdgeKind, GraphEdge};
pub use error::{GraphError, Result};
pub use extractor::{ExtractionStats, RelationshipExtractor};
pub use graph::{GraphStats, KindCounts, KnowledgeGraph, NodeId, ReconcileReport};
pub use node::{Entity, Node};
pub use snapshot::Snapshot;
pub use store::GraphStore;
pub use summary::{
    ApiSignature, ClassSample, DiHints, EndpointSummary, GraphSummarizer, InheritanceSummary,
    PackageSummary, Ranked, SummarizerConfig, Totals, TypeBreakdown,
};
pub use symbol_table::SymbolTable;
pub use traversal::{TraceConfig, TracedNode};

/// Edge direction for neighbor queries.
pub use petgraph::Direction;

/// A graph shared between a single writer and concurrent readers.
pub type SharedGraph = std::sync::Arc<std::sync::RwLock<KnowledgeGraph>>;
