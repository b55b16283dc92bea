//! Modgraph Core - Entity records and Java body analysis
//!
//! This crate defines the records an extractor produces for each Java
//! entity (classes, methods, fields, endpoints), the deterministic node
//! identifiers derived from them, and the analysis used to mine
//! relationships out of method bodies.
//!
//! # Example
//!
//! ```no_run
//! use modgraph_core::{ids, AnnotationUse, ClassRecord};
//!
//! let class = ClassRecord::new("UserController", "com.example.web", "UserController.java")
//!     .with_annotation(AnnotationUse::new("RestController"));
//!
//! assert_eq!(class.id(), ids::class_id("com.example.web.UserController"));
//! ```

mod body;
mod endpoints;
mod error;
pub mod ids;
mod records;

pub use body::{BodyAnalyzer, BodyFacts, FieldUse, Invocation};
pub use endpoints::{derive_endpoints, http_verb_for, MAPPING_ANNOTATIONS};
pub use error::{AnalyzeError, RecordError};
pub use records::{
    AccessType, AnnotationUse, ClassRecord, EndpointParam, EndpointRecord, ExtractedUnit,
    FieldRecord, JavaKind, MethodRecord, NodeKind, ParamSource, Parameter,
    UNCLASSIFIED,
};
