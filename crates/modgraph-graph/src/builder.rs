//! Graph builder for constructing the knowledge graph from extracted records.
//!
//! The builder collects records from any number of files, then inserts
//! them in dependency order so that ownership links resolve on the first
//! try: classes, fields, methods, endpoints. Relationship mining and
//! structural linking run once every node exists.

use crate::edge::{Edge, EdgeKind};
use crate::error::GraphError;
use crate::extractor::RelationshipExtractor;
use crate::graph::{KnowledgeGraph, ReconcileReport};
use modgraph_core::{
    derive_endpoints, ids, AnnotationUse, ClassRecord, EndpointRecord, ExtractedUnit,
    FieldRecord, MethodRecord, RecordError,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// What an ingestion pass produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub classes: usize,
    pub methods: usize,
    pub fields: usize,
    /// Explicit endpoints plus those derived from mapping annotations.
    pub endpoints: usize,
    /// Records dropped by validation.
    pub rejected: usize,
    pub calls: usize,
    pub accesses: usize,
    /// EXTENDS, IMPLEMENTS, DEPENDS_ON, RETURNS, PARAMETER, ANNOTATED_WITH.
    pub structural: usize,
    /// Bodies the analyzer could not handle.
    pub unparsed_bodies: usize,
    pub reconcile: ReconcileReport,
}

/// Builds a KnowledgeGraph from extracted records.
///
/// Call `add_unit` for each extracted file, then `build` when all are in.
pub struct GraphBuilder {
    classes: Vec<ClassRecord>,
    fields: Vec<FieldRecord>,
    methods: Vec<MethodRecord>,
    endpoints: Vec<EndpointRecord>,
    rejected: usize,
    analyze_bodies: bool,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            endpoints: Vec::new(),
            rejected: 0,
            analyze_bodies: true,
        }
    }

    /// Skips CALLS/ACCESSES mining; only nodes and structural edges are built.
    pub fn without_body_analysis(mut self) -> Self {
        self.analyze_bodies = false;
        self
    }

    /// Queues every valid record of a unit. Invalid records are logged and
    /// counted, never inserted.
    pub fn add_unit(&mut self, unit: ExtractedUnit) {
        let ExtractedUnit {
            classes,
            methods,
            fields,
            endpoints,
        } = unit;

        for class in classes {
            let result = self.add_class(class);
            self.note(result);
        }
        for field in fields {
            let result = self.add_field(field);
            self.note(result);
        }
        for method in methods {
            let result = self.add_method(method);
            self.note(result);
        }
        for endpoint in endpoints {
            let result = self.add_endpoint(endpoint);
            self.note(result);
        }
    }

    pub fn add_class(&mut self, class: ClassRecord) -> Result<(), RecordError> {
        class.validate()?;
        self.classes.push(class);
        Ok(())
    }

    pub fn add_method(&mut self, method: MethodRecord) -> Result<(), RecordError> {
        method.validate()?;
        self.methods.push(method);
        Ok(())
    }

    pub fn add_field(&mut self, field: FieldRecord) -> Result<(), RecordError> {
        field.validate()?;
        self.fields.push(field);
        Ok(())
    }

    pub fn add_endpoint(&mut self, endpoint: EndpointRecord) -> Result<(), RecordError> {
        endpoint.validate()?;
        self.endpoints.push(endpoint);
        Ok(())
    }

    fn note(&mut self, result: Result<(), RecordError>) {
        if let Err(e) = result {
            warn!("Rejected record: {}", e);
            self.rejected += 1;
        }
    }

    /// Finishes building and returns the graph.
    pub fn build(self) -> Result<(KnowledgeGraph, IngestReport), GraphError> {
        let mut graph = KnowledgeGraph::new();
        let report = self.build_into(&mut graph)?;
        Ok((graph, report))
    }

    /// Inserts everything into an existing graph (for incremental updates).
    pub fn build_into(self, graph: &mut KnowledgeGraph) -> Result<IngestReport, GraphError> {
        let mut report = IngestReport {
            classes: self.classes.len(),
            methods: self.methods.len(),
            fields: self.fields.len(),
            rejected: self.rejected,
            ..IngestReport::default()
        };

        for class in &self.classes {
            debug!("Adding class {}", class.fqn());
            graph.add_class(class.clone());
        }
        for field in &self.fields {
            graph.add_field(field.clone());
        }
        for method in &self.methods {
            graph.add_method(method.clone());
        }

        let by_fqn: HashMap<String, &ClassRecord> =
            self.classes.iter().map(|c| (c.fqn(), c)).collect();
        let mut endpoints = self.endpoints.clone();
        for method in &self.methods {
            if let Some(class) = by_fqn.get(&method.class_name) {
                endpoints.extend(derive_endpoints(class, method));
            }
        }
        for endpoint in endpoints {
            graph.add_endpoint(endpoint);
            report.endpoints += 1;
        }

        report.structural = link_structure(graph, &self.classes, &self.fields, &self.methods);

        if self.analyze_bodies {
            let mut extractor = RelationshipExtractor::new()?;
            for method in self.methods.iter().filter(|m| m.body.is_some()) {
                match extractor.extract(graph, method) {
                    Ok(stats) => {
                        report.calls += stats.calls;
                        report.accesses += stats.accesses;
                    }
                    Err(e) => {
                        warn!("Could not analyze body of {}: {}", method.id(), e);
                        report.unparsed_bodies += 1;
                    }
                }
            }
        }

        report.reconcile = graph.reconcile();

        info!(
            "Ingested {} classes, {} methods, {} fields, {} endpoints ({} rejected)",
            report.classes, report.methods, report.fields, report.endpoints, report.rejected
        );
        info!(
            "Linked {} calls, {} accesses, {} structural edges; {} pending links resolved, {} unresolved",
            report.calls,
            report.accesses,
            report.structural,
            report.reconcile.resolved,
            report.reconcile.unresolved
        );

        Ok(report)
    }
}

/// Adds type-level edges whose targets resolve to known classes.
fn link_structure(
    graph: &mut KnowledgeGraph,
    classes: &[ClassRecord],
    fields: &[FieldRecord],
    methods: &[MethodRecord],
) -> usize {
    let mut added = 0;

    for class in classes {
        let id = class.id();
        if let Some(parent) = resolve(graph, class.superclass.as_deref().unwrap_or(""), &class.package) {
            added += link(graph, &id, &ids::class_id(&parent), EdgeKind::Extends);
        }
        for interface in &class.interfaces {
            if let Some(target) = resolve(graph, interface, &class.package) {
                added += link(graph, &id, &ids::class_id(&target), EdgeKind::Implements);
            }
        }
        added += annotate(graph, &id, &class.annotations);
    }

    for field in fields {
        let owner = ids::class_id(&field.class_name);
        let package = package_of(graph, &field.class_name);
        for name in type_names(&field.field_type) {
            if let Some(target) = resolve(graph, name, &package) {
                if target != field.class_name {
                    added += link(graph, &owner, &ids::class_id(&target), EdgeKind::DependsOn);
                }
            }
        }
        added += annotate(graph, &field.id(), &field.annotations);
    }

    for method in methods {
        let id = method.id();
        let package = package_of(graph, &method.class_name);
        for name in type_names(&method.return_type) {
            if let Some(target) = resolve(graph, name, &package) {
                added += link(graph, &id, &ids::class_id(&target), EdgeKind::Returns);
            }
        }
        for param in &method.parameters {
            for name in type_names(&param.param_type) {
                if let Some(target) = resolve(graph, name, &package) {
                    added += link(graph, &id, &ids::class_id(&target), EdgeKind::Parameter);
                }
            }
        }
        added += annotate(graph, &id, &method.annotations);
    }

    added
}

fn annotate(graph: &mut KnowledgeGraph, node: &str, annotations: &[AnnotationUse]) -> usize {
    let mut added = 0;
    for annotation in annotations {
        let target = graph.add_annotation(annotation.simple_name());
        added += link(graph, node, &target, EdgeKind::AnnotatedWith);
    }
    added
}

fn link(graph: &mut KnowledgeGraph, from: &str, to: &str, kind: EdgeKind) -> usize {
    usize::from(graph.link_once(from, to, Edge::new(kind)))
}

fn resolve(graph: &KnowledgeGraph, name: &str, package: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    graph.resolve_class(name, package).map(str::to_string)
}

fn package_of(graph: &KnowledgeGraph, class_name: &str) -> String {
    match graph.get_class(class_name) {
        Some(class) => class.package.clone(),
        None => class_name
            .rsplit_once('.')
            .map(|(pkg, _)| pkg.to_string())
            .unwrap_or_default(),
    }
}

/// Class-like names mentioned in a type: `Map<String, List<User>>` yields
/// `Map`, `String`, `List`, `User`.
fn type_names(ty: &str) -> impl Iterator<Item = &str> {
    ty.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.' || c == '$'))
        .filter(|s| {
            ids::simple_name(s)
                .chars()
                .next()
                .is_some_and(|c| c.is_uppercase())
        })
}
