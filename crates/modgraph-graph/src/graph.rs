//! Core graph data structure.
//!
//! The KnowledgeGraph wraps a petgraph multigraph and adds the indexes the
//! rest of the system relies on: id lookup, name lookup, per-kind counters,
//! the entry-point set, and the call/field-access maps.

use crate::edge::{Edge, EdgeKind, GraphEdge};
use crate::node::{Entity, Node};
use crate::symbol_table::SymbolTable;
use modgraph_core::{
    ids, AccessType, ClassRecord, EndpointRecord, FieldRecord, MethodRecord, NodeKind,
};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Index of a node inside the graph.
pub type NodeId = NodeIndex;

/// An edge that could not be inserted because an endpoint was missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingLink {
    pub from: String,
    pub to: String,
    pub edge: Edge,
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Previously skipped edges inserted now.
    pub resolved: usize,
    /// Edges whose endpoints are still missing.
    pub unresolved: usize,
}

/// Node counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    /// Classes, interfaces and enums.
    pub classes: usize,
    pub methods: usize,
    pub fields: usize,
    pub endpoints: usize,
    pub annotations: usize,
}

impl KindCounts {
    fn bump(&mut self, kind: NodeKind) {
        match kind {
            NodeKind::Class | NodeKind::Interface | NodeKind::Enum => self.classes += 1,
            NodeKind::Method => self.methods += 1,
            NodeKind::Field => self.fields += 1,
            NodeKind::Endpoint => self.endpoints += 1,
            NodeKind::Annotation => self.annotations += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.classes + self.methods + self.fields + self.endpoints + self.annotations
    }
}

/// Graph statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub classes: usize,
    pub methods: usize,
    pub fields: usize,
    pub endpoints: usize,
    pub annotations: usize,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub entry_points: usize,
}

/// The knowledge graph of a codebase.
///
/// Nodes are keyed by deterministic string ids; re-adding an entity
/// replaces its attributes in place. Edges are only inserted between nodes
/// that already exist. Anything skipped is remembered and can be replayed
/// with [`reconcile`](Self::reconcile).
#[derive(Debug, Default)]
pub struct KnowledgeGraph {
    /// The underlying petgraph multigraph.
    pub(crate) graph: DiGraph<Node, Edge>,

    /// Maps string IDs to graph node indexes.
    id_index: HashMap<String, NodeId>,

    /// Maps simple names to node IDs (for search).
    name_index: HashMap<String, Vec<NodeId>>,

    /// Class names for type resolution.
    symbols: SymbolTable,

    counts: KindCounts,

    /// Endpoints and other externally triggered nodes, in insertion order.
    entry_points: Vec<NodeId>,

    /// Caller id → callee ids, one entry per CALLS edge.
    call_map: HashMap<String, Vec<String>>,

    /// Field id → (method id, access), one entry per ACCESSES edge.
    access_map: HashMap<String, Vec<(String, AccessType)>>,

    /// Skipped edges awaiting reconciliation.
    pending: Vec<PendingLink>,
}

impl KnowledgeGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Insertion
    // ─────────────────────────────────────────────────────────────────────

    /// Adds a class, interface or enum.
    pub fn add_class(&mut self, class: ClassRecord) -> String {
        let id = class.id();
        self.symbols
            .insert(&class.fqn(), &class.name, &class.package);
        self.upsert(Node::new(id.clone(), Entity::Class(class)));
        id
    }

    /// Adds a method, linking it to its class if the class is present.
    pub fn add_method(&mut self, method: MethodRecord) -> String {
        let id = method.id();
        let class_id = ids::class_id(&method.class_name);
        self.upsert(Node::new(id.clone(), Entity::Method(method)));
        self.link_once(&class_id, &id, Edge::new(EdgeKind::Declares));
        id
    }

    /// Adds a field, linking it to its class if the class is present.
    pub fn add_field(&mut self, field: FieldRecord) -> String {
        let id = field.id();
        let class_id = ids::class_id(&field.class_name);
        self.upsert(Node::new(id.clone(), Entity::Field(field)));
        self.link_once(&class_id, &id, Edge::new(EdgeKind::Declares));
        id
    }

    /// Adds an endpoint, registers it as an entry point, and links it to its
    /// handler method if the handler is present.
    pub fn add_endpoint(&mut self, endpoint: EndpointRecord) -> String {
        let id = endpoint.id();
        let handler_id = endpoint.handler_id();
        let (index, inserted) = self.upsert(Node::new(id.clone(), Entity::Endpoint(endpoint)));
        if !self.entry_points.contains(&index) {
            self.entry_points.push(index);
        }
        if !inserted {
            self.drop_stale_handles(index, &id, &handler_id);
        }
        self.link_once(&id, &handler_id, Edge::new(EdgeKind::Handles));
        id
    }

    /// Adds an annotation node.
    pub fn add_annotation(&mut self, name: &str) -> String {
        let node = Node::annotation(name);
        let id = node.id.clone();
        self.upsert(node);
        id
    }

    /// Records a call between two methods.
    ///
    /// Accepts ids with or without the `method:` prefix. Returns false and
    /// remembers the request when either method is missing.
    pub fn add_method_call(&mut self, caller: &str, callee: &str) -> bool {
        let caller = ids::with_prefix(ids::METHOD_PREFIX, caller);
        let callee = ids::with_prefix(ids::METHOD_PREFIX, callee);
        self.add_relation(&caller, &callee, Edge::new(EdgeKind::Calls))
    }

    /// Records that `method` reads or writes `field`.
    pub fn add_field_access(&mut self, method: &str, field: &str, access: AccessType) -> bool {
        let method = ids::with_prefix(ids::METHOD_PREFIX, method);
        let field = ids::with_prefix(ids::FIELD_PREFIX, field);
        self.add_relation(&method, &field, Edge::access(access))
    }

    /// Inserts an edge between two existing nodes.
    ///
    /// Parallel edges are allowed. When either end is missing nothing is
    /// inserted, the request is kept for [`reconcile`](Self::reconcile),
    /// and false is returned.
    pub fn add_relation(&mut self, from: &str, to: &str, edge: Edge) -> bool {
        match (self.get_index(from), self.get_index(to)) {
            (Some(a), Some(b)) => {
                self.insert_edge(a, b, edge);
                true
            }
            _ => {
                debug!("Skipping {} edge {} -> {}: endpoint missing", edge.kind, from, to);
                self.pending.push(PendingLink {
                    from: from.to_string(),
                    to: to.to_string(),
                    edge,
                });
                false
            }
        }
    }

    /// Like [`add_relation`](Self::add_relation) but never duplicates an
    /// existing edge of the same relation.
    pub fn link_once(&mut self, from: &str, to: &str, edge: Edge) -> bool {
        if let (Some(a), Some(b)) = (self.get_index(from), self.get_index(to)) {
            if self.has_edge_between(a, b, &edge) {
                return false;
            }
        }
        self.add_relation(from, to, edge)
    }

    /// Replays every skipped edge whose endpoints now exist.
    ///
    /// Edges already present are not duplicated. Requests that still cannot
    /// be satisfied stay queued for a later pass.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let pending = std::mem::take(&mut self.pending);
        let mut report = ReconcileReport::default();

        for link in pending {
            match (self.get_index(&link.from), self.get_index(&link.to)) {
                (Some(a), Some(b)) => {
                    if !self.has_edge_between(a, b, &link.edge) {
                        self.insert_edge(a, b, link.edge);
                        report.resolved += 1;
                    }
                }
                _ => {
                    report.unresolved += 1;
                    self.pending.push(link);
                }
            }
        }

        report
    }

    /// Number of edge requests waiting for reconciliation.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Assigns a classification label to a class.
    ///
    /// Topology is untouched. Returns false if no class has that id.
    pub fn set_classification(&mut self, class_id: &str, label: &str) -> bool {
        let class_id = ids::with_prefix(ids::CLASS_PREFIX, class_id);
        let Some(index) = self.get_index(&class_id) else {
            return false;
        };
        match self.graph.node_weight_mut(index).map(|n| &mut n.entity) {
            Some(Entity::Class(class)) => {
                class.classification = label.to_string();
                true
            }
            _ => false,
        }
    }

    /// Recomputes the entry-point set by scanning every node.
    pub fn rebuild_entry_points(&mut self) {
        self.entry_points = self
            .graph
            .node_indices()
            .filter(|&idx| self.graph[idx].kind() == NodeKind::Endpoint)
            .collect();
    }

    fn upsert(&mut self, node: Node) -> (NodeId, bool) {
        if let Some(&index) = self.id_index.get(&node.id) {
            debug!("Replacing node {}", node.id);
            let old_name = self.graph[index].entity.name().to_string();
            if old_name != node.entity.name() {
                if let Some(list) = self.name_index.get_mut(&old_name) {
                    list.retain(|&idx| idx != index);
                }
                self.name_index
                    .entry(node.entity.name().to_string())
                    .or_default()
                    .push(index);
            }
            self.graph[index] = node;
            return (index, false);
        }

        let id = node.id.clone();
        let name = node.entity.name().to_string();
        let kind = node.kind();

        let index = self.graph.add_node(node);

        // Update indexes
        self.id_index.insert(id, index);
        self.name_index.entry(name).or_default().push(index);
        self.counts.bump(kind);

        (index, true)
    }

    /// Removes HANDLES edges (and queued HANDLES links) leaving `endpoint`
    /// for anything other than `handler_id`.
    fn drop_stale_handles(&mut self, endpoint: NodeId, endpoint_id: &str, handler_id: &str) {
        self.pending.retain(|link| {
            link.from != endpoint_id || link.edge.kind != EdgeKind::Handles || link.to == handler_id
        });

        let stale = |e: &petgraph::graph::Edge<Edge>, graph: &DiGraph<Node, Edge>| {
            e.source() == endpoint
                && e.weight.kind == EdgeKind::Handles
                && graph[e.target()].id != handler_id
        };
        if !self.graph.raw_edges().iter().any(|e| stale(e, &self.graph)) {
            return;
        }

        // Rebuild the edge list so the surviving edges keep insertion order.
        let kept: Vec<(NodeId, NodeId, Edge)> = self
            .graph
            .raw_edges()
            .iter()
            .filter(|e| !stale(e, &self.graph))
            .map(|e| (e.source(), e.target(), e.weight.clone()))
            .collect();
        debug!(
            "Dropping {} stale HANDLES edge(s) from {}",
            self.graph.edge_count() - kept.len(),
            endpoint_id
        );
        self.graph.clear_edges();
        for (from, to, edge) in kept {
            self.graph.add_edge(from, to, edge);
        }
    }

    /// Adds the edge and updates the derived maps in the same step.
    fn insert_edge(&mut self, from: NodeId, to: NodeId, edge: Edge) {
        match (edge.kind, edge.access) {
            (EdgeKind::Calls, _) => {
                self.call_map
                    .entry(self.graph[from].id.clone())
                    .or_default()
                    .push(self.graph[to].id.clone());
            }
            (EdgeKind::Accesses, Some(access)) => {
                self.access_map
                    .entry(self.graph[to].id.clone())
                    .or_default()
                    .push((self.graph[from].id.clone(), access));
            }
            _ => {}
        }
        self.graph.add_edge(from, to, edge);
    }

    fn has_edge_between(&self, from: NodeId, to: NodeId, edge: &Edge) -> bool {
        self.graph
            .edges_connecting(from, to)
            .any(|e| e.weight().same_relation(edge))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────

    /// Gets the node index for a string ID.
    pub fn get_index(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    /// Gets a node by its string ID.
    pub fn get_by_id(&self, id: &str) -> Option<&Node> {
        let index = self.id_index.get(id)?;
        self.graph.node_weight(*index)
    }

    /// Gets a node by its graph index.
    pub fn get(&self, index: NodeId) -> Option<&Node> {
        self.graph.node_weight(index)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    pub fn get_class(&self, id: &str) -> Option<&ClassRecord> {
        self.get_by_id(&ids::with_prefix(ids::CLASS_PREFIX, id))?
            .as_class()
    }

    pub fn get_method(&self, id: &str) -> Option<&MethodRecord> {
        self.get_by_id(&ids::with_prefix(ids::METHOD_PREFIX, id))?
            .as_method()
    }

    pub fn get_field(&self, id: &str) -> Option<&FieldRecord> {
        self.get_by_id(&ids::with_prefix(ids::FIELD_PREFIX, id))?
            .as_field()
    }

    pub fn get_endpoint(&self, id: &str) -> Option<&EndpointRecord> {
        self.get_by_id(&ids::with_prefix(ids::ENDPOINT_PREFIX, id))?
            .as_endpoint()
    }

    /// Finds all nodes with a given simple name.
    pub fn find_by_name(&self, name: &str) -> Vec<&Node> {
        self.name_index
            .get(name)
            .map(|indexes| {
                indexes
                    .iter()
                    .filter_map(|idx| self.graph.node_weight(*idx))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolves a type reference to a class FQN.
    ///
    /// `package` is the package of the referencing code; it breaks ties
    /// between equally named classes.
    pub fn resolve_class(&self, reference: &str, package: &str) -> Option<&str> {
        self.symbols.resolve(reference, package)
    }

    /// Iterates over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    pub fn classes(&self) -> impl Iterator<Item = (&str, &ClassRecord)> {
        self.nodes()
            .filter_map(|n| n.as_class().map(|c| (n.id.as_str(), c)))
    }

    pub fn methods(&self) -> impl Iterator<Item = (&str, &MethodRecord)> {
        self.nodes()
            .filter_map(|n| n.as_method().map(|m| (n.id.as_str(), m)))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldRecord)> {
        self.nodes()
            .filter_map(|n| n.as_field().map(|f| (n.id.as_str(), f)))
    }

    pub fn endpoints(&self) -> impl Iterator<Item = (&str, &EndpointRecord)> {
        self.nodes()
            .filter_map(|n| n.as_endpoint().map(|e| (n.id.as_str(), e)))
    }

    /// Entry-point ids in insertion order.
    pub fn entry_points(&self) -> Vec<&str> {
        self.entry_points
            .iter()
            .filter_map(|idx| self.graph.node_weight(*idx))
            .map(|n| n.id.as_str())
            .collect()
    }

    pub(crate) fn entry_points_index(&self) -> &[NodeId] {
        &self.entry_points
    }

    pub fn is_entry_point(&self, id: &str) -> bool {
        self.get_index(id)
            .map(|idx| self.entry_points.contains(&idx))
            .unwrap_or(false)
    }

    /// Every edge from `from` to `to`, in insertion order.
    pub fn edges_between(&self, from: &str, to: &str) -> Vec<&Edge> {
        let (Some(a), Some(b)) = (self.get_index(from), self.get_index(to)) else {
            return Vec::new();
        };
        let mut edges: Vec<(EdgeIndex, &Edge)> = self
            .graph
            .edges_connecting(a, b)
            .map(|e| (e.id(), e.weight()))
            .collect();
        edges.sort_by_key(|(idx, _)| *idx);
        edges.into_iter().map(|(_, e)| e).collect()
    }

    pub fn has_edge(&self, from: &str, to: &str, kind: EdgeKind) -> bool {
        self.edges_between(from, to).iter().any(|e| e.kind == kind)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Relationship queries
    // ─────────────────────────────────────────────────────────────────────

    /// Methods with an ACCESSES edge into `field`, in edge insertion order.
    ///
    /// Every parallel edge is examined, so a method holding both a read and
    /// a write edge matches either filter.
    pub fn methods_accessing_field(&self, field: &str, access: Option<AccessType>) -> Vec<String> {
        let field = ids::with_prefix(ids::FIELD_PREFIX, field);
        let Some(index) = self.get_index(&field) else {
            return Vec::new();
        };

        let mut edges: Vec<(EdgeIndex, NodeId)> = self
            .graph
            .edges_directed(index, Direction::Incoming)
            .filter(|e| e.weight().kind == EdgeKind::Accesses)
            .filter(|e| access.map_or(true, |a| e.weight().access == Some(a)))
            .map(|e| (e.id(), e.source()))
            .collect();
        edges.sort_by_key(|(idx, _)| *idx);

        self.unique_ids(edges.into_iter().map(|(_, n)| n))
    }

    /// Methods `method` calls, in edge insertion order.
    pub fn methods_called_by(&self, method: &str) -> Vec<String> {
        let method = ids::with_prefix(ids::METHOD_PREFIX, method);
        let Some(index) = self.get_index(&method) else {
            return Vec::new();
        };

        let mut edges: Vec<(EdgeIndex, NodeId)> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .filter(|e| e.weight().kind == EdgeKind::Calls)
            .map(|e| (e.id(), e.target()))
            .collect();
        edges.sort_by_key(|(idx, _)| *idx);

        self.unique_ids(edges.into_iter().map(|(_, n)| n))
    }

    /// Neighbors reached over edges of `kind`, either direction.
    pub fn neighbors_by_kind(&self, id: &str, kind: EdgeKind, direction: Direction) -> Vec<String> {
        let Some(index) = self.get_index(id) else {
            return Vec::new();
        };
        let mut edges: Vec<(EdgeIndex, NodeId)> = self
            .graph
            .edges_directed(index, direction)
            .filter(|e| e.weight().kind == kind)
            .map(|e| {
                let other = match direction {
                    Direction::Incoming => e.source(),
                    Direction::Outgoing => e.target(),
                };
                (e.id(), other)
            })
            .collect();
        edges.sort_by_key(|(idx, _)| *idx);
        self.unique_ids(edges.into_iter().map(|(_, n)| n))
    }

    /// Caller → callees map, mirrored from CALLS edges.
    pub fn call_map(&self) -> &HashMap<String, Vec<String>> {
        &self.call_map
    }

    /// Field → accessing methods map, mirrored from ACCESSES edges.
    pub fn access_map(&self) -> &HashMap<String, Vec<(String, AccessType)>> {
        &self.access_map
    }

    fn unique_ids(&self, nodes: impl Iterator<Item = NodeId>) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for idx in nodes {
            let id = &self.graph[idx].id;
            if !out.contains(id) {
                out.push(id.clone());
            }
        }
        out
    }

    // ─────────────────────────────────────────────────────────────────────
    // Stats and export
    // ─────────────────────────────────────────────────────────────────────

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn counts(&self) -> KindCounts {
        self.counts
    }

    /// Returns graph statistics from the maintained counters.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            classes: self.counts.classes,
            methods: self.counts.methods,
            fields: self.counts.fields,
            endpoints: self.counts.endpoints,
            annotations: self.counts.annotations,
            total_nodes: self.graph.node_count(),
            total_edges: self.graph.edge_count(),
            entry_points: self.entry_points.len(),
        }
    }

    /// Returns all edges with source and target IDs for export.
    pub fn export_edges(&self) -> Vec<GraphEdge> {
        self.graph
            .edge_references()
            .map(|edge_ref| {
                let weight = edge_ref.weight();
                GraphEdge {
                    source: self.graph[edge_ref.source()].id.clone(),
                    target: self.graph[edge_ref.target()].id.clone(),
                    kind: weight.kind,
                    access: weight.access,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modgraph_core::AnnotationUse;

    fn foo() -> ClassRecord {
        ClassRecord::new("Foo", "com.x", "Foo.java")
            .with_annotation(AnnotationUse::new("Service"))
    }

    #[test]
    fn test_add_class_is_idempotent() {
        let mut graph = KnowledgeGraph::new();
        let a = graph.add_class(foo());
        let b = graph.add_class(foo().with_superclass("Base"));

        assert_eq!(a, b);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.stats().classes, 1);
        assert_eq!(
            graph.get_class(&a).and_then(|c| c.superclass.as_deref()),
            Some("Base")
        );
    }

    #[test]
    fn test_declares_requires_class_first() {
        let mut graph = KnowledgeGraph::new();
        let early = graph.add_method(MethodRecord::new("early", "com.x.Foo"));
        let class = graph.add_class(foo());
        let late = graph.add_method(MethodRecord::new("late", "com.x.Foo"));

        assert!(graph.has_edge(&class, &late, EdgeKind::Declares));
        assert!(!graph.has_edge(&class, &early, EdgeKind::Declares));

        let report = graph.reconcile();
        assert_eq!(report.resolved, 1);
        assert!(graph.has_edge(&class, &early, EdgeKind::Declares));
    }

    #[test]
    fn test_readding_method_keeps_single_declares() {
        let mut graph = KnowledgeGraph::new();
        let class = graph.add_class(foo());
        let m = graph.add_method(MethodRecord::new("bar", "com.x.Foo"));
        graph.add_method(MethodRecord::new("bar", "com.x.Foo").with_return_type("int"));

        assert_eq!(graph.edges_between(&class, &m).len(), 1);
        assert_eq!(graph.get_method(&m).map(|m| m.return_type.as_str()), Some("int"));
    }

    #[test]
    fn test_dangling_call_is_skipped() {
        let mut graph = KnowledgeGraph::new();
        graph.add_class(foo());
        graph.add_method(MethodRecord::new("bar", "com.x.Foo"));

        assert!(!graph.add_method_call("method:com.x.Foo.bar", "method:com.x.Foo.missing"));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.call_map().is_empty());
        assert_eq!(graph.pending_count(), 1);
    }

    #[test]
    fn test_parallel_access_edges() {
        let mut graph = KnowledgeGraph::new();
        graph.add_class(foo());
        let m = graph.add_method(MethodRecord::new("bar", "com.x.Foo"));
        let f = graph.add_field(FieldRecord::new("baz", "com.x.Foo", "int"));

        assert!(graph.add_field_access(&m, &f, AccessType::Write));
        assert_eq!(graph.methods_accessing_field(&f, Some(AccessType::Write)), vec![m.clone()]);
        assert!(graph.methods_accessing_field(&f, Some(AccessType::Read)).is_empty());

        assert!(graph.add_field_access(&m, &f, AccessType::Read));
        assert_eq!(graph.edges_between(&m, &f).len(), 2);
        assert_eq!(graph.methods_accessing_field(&f, Some(AccessType::Read)), vec![m.clone()]);
        assert_eq!(graph.methods_accessing_field(&f, None), vec![m.clone()]);
        assert_eq!(graph.access_map()[&f].len(), 2);
    }

    #[test]
    fn test_methods_called_by_order() {
        let mut graph = KnowledgeGraph::new();
        graph.add_class(foo());
        let a = graph.add_method(MethodRecord::new("a", "com.x.Foo"));
        let b = graph.add_method(MethodRecord::new("b", "com.x.Foo"));
        let c = graph.add_method(MethodRecord::new("c", "com.x.Foo"));

        graph.add_method_call(&a, &c);
        graph.add_method_call(&a, &b);
        graph.add_method_call(&a, &c);

        assert_eq!(graph.methods_called_by(&a), vec![c.clone(), b.clone()]);
        assert_eq!(graph.call_map()[&a].len(), 3);
        assert!(graph.methods_called_by("method:com.x.Foo.nope").is_empty());
    }

    #[test]
    fn test_endpoint_is_entry_point_and_handles() {
        let mut graph = KnowledgeGraph::new();
        let handler = graph.add_method(MethodRecord::new("getUsers", "com.x.UserController"));
        let endpoint = graph.add_endpoint(EndpointRecord::new(
            "GET",
            "/api/users",
            "com.x.UserController",
            "getUsers",
        ));
        graph.add_endpoint(EndpointRecord::new(
            "GET",
            "/api/users",
            "com.x.UserController",
            "getUsers",
        ));

        assert!(graph.has_edge(&endpoint, &handler, EdgeKind::Handles));
        assert_eq!(graph.edges_between(&endpoint, &handler).len(), 1);
        assert_eq!(graph.entry_points(), vec![endpoint.as_str()]);
        assert!(graph.is_entry_point(&endpoint));
    }

    #[test]
    fn test_readding_endpoint_moves_handles() {
        let mut graph = KnowledgeGraph::new();
        let old = graph.add_method(MethodRecord::new("list", "com.x.UserController"));
        let new = graph.add_method(MethodRecord::new("listAll", "com.x.UserController"));
        let helper = graph.add_method(MethodRecord::new("load", "com.x.UserController"));
        graph.add_method_call(&old, &helper);
        let endpoint = graph.add_endpoint(EndpointRecord::new(
            "GET",
            "/api/users",
            "com.x.UserController",
            "list",
        ));
        graph.add_endpoint(EndpointRecord::new(
            "GET",
            "/api/users",
            "com.x.UserController",
            "listAll",
        ));

        assert!(!graph.has_edge(&endpoint, &old, EdgeKind::Handles));
        assert!(graph.has_edge(&endpoint, &new, EdgeKind::Handles));
        assert!(graph.has_edge(&old, &helper, EdgeKind::Calls));
        assert_eq!(graph.entry_points(), vec![endpoint.as_str()]);
        let reached = graph.forward_trace(&endpoint, 10);
        assert!(reached.contains(&new));
        assert!(!reached.contains(&old));
        assert!(!reached.contains(&helper));
    }

    #[test]
    fn test_readding_endpoint_drops_queued_handler() {
        let mut graph = KnowledgeGraph::new();
        let endpoint = graph.add_endpoint(EndpointRecord::new("GET", "/a", "com.x.A", "a"));
        graph.add_endpoint(EndpointRecord::new("GET", "/a", "com.x.A", "b"));
        let a = graph.add_method(MethodRecord::new("a", "com.x.A"));
        let b = graph.add_method(MethodRecord::new("b", "com.x.A"));

        let report = graph.reconcile();
        assert_eq!(report.resolved, 1);
        assert!(!graph.has_edge(&endpoint, &a, EdgeKind::Handles));
        assert!(graph.has_edge(&endpoint, &b, EdgeKind::Handles));
    }

    #[test]
    fn test_rebuild_entry_points() {
        let mut graph = KnowledgeGraph::new();
        graph.add_endpoint(EndpointRecord::new("GET", "/a", "com.x.A", "a"));
        graph.add_endpoint(EndpointRecord::new("POST", "/a", "com.x.A", "b"));
        graph.entry_points.clear();

        graph.rebuild_entry_points();
        assert_eq!(graph.entry_points(), vec!["endpoint:GET:/a", "endpoint:POST:/a"]);
    }

    #[test]
    fn test_stats_total_matches_kind_sum() {
        let mut graph = KnowledgeGraph::new();
        graph.add_class(foo());
        graph.add_class(ClassRecord::new("Repo", "com.x", "Repo.java")
            .with_kind(modgraph_core::JavaKind::Interface));
        graph.add_method(MethodRecord::new("bar", "com.x.Foo"));
        graph.add_field(FieldRecord::new("baz", "com.x.Foo", "int"));
        graph.add_endpoint(EndpointRecord::new("GET", "/a", "com.x.Foo", "bar"));
        graph.add_annotation("Service");
        graph.add_class(foo());

        let stats = graph.stats();
        assert_eq!(stats.classes, 2);
        assert_eq!(
            stats.total_nodes,
            stats.classes + stats.methods + stats.fields + stats.endpoints + stats.annotations
        );
        assert_eq!(stats.total_nodes, graph.counts().total());
        assert_eq!(stats.entry_points, 1);
    }

    #[test]
    fn test_set_classification() {
        let mut graph = KnowledgeGraph::new();
        let id = graph.add_class(foo());
        let edges_before = graph.edge_count();

        assert!(graph.set_classification("com.x.Foo", "spring-mvc"));
        assert_eq!(graph.get_class(&id).map(|c| c.classification.as_str()), Some("spring-mvc"));
        assert_eq!(graph.edge_count(), edges_before);
        assert!(!graph.set_classification("com.x.Missing", "x"));
    }

    #[test]
    fn test_find_by_name_after_replace() {
        let mut graph = KnowledgeGraph::new();
        graph.add_class(foo());
        graph.add_method(MethodRecord::new("bar", "com.x.Foo"));

        assert_eq!(graph.find_by_name("Foo").len(), 1);
        assert_eq!(graph.find_by_name("bar")[0].kind(), NodeKind::Method);
        assert_eq!(graph.resolve_class("Foo", ""), Some("com.x.Foo"));
    }
}
