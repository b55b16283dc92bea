//! Serializable snapshot of a graph.
//!
//! A snapshot holds every entity collection keyed by node id plus the
//! edge list and the stats at export time. Re-importing it rebuilds an
//! equivalent graph.

use crate::edge::{Edge, GraphEdge};
use crate::error::Result;
use crate::graph::{GraphStats, KnowledgeGraph};
use crate::node::Entity;
use modgraph_core::{ClassRecord, EndpointRecord, FieldRecord, MethodRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub classes: BTreeMap<String, ClassRecord>,
    pub methods: BTreeMap<String, MethodRecord>,
    pub fields: BTreeMap<String, FieldRecord>,
    pub endpoints: BTreeMap<String, EndpointRecord>,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    #[serde(default)]
    pub stats: GraphStats,
}

impl Snapshot {
    /// Reads a snapshot from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes the snapshot as pretty-printed JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

impl KnowledgeGraph {
    /// Exports all node collections, edges and stats.
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot {
            stats: self.stats(),
            edges: self.export_edges(),
            ..Snapshot::default()
        };

        for node in self.nodes() {
            let id = node.id.clone();
            match &node.entity {
                Entity::Class(class) => {
                    snapshot.classes.insert(id, class.clone());
                }
                Entity::Method(method) => {
                    snapshot.methods.insert(id, method.clone());
                }
                Entity::Field(field) => {
                    snapshot.fields.insert(id, field.clone());
                }
                Entity::Endpoint(endpoint) => {
                    snapshot.endpoints.insert(id, endpoint.clone());
                }
                Entity::Annotation { name } => snapshot.annotations.push(name.clone()),
            }
        }

        snapshot
    }

    /// Rebuilds a graph from a snapshot.
    ///
    /// Entities go in owner-first so ownership links form on insertion;
    /// exported edges are replayed without duplicating those links.
    /// Source lines are not part of the export and come back empty.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut graph = KnowledgeGraph::new();
        let Snapshot {
            classes,
            methods,
            fields,
            endpoints,
            annotations,
            edges,
            ..
        } = snapshot;

        for class in classes.into_values() {
            graph.add_class(class);
        }
        for field in fields.into_values() {
            graph.add_field(field);
        }
        for method in methods.into_values() {
            graph.add_method(method);
        }
        for endpoint in endpoints.into_values() {
            graph.add_endpoint(endpoint);
        }
        for name in &annotations {
            graph.add_annotation(name);
        }

        // Auto-links already exist after insertion; parallel edges of the
        // same relation are replayed up to their exported multiplicity.
        let mut seen: HashMap<(String, String, Edge), usize> = HashMap::new();
        let mut replayed = 0;
        for edge in edges {
            let weight = Edge {
                kind: edge.kind,
                access: edge.access,
                line: None,
            };
            let wanted = seen
                .entry((edge.source.clone(), edge.target.clone(), weight.clone()))
                .or_default();
            *wanted += 1;
            let present = graph
                .edges_between(&edge.source, &edge.target)
                .iter()
                .filter(|e| e.same_relation(&weight))
                .count();
            if present < *wanted && graph.add_relation(&edge.source, &edge.target, weight) {
                replayed += 1;
            }
        }
        graph.reconcile();

        info!(
            "Restored {} nodes and {} edges ({} replayed)",
            graph.node_count(),
            graph.edge_count(),
            replayed
        );
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeKind;
    use modgraph_core::{AccessType, AnnotationUse};
    use tempfile::tempdir;

    fn sample() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        graph.add_class(
            ClassRecord::new("Foo", "com.x", "Foo.java").with_annotation(AnnotationUse::new("Service")),
        );
        let bar = graph.add_method(MethodRecord::new("bar", "com.x.Foo"));
        let qux = graph.add_method(MethodRecord::new("qux", "com.x.Foo"));
        let baz = graph.add_field(FieldRecord::new("baz", "com.x.Foo", "int"));
        graph.add_method_call(&bar, &qux);
        graph.add_field_access(&bar, &baz, AccessType::Read);
        graph.add_field_access(&bar, &baz, AccessType::Write);
        graph.add_endpoint(EndpointRecord::new("GET", "/foo", "com.x.Foo", "bar"));
        graph.add_annotation("Service");
        graph
    }

    #[test]
    fn test_snapshot_collections() {
        let snapshot = sample().snapshot();
        assert_eq!(snapshot.classes.len(), 1);
        assert_eq!(snapshot.methods.len(), 2);
        assert!(snapshot.fields.contains_key("field:com.x.Foo.baz"));
        assert!(snapshot.endpoints.contains_key("endpoint:GET:/foo"));
        assert_eq!(snapshot.stats.methods, 2);
        assert_eq!(snapshot.annotations, vec!["Service".to_string()]);
    }

    #[test]
    fn test_round_trip_rebuilds_equivalent_graph() {
        let original = sample();
        let restored = KnowledgeGraph::from_snapshot(original.snapshot());

        assert_eq!(restored.stats(), original.stats());
        assert_eq!(restored.snapshot().classes, original.snapshot().classes);
        assert!(restored.has_edge("class:com.x.Foo", "method:com.x.Foo.bar", EdgeKind::Declares));
        assert_eq!(
            restored.methods_accessing_field("com.x.Foo.baz", Some(AccessType::Write)),
            vec!["method:com.x.Foo.bar".to_string()]
        );
        assert_eq!(restored.methods_called_by("com.x.Foo.bar").len(), 1);
    }

    #[test]
    fn test_round_trip_keeps_parallel_calls() {
        let mut original = sample();
        original.add_method_call("com.x.Foo.bar", "com.x.Foo.qux");

        let restored = KnowledgeGraph::from_snapshot(original.snapshot());
        assert_eq!(restored.edge_count(), original.edge_count());
        assert_eq!(
            restored
                .edges_between("method:com.x.Foo.bar", "method:com.x.Foo.qux")
                .len(),
            2
        );
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let snapshot = sample().snapshot();
        snapshot.save_json(&path).unwrap();
        let loaded = Snapshot::load_json(&path).unwrap();

        assert_eq!(loaded, snapshot);
    }
}
