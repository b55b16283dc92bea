//! Text and metadata rendering of nodes for retrieval indexes.

use crate::graph::KnowledgeGraph;
use crate::node::{Entity, Node};
use modgraph_core::{AnnotationUse, NodeKind};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// One retrievable unit: readable text plus filterable metadata.
///
/// Metadata always carries `kind`, `node_id`, `name` and `annotations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub content: String,
    pub metadata: BTreeMap<String, Value>,
}

impl Document {
    pub fn kind(&self) -> Option<&str> {
        self.metadata.get("kind").and_then(Value::as_str)
    }
}

/// Renders every node in insertion order.
pub fn project(graph: &KnowledgeGraph) -> Vec<Document> {
    graph.nodes().map(to_document).collect()
}

/// Renders only the nodes of one kind.
///
/// Asking for [`NodeKind::Class`] also yields interfaces and enums, since
/// all three are type declarations.
pub fn project_kind(graph: &KnowledgeGraph, kind: NodeKind) -> Vec<Document> {
    graph
        .nodes()
        .filter(|n| kind_matches(n.kind(), kind))
        .map(to_document)
        .collect()
}

fn kind_matches(actual: NodeKind, wanted: NodeKind) -> bool {
    match wanted {
        NodeKind::Class => matches!(
            actual,
            NodeKind::Class | NodeKind::Interface | NodeKind::Enum
        ),
        _ => actual == wanted,
    }
}

pub fn to_document(node: &Node) -> Document {
    let mut metadata = BTreeMap::new();
    metadata.insert("kind".to_string(), json!(node.kind().as_str()));
    metadata.insert("node_id".to_string(), json!(node.id));
    metadata.insert("name".to_string(), json!(node.entity.name()));
    metadata.insert(
        "annotations".to_string(),
        json!(annotation_names(node.entity.annotations())),
    );

    let content = match &node.entity {
        Entity::Class(class) => {
            metadata.insert("package".to_string(), json!(class.package));
            metadata.insert("classification".to_string(), json!(class.classification));
            format!(
                "Class: {}\nPackage: {}\nType: {}\nFile: {}\nModifiers: {}\nAnnotations: {}\n\
                 Interfaces: {}\nSuperclass: {}\nAbstract: {}\n",
                class.name,
                class.package,
                class.java_type,
                class.file_path,
                class.modifiers.join(", "),
                joined(&class.annotations),
                class.interfaces.join(", "),
                class.superclass.as_deref().unwrap_or("None"),
                class.is_abstract,
            )
        }
        Entity::Method(method) => {
            metadata.insert("class".to_string(), json!(method.class_name));
            metadata.insert("signature".to_string(), json!(method.signature));
            let params: Vec<String> = method
                .parameters
                .iter()
                .map(|p| format!("{} {}", p.param_type, p.name))
                .collect();
            format!(
                "Method: {}\nClass: {}\nSignature: {}\nReturn Type: {}\nParameters: {}\n\
                 Modifiers: {}\nAnnotations: {}\nLines: {}-{}\n",
                method.name,
                method.class_name,
                method.signature,
                method.return_type,
                params.join(", "),
                method.modifiers.join(", "),
                joined(&method.annotations),
                method.line_start,
                method.line_end,
            )
        }
        Entity::Field(field) => {
            metadata.insert("class".to_string(), json!(field.class_name));
            metadata.insert("type".to_string(), json!(field.field_type));
            format!(
                "Field: {}\nClass: {}\nType: {}\nModifiers: {}\nAnnotations: {}\nInitial Value: {}\n",
                field.name,
                field.class_name,
                field.field_type,
                field.modifiers.join(", "),
                joined(&field.annotations),
                field.initial_value.as_deref().unwrap_or("None"),
            )
        }
        Entity::Endpoint(endpoint) => {
            metadata.insert("method".to_string(), json!(endpoint.http_method));
            metadata.insert("path".to_string(), json!(endpoint.path));
            metadata.insert("handler".to_string(), json!(endpoint.handler_id()));
            let params: Vec<String> = endpoint
                .params
                .iter()
                .map(|p| format!("{}: {} ({})", p.name, p.param_type, p.source.as_str()))
                .collect();
            format!(
                "REST Endpoint\nHTTP Method: {}\nPath: {}\nHandler: {}.{}\nParameters: {}\n\
                 Consumes: {}\nProduces: {}\n",
                endpoint.http_method,
                endpoint.path,
                endpoint.handler_class,
                endpoint.handler_method,
                params.join(", "),
                endpoint.consumes.join(", "),
                endpoint.produces.join(", "),
            )
        }
        Entity::Annotation { name } => format!("Annotation: @{}\n", name),
    };

    Document { content, metadata }
}

fn annotation_names(annotations: &[AnnotationUse]) -> Vec<&str> {
    annotations.iter().map(AnnotationUse::simple_name).collect()
}

fn joined(annotations: &[AnnotationUse]) -> String {
    annotation_names(annotations).join(", ")
}
