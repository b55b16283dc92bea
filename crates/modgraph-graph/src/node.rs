//! Node payloads stored in the graph.

use modgraph_core::{
    ids, AnnotationUse, ClassRecord, EndpointRecord, FieldRecord, MethodRecord, NodeKind,
};
use serde::Serialize;

/// Kind-specific payload of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Entity {
    Class(ClassRecord),
    Method(MethodRecord),
    Field(FieldRecord),
    Endpoint(EndpointRecord),
    Annotation { name: String },
}

impl Entity {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Class(class) => class.node_kind(),
            Self::Method(_) => NodeKind::Method,
            Self::Field(_) => NodeKind::Field,
            Self::Endpoint(_) => NodeKind::Endpoint,
            Self::Annotation { .. } => NodeKind::Annotation,
        }
    }

    /// Simple name used for name lookups.
    pub fn name(&self) -> &str {
        match self {
            Self::Class(class) => &class.name,
            Self::Method(method) => &method.name,
            Self::Field(field) => &field.name,
            Self::Endpoint(endpoint) => &endpoint.path,
            Self::Annotation { name } => name,
        }
    }

    pub fn annotations(&self) -> &[AnnotationUse] {
        match self {
            Self::Class(class) => &class.annotations,
            Self::Method(method) => &method.annotations,
            Self::Field(field) => &field.annotations,
            Self::Endpoint(_) | Self::Annotation { .. } => &[],
        }
    }
}

/// A node: its identifier plus payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub entity: Entity,
}

impl Node {
    pub fn new(id: impl Into<String>, entity: Entity) -> Self {
        Self {
            id: id.into(),
            entity,
        }
    }

    pub fn annotation(name: &str) -> Self {
        Self::new(
            ids::annotation_id(name),
            Entity::Annotation {
                name: name.to_string(),
            },
        )
    }

    pub fn kind(&self) -> NodeKind {
        self.entity.kind()
    }

    pub fn as_class(&self) -> Option<&ClassRecord> {
        match &self.entity {
            Entity::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodRecord> {
        match &self.entity {
            Entity::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldRecord> {
        match &self.entity {
            Entity::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_endpoint(&self) -> Option<&EndpointRecord> {
        match &self.entity {
            Entity::Endpoint(endpoint) => Some(endpoint),
            _ => None,
        }
    }
}
