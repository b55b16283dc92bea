//! Entity records produced by the extractor.
//!
//! These are plain data: the graph store assumes a record has passed
//! [`validate`](ClassRecord::validate) before it is inserted.

use crate::error::RecordError;
use crate::ids;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Label every class starts with until a classifier assigns one.
pub const UNCLASSIFIED: &str = "unclassified";

/// The kind of node stored in the knowledge graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Class,
    Interface,
    Enum,
    Method,
    Field,
    Endpoint,
    Annotation,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Method => "method",
            Self::Field => "field",
            Self::Endpoint => "endpoint",
            Self::Annotation => "annotation",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "class" => Ok(Self::Class),
            "interface" => Ok(Self::Interface),
            "enum" => Ok(Self::Enum),
            "method" => Ok(Self::Method),
            "field" => Ok(Self::Field),
            "endpoint" => Ok(Self::Endpoint),
            "annotation" => Ok(Self::Annotation),
            _ => Err(RecordError::UnknownValue {
                what: "node kind",
                value: s.to_string(),
            }),
        }
    }
}

/// Secondary kind tag on a class record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JavaKind {
    #[default]
    Class,
    Interface,
    Enum,
}

impl JavaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
        }
    }

    pub fn node_kind(&self) -> NodeKind {
        match self {
            Self::Class => NodeKind::Class,
            Self::Interface => NodeKind::Interface,
            Self::Enum => NodeKind::Enum,
        }
    }
}

impl fmt::Display for JavaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a method reads or writes a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    Read,
    Write,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            _ => Err(RecordError::UnknownValue {
                what: "access type",
                value: s.to_string(),
            }),
        }
    }
}

/// One annotation site: `@RequestMapping(value = "/users", method = GET)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationUse {
    /// Annotation name without the `@`.
    pub name: String,

    /// Element values keyed by element name (`value` for the shorthand form).
    #[serde(default)]
    pub values: BTreeMap<String, String>,

    /// The literal text as written in source.
    #[serde(default)]
    pub raw: String,
}

impl AnnotationUse {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let raw = format!("@{}", name);
        Self {
            name,
            values: BTreeMap::new(),
            raw,
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = raw.into();
        self
    }

    /// Name with any `@` and package qualifier stripped.
    ///
    /// `@org.springframework.stereotype.Service` and `Service` compare equal.
    pub fn simple_name(&self) -> &str {
        ids::simple_name(self.name.trim_start_matches('@'))
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is(&self, name: &str) -> bool {
        self.simple_name() == name
    }
}

/// A class, interface or enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub file_path: String,
    /// Framework/style label, assigned after classification.
    #[serde(default = "unclassified")]
    pub classification: String,
    #[serde(default)]
    pub java_type: JavaKind,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub is_abstract: bool,
}

fn unclassified() -> String {
    UNCLASSIFIED.to_string()
}

impl ClassRecord {
    pub fn new(
        name: impl Into<String>,
        package: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            file_path: file_path.into(),
            classification: unclassified(),
            java_type: JavaKind::Class,
            modifiers: Vec::new(),
            annotations: Vec::new(),
            interfaces: Vec::new(),
            superclass: None,
            is_abstract: false,
        }
    }

    pub fn with_kind(mut self, kind: JavaKind) -> Self {
        self.java_type = kind;
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationUse) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_modifiers(mut self, modifiers: &[&str]) -> Self {
        self.modifiers = modifiers.iter().map(|m| m.to_string()).collect();
        self.is_abstract = self.is_abstract || modifiers.contains(&"abstract");
        self
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Fully-qualified name.
    pub fn fqn(&self) -> String {
        ids::qualify(&self.package, &self.name)
    }

    pub fn id(&self) -> String {
        ids::class_id(&self.fqn())
    }

    pub fn node_kind(&self) -> NodeKind {
        self.java_type.node_kind()
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.name.trim().is_empty() {
            return Err(RecordError::missing("class", "name"));
        }
        Ok(())
    }
}

/// A formal parameter of a method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub param_type: String,
    pub name: String,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
}

impl Parameter {
    pub fn new(param_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            param_type: param_type.into(),
            name: name.into(),
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: AnnotationUse) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// A method or constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodRecord {
    pub name: String,
    /// Fully-qualified name of the declaring class.
    pub class_name: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub return_type: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
    /// Source of the body, kept for relationship mining.
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub line_start: u32,
    #[serde(default)]
    pub line_end: u32,
}

impl MethodRecord {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            signature: format!("{}()", name),
            name,
            class_name: class_name.into(),
            return_type: "void".to_string(),
            parameters: Vec::new(),
            modifiers: Vec::new(),
            annotations: Vec::new(),
            body: None,
            line_start: 0,
            line_end: 0,
        }
    }

    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into();
        self
    }

    /// Appends a parameter and refreshes the signature.
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| format!("{} {}", p.param_type, p.name))
            .collect();
        self.signature = format!("{}({})", self.name, params.join(", "));
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationUse) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_lines(mut self, start: u32, end: u32) -> Self {
        self.line_start = start;
        self.line_end = end;
        self
    }

    pub fn id(&self) -> String {
        ids::method_id(&self.class_name, &self.name)
    }

    /// True when the method is named after its declaring class.
    pub fn is_constructor(&self) -> bool {
        self.name == ids::simple_name(&self.class_name)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.name.trim().is_empty() {
            return Err(RecordError::missing("method", "name"));
        }
        if self.class_name.trim().is_empty() {
            return Err(RecordError::missing("method", "class_name"));
        }
        Ok(())
    }
}

/// A field declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub name: String,
    pub class_name: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
    #[serde(default)]
    pub initial_value: Option<String>,
}

impl FieldRecord {
    pub fn new(
        name: impl Into<String>,
        class_name: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            field_type: field_type.into(),
            modifiers: Vec::new(),
            annotations: Vec::new(),
            initial_value: None,
        }
    }

    pub fn with_annotation(mut self, annotation: AnnotationUse) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn id(&self) -> String {
        ids::field_id(&self.class_name, &self.name)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.name.trim().is_empty() {
            return Err(RecordError::missing("field", "name"));
        }
        if self.class_name.trim().is_empty() {
            return Err(RecordError::missing("field", "class_name"));
        }
        Ok(())
    }
}

/// Where an endpoint parameter is bound from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamSource {
    Path,
    Query,
    Body,
    Header,
}

impl ParamSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
            Self::Header => "header",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointParam {
    pub name: String,
    #[serde(rename = "type", default)]
    pub param_type: String,
    pub source: ParamSource,
}

/// An HTTP endpoint and the method handling it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub http_method: String,
    pub path: String,
    pub handler_method: String,
    /// Fully-qualified name of the handler's class.
    pub handler_class: String,
    #[serde(default)]
    pub params: Vec<EndpointParam>,
    #[serde(default)]
    pub consumes: Vec<String>,
    #[serde(default)]
    pub produces: Vec<String>,
}

impl EndpointRecord {
    pub fn new(
        http_method: impl Into<String>,
        path: impl Into<String>,
        handler_class: impl Into<String>,
        handler_method: impl Into<String>,
    ) -> Self {
        Self {
            http_method: http_method.into(),
            path: path.into(),
            handler_method: handler_method.into(),
            handler_class: handler_class.into(),
            params: Vec::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
        }
    }

    pub fn id(&self) -> String {
        ids::endpoint_id(&self.http_method, &self.path)
    }

    pub fn handler_id(&self) -> String {
        ids::method_id(&self.handler_class, &self.handler_method)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.http_method.trim().is_empty() {
            return Err(RecordError::missing("endpoint", "http_method"));
        }
        if self.path.trim().is_empty() {
            return Err(RecordError::missing("endpoint", "path"));
        }
        if self.handler_class.trim().is_empty() {
            return Err(RecordError::missing("endpoint", "handler_class"));
        }
        if self.handler_method.trim().is_empty() {
            return Err(RecordError::missing("endpoint", "handler_method"));
        }
        Ok(())
    }
}

/// Everything the extractor produced for a batch of source files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedUnit {
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
    #[serde(default)]
    pub methods: Vec<MethodRecord>,
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
    /// Endpoints the extractor already resolved; mapping annotations on
    /// methods produce more during ingestion.
    #[serde(default)]
    pub endpoints: Vec<EndpointRecord>,
}

impl ExtractedUnit {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.methods.is_empty()
            && self.fields.is_empty()
            && self.endpoints.is_empty()
    }
}
