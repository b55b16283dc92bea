//! Relationship mining from method bodies.
//!
//! The body analyzer reports names; this module decides which of those
//! names refer to methods and fields the graph already knows, and writes
//! CALLS and ACCESSES edges for them. Anything that does not resolve is
//! an external or dynamic reference and is dropped.

use crate::edge::{Edge, EdgeKind};
use crate::graph::KnowledgeGraph;
use modgraph_core::{ids, AccessType, AnalyzeError, BodyAnalyzer, ClassRecord, MethodRecord};
use std::collections::HashSet;
use tracing::debug;

/// Upper bound on superclass hops, guarding against inheritance cycles in
/// malformed input.
const MAX_HIERARCHY_DEPTH: usize = 32;

/// Edges written for one method body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub calls: usize,
    pub accesses: usize,
}

/// Writes CALLS and ACCESSES edges derived from method bodies.
pub struct RelationshipExtractor {
    analyzer: BodyAnalyzer,
}

impl RelationshipExtractor {
    pub fn new() -> Result<Self, AnalyzeError> {
        Ok(Self {
            analyzer: BodyAnalyzer::new()?,
        })
    }

    /// Analyzes the body of `method` and links what it calls and touches.
    ///
    /// Methods without a body produce nothing. Repeated calls to the same
    /// target, or repeated reads of the same field, yield a single edge.
    pub fn extract(
        &mut self,
        graph: &mut KnowledgeGraph,
        method: &MethodRecord,
    ) -> Result<ExtractionStats, AnalyzeError> {
        let Some(body) = method.body.as_deref() else {
            return Ok(ExtractionStats::default());
        };

        let facts = self.analyzer.analyze(body)?;
        let caller = method.id();
        let scope = Scope::new(graph, method);
        let mut stats = ExtractionStats::default();

        let mut links: Vec<(String, Edge)> = Vec::new();
        let mut seen_calls: HashSet<String> = HashSet::new();

        for invocation in &facts.invocations {
            let target = match invocation.receiver.as_deref() {
                None | Some("this") => scope.find_method(graph, &scope.class_name, &invocation.name),
                Some("super") => scope
                    .superclass_of(graph, &scope.class_name)
                    .and_then(|parent| scope.find_method(graph, &parent, &invocation.name)),
                Some(receiver) => scope
                    .receiver_class(graph, receiver)
                    .and_then(|class| scope.find_method(graph, &class, &invocation.name)),
            }
            .or_else(|| match invocation.receiver.as_deref() {
                // Locals carry no type, so fall back to a name that only one class declares.
                Some(local) if facts.locals.contains(local) => unique_method(graph, &invocation.name),
                _ => None,
            });

            match target {
                Some(callee) if seen_calls.insert(callee.clone()) => {
                    links.push((callee, Edge::new(EdgeKind::Calls).with_line(invocation.line)));
                }
                Some(_) => {}
                None => debug!("Unresolved call {} in {}", invocation.name, caller),
            }
        }

        for type_name in &facts.instantiations {
            let Some(class) = graph.resolve_class(type_name, &scope.package) else {
                continue;
            };
            let constructor = ids::method_id(class, ids::simple_name(class));
            if graph.contains(&constructor) && seen_calls.insert(constructor.clone()) {
                links.push((constructor, Edge::new(EdgeKind::Calls)));
            }
        }

        let mut seen_fields: HashSet<(String, AccessType)> = HashSet::new();
        for field_use in &facts.field_uses {
            if !field_use.qualified && scope.params.contains(field_use.name.as_str()) {
                continue;
            }
            let Some(field) = scope.find_field(graph, &scope.class_name, &field_use.name) else {
                continue;
            };
            if seen_fields.insert((field.clone(), field_use.access)) {
                links.push((field, Edge::access(field_use.access)));
            }
        }

        for (target, edge) in links {
            let kind = edge.kind;
            if graph.add_relation(&caller, &target, edge) {
                match kind {
                    EdgeKind::Calls => stats.calls += 1,
                    _ => stats.accesses += 1,
                }
            }
        }

        Ok(stats)
    }
}

/// Name-resolution context for one method.
struct Scope<'m> {
    class_name: String,
    package: String,
    params: HashSet<&'m str>,
    method: &'m MethodRecord,
}

impl<'m> Scope<'m> {
    fn new(graph: &KnowledgeGraph, method: &'m MethodRecord) -> Self {
        let package = graph
            .get_class(&method.class_name)
            .map(|c| c.package.clone())
            .unwrap_or_else(|| package_of(&method.class_name).to_string());

        Self {
            class_name: method.class_name.clone(),
            package,
            params: method.parameters.iter().map(|p| p.name.as_str()).collect(),
            method,
        }
    }

    /// Looks for `name` on `class` and then up its superclass chain.
    fn find_method(&self, graph: &KnowledgeGraph, class: &str, name: &str) -> Option<String> {
        self.hierarchy(graph, class)
            .into_iter()
            .map(|c| ids::method_id(&c, name))
            .find(|id| graph.contains(id))
    }

    fn find_field(&self, graph: &KnowledgeGraph, class: &str, name: &str) -> Option<String> {
        self.hierarchy(graph, class)
            .into_iter()
            .map(|c| ids::field_id(&c, name))
            .find(|id| graph.contains(id))
    }

    /// `class` followed by its known ancestors.
    fn hierarchy(&self, graph: &KnowledgeGraph, class: &str) -> Vec<String> {
        let mut chain = vec![class.to_string()];
        let mut current = class.to_string();
        while chain.len() < MAX_HIERARCHY_DEPTH {
            match self.superclass_of(graph, &current) {
                Some(parent) if !chain.contains(&parent) => {
                    chain.push(parent.clone());
                    current = parent;
                }
                _ => break,
            }
        }
        chain
    }

    fn superclass_of(&self, graph: &KnowledgeGraph, class: &str) -> Option<String> {
        let record: &ClassRecord = graph.get_class(class)?;
        let parent = record.superclass.as_deref()?;
        graph
            .resolve_class(parent, &record.package)
            .map(str::to_string)
    }

    /// Resolves a receiver expression to the class it is an instance of.
    ///
    /// Tries fields of the enclosing class, then parameters, then treats
    /// the receiver as a class name for static calls.
    fn receiver_class(&self, graph: &KnowledgeGraph, receiver: &str) -> Option<String> {
        let receiver = receiver.strip_prefix("this.").unwrap_or(receiver);
        if !is_identifier(receiver) {
            return None;
        }

        if let Some(field) = self.find_field(graph, &self.class_name, receiver) {
            if let Some(record) = graph.get_field(&field) {
                return self.resolve_type(graph, &record.field_type);
            }
        }

        if let Some(param) = self.method.parameters.iter().find(|p| p.name == receiver) {
            return self.resolve_type(graph, &param.param_type);
        }

        graph
            .resolve_class(receiver, &self.package)
            .map(str::to_string)
    }

    fn resolve_type(&self, graph: &KnowledgeGraph, type_name: &str) -> Option<String> {
        let base = type_name.split('<').next().unwrap_or(type_name).trim();
        graph.resolve_class(base, &self.package).map(str::to_string)
    }
}

/// The single known method with this simple name, if there is exactly one.
fn unique_method(graph: &KnowledgeGraph, name: &str) -> Option<String> {
    let mut methods = graph
        .find_by_name(name)
        .into_iter()
        .filter(|n| n.as_method().is_some());
    match (methods.next(), methods.next()) {
        (Some(only), None) => Some(only.id.clone()),
        _ => None,
    }
}

fn package_of(fqn: &str) -> &str {
    fqn.rsplit_once('.').map(|(pkg, _)| pkg).unwrap_or("")
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use modgraph_core::{FieldRecord, Parameter};

    fn service_graph() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        graph.add_class(ClassRecord::new("UserRepository", "com.x.repo", "UserRepository.java"));
        graph.add_method(MethodRecord::new("save", "com.x.repo.UserRepository"));
        graph.add_method(MethodRecord::new("findAll", "com.x.repo.UserRepository"));

        graph.add_class(ClassRecord::new("UserService", "com.x.service", "UserService.java"));
        graph.add_field(FieldRecord::new("repo", "com.x.service.UserService", "UserRepository"));
        graph.add_field(FieldRecord::new("count", "com.x.service.UserService", "int"));
        graph.add_method(MethodRecord::new("validate", "com.x.service.UserService"));
        graph
    }

    #[test]
    fn test_calls_through_field_receiver() {
        let mut graph = service_graph();
        let method = MethodRecord::new("register", "com.x.service.UserService").with_body(
            "{ validate(); repo.save(); this.repo.save(); count = count + 1; }",
        );
        graph.add_method(method.clone());

        let mut extractor = RelationshipExtractor::new().unwrap();
        let stats = extractor.extract(&mut graph, &method).unwrap();

        assert_eq!(stats.calls, 2);
        assert_eq!(
            graph.methods_called_by(&method.id()),
            vec![
                "method:com.x.service.UserService.validate".to_string(),
                "method:com.x.repo.UserRepository.save".to_string(),
            ]
        );

        let count = "field:com.x.service.UserService.count";
        assert_eq!(graph.methods_accessing_field(count, Some(AccessType::Write)), vec![method.id()]);
        assert_eq!(graph.methods_accessing_field(count, Some(AccessType::Read)), vec![method.id()]);
    }

    #[test]
    fn test_unknown_calls_are_dropped() {
        let mut graph = service_graph();
        let method = MethodRecord::new("log", "com.x.service.UserService")
            .with_body("{ System.out.println(\"hi\"); java.util.Objects.hash(1); }");
        graph.add_method(method.clone());

        let mut extractor = RelationshipExtractor::new().unwrap();
        let stats = extractor.extract(&mut graph, &method).unwrap();
        assert_eq!(stats, ExtractionStats::default());
    }

    #[test]
    fn test_parameter_shadows_field() {
        let mut graph = service_graph();
        let method = MethodRecord::new("setCount", "com.x.service.UserService")
            .with_parameter(Parameter::new("int", "count"))
            .with_body("{ this.count = count; }");
        graph.add_method(method.clone());

        let mut extractor = RelationshipExtractor::new().unwrap();
        extractor.extract(&mut graph, &method).unwrap();

        let count = "field:com.x.service.UserService.count";
        assert_eq!(graph.methods_accessing_field(count, Some(AccessType::Write)), vec![method.id()]);
        assert!(graph.methods_accessing_field(count, Some(AccessType::Read)).is_empty());
    }

    #[test]
    fn test_parameter_receiver_and_constructor() {
        let mut graph = service_graph();
        graph.add_method(MethodRecord::new("UserService", "com.x.service.UserService"));
        let method = MethodRecord::new("copy", "com.x.service.UserService")
            .with_parameter(Parameter::new("UserRepository", "other"))
            .with_body("{ other.findAll(); UserService s = new UserService(); }");
        graph.add_method(method.clone());

        let mut extractor = RelationshipExtractor::new().unwrap();
        let stats = extractor.extract(&mut graph, &method).unwrap();

        assert_eq!(stats.calls, 2);
        let callees = graph.methods_called_by(&method.id());
        assert!(callees.contains(&"method:com.x.repo.UserRepository.findAll".to_string()));
        assert!(callees.contains(&"method:com.x.service.UserService.UserService".to_string()));
    }

    #[test]
    fn test_inherited_method_via_super() {
        let mut graph = KnowledgeGraph::new();
        graph.add_class(ClassRecord::new("Base", "com.x", "Base.java"));
        graph.add_method(MethodRecord::new("init", "com.x.Base"));
        graph.add_class(ClassRecord::new("Child", "com.x", "Child.java").with_superclass("Base"));
        let method = MethodRecord::new("init", "com.x.Child").with_body("{ super.init(); }");
        graph.add_method(method.clone());

        let mut extractor = RelationshipExtractor::new().unwrap();
        extractor.extract(&mut graph, &method).unwrap();

        assert_eq!(graph.methods_called_by(&method.id()), vec!["method:com.x.Base.init".to_string()]);
    }
}
