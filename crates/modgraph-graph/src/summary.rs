//! Bounded statistical signature of a whole graph.
//!
//! The signature is what a classifier sees instead of the graph itself.
//! Every list in it is capped, so its size does not grow with the
//! codebase; only raw totals do.

use crate::graph::KnowledgeGraph;
use modgraph_core::{ids, AnnotationUse, ClassRecord, JavaKind};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{HashMap, HashSet};

/// Output bounds and heuristics for the summarizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub annotation_limit: usize,
    pub package_limit: usize,
    pub sample_path_limit: usize,
    pub representative_limit: usize,
    pub inheritance_limit: usize,
    /// Annotation names that mark an injection point.
    pub di_markers: Vec<String>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            annotation_limit: 20,
            package_limit: 10,
            sample_path_limit: 5,
            representative_limit: 10,
            inheritance_limit: 10,
            di_markers: vec!["Autowired".to_string()],
        }
    }
}

/// A name with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranked {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub classes: usize,
    pub methods: usize,
    pub fields: usize,
    pub endpoints: usize,
}

/// Classes by declared kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeBreakdown {
    pub class: usize,
    pub interface: usize,
    #[serde(rename = "enum")]
    pub enumeration: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageSummary {
    pub top_packages: Vec<Ranked>,
    /// Two-segment prefixes such as `org.springframework`.
    pub top_prefixes: Vec<Ranked>,
    pub distinct_packages: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InheritanceSummary {
    pub classes_with_superclass: usize,
    pub classes_with_interfaces: usize,
    pub abstract_classes: usize,
    pub top_superclasses: Vec<Ranked>,
    pub top_interfaces: Vec<Ranked>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EndpointSummary {
    pub total: usize,
    pub http_methods: Vec<Ranked>,
    /// First paths in insertion order.
    pub sample_paths: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiHints {
    pub field_injection: usize,
    pub constructor_injection: usize,
    pub setter_injection: usize,
}

/// Condensed view of one annotated class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSample {
    pub name: String,
    pub kind: JavaKind,
    pub package: String,
    pub annotations: Vec<String>,
    pub interfaces: Vec<String>,
    pub superclass: Option<String>,
    pub is_abstract: bool,
}

impl From<&ClassRecord> for ClassSample {
    fn from(class: &ClassRecord) -> Self {
        Self {
            name: class.name.clone(),
            kind: class.java_type,
            package: class.package.clone(),
            annotations: class
                .annotations
                .iter()
                .map(|a| a.simple_name().to_string())
                .collect(),
            interfaces: class.interfaces.clone(),
            superclass: class.superclass.clone(),
            is_abstract: class.is_abstract,
        }
    }
}

/// The bounded signature of a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiSignature {
    pub totals: Totals,
    pub type_breakdown: TypeBreakdown,
    /// Most frequent annotations on classes and methods, as `{name: count}`.
    #[serde(serialize_with = "ranked_as_map")]
    pub annotation_counts: Vec<Ranked>,
    pub packages: PackageSummary,
    pub inheritance: InheritanceSummary,
    pub endpoints: EndpointSummary,
    pub di_hints: DiHints,
    pub representative_classes: Vec<ClassSample>,
}

impl ApiSignature {
    pub fn annotation_count(&self, name: &str) -> usize {
        self.annotation_counts
            .iter()
            .find(|r| r.name == name)
            .map_or(0, |r| r.count)
    }
}

/// Reduces a graph to an [`ApiSignature`].
#[derive(Debug, Clone, Default)]
pub struct GraphSummarizer {
    config: SummarizerConfig,
}

impl GraphSummarizer {
    pub fn new(config: SummarizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// Computes the signature. Never fails, even on an empty graph.
    pub fn summarize(&self, graph: &KnowledgeGraph) -> ApiSignature {
        let counts = graph.counts();
        ApiSignature {
            totals: Totals {
                classes: counts.classes,
                methods: counts.methods,
                fields: counts.fields,
                endpoints: counts.endpoints,
            },
            type_breakdown: type_breakdown(graph),
            annotation_counts: self.annotation_counts(graph),
            packages: self.packages(graph),
            inheritance: self.inheritance(graph),
            endpoints: self.endpoints(graph),
            di_hints: self.di_hints(graph),
            representative_classes: self.representatives(graph),
        }
    }

    fn annotation_counts(&self, graph: &KnowledgeGraph) -> Vec<Ranked> {
        let names = graph
            .classes()
            .flat_map(|(_, c)| c.annotations.iter())
            .chain(graph.methods().flat_map(|(_, m)| m.annotations.iter()))
            .map(AnnotationUse::simple_name);
        top_n(names, self.config.annotation_limit)
    }

    fn packages(&self, graph: &KnowledgeGraph) -> PackageSummary {
        let packages: Vec<&str> = graph
            .classes()
            .map(|(_, c)| c.package.as_str())
            .filter(|p| !p.is_empty())
            .collect();
        let distinct: HashSet<&str> = packages.iter().copied().collect();
        let prefixes: Vec<String> = packages.iter().map(|p| two_segment_prefix(p)).collect();

        PackageSummary {
            top_packages: top_n(packages.iter().copied(), self.config.package_limit),
            top_prefixes: top_n(prefixes.iter().map(String::as_str), self.config.package_limit),
            distinct_packages: distinct.len(),
        }
    }

    fn inheritance(&self, graph: &KnowledgeGraph) -> InheritanceSummary {
        let mut summary = InheritanceSummary::default();
        let mut superclasses = Vec::new();
        let mut interfaces = Vec::new();

        for (_, class) in graph.classes() {
            if let Some(parent) = class.superclass.as_deref() {
                summary.classes_with_superclass += 1;
                superclasses.push(ids::simple_name(parent));
            }
            if !class.interfaces.is_empty() {
                summary.classes_with_interfaces += 1;
                interfaces.extend(class.interfaces.iter().map(|i| ids::simple_name(i)));
            }
            if class.is_abstract {
                summary.abstract_classes += 1;
            }
        }

        summary.top_superclasses = top_n(superclasses, self.config.inheritance_limit);
        summary.top_interfaces = top_n(interfaces, self.config.inheritance_limit);
        summary
    }

    fn endpoints(&self, graph: &KnowledgeGraph) -> EndpointSummary {
        let mut verbs = Vec::new();
        let mut sample_paths = Vec::new();
        let mut total = 0;

        for (_, endpoint) in graph.endpoints() {
            total += 1;
            verbs.push(endpoint.http_method.as_str());
            if sample_paths.len() < self.config.sample_path_limit {
                sample_paths.push(endpoint.path.clone());
            }
        }

        EndpointSummary {
            total,
            http_methods: top_n(verbs, usize::MAX),
            sample_paths,
        }
    }

    fn di_hints(&self, graph: &KnowledgeGraph) -> DiHints {
        let is_marker = |annotations: &[AnnotationUse]| {
            annotations
                .iter()
                .any(|a| self.config.di_markers.iter().any(|m| a.is(m)))
        };

        let mut hints = DiHints::default();
        hints.field_injection = graph
            .fields()
            .filter(|(_, f)| is_marker(f.annotations.as_slice()))
            .count();

        for (_, method) in graph.methods().filter(|(_, m)| is_marker(m.annotations.as_slice())) {
            if method.name == ids::simple_name(&method.class_name) {
                hints.constructor_injection += 1;
            } else if method.name.starts_with("set") {
                hints.setter_injection += 1;
            }
        }
        hints
    }

    fn representatives(&self, graph: &KnowledgeGraph) -> Vec<ClassSample> {
        graph
            .classes()
            .filter(|(_, c)| !c.annotations.is_empty())
            .take(self.config.representative_limit)
            .map(|(_, c)| ClassSample::from(c))
            .collect()
    }
}

fn type_breakdown(graph: &KnowledgeGraph) -> TypeBreakdown {
    let mut breakdown = TypeBreakdown::default();
    for (_, class) in graph.classes() {
        match class.java_type {
            JavaKind::Class => breakdown.class += 1,
            JavaKind::Interface => breakdown.interface += 1,
            JavaKind::Enum => breakdown.enumeration += 1,
        }
    }
    breakdown
}

fn two_segment_prefix(package: &str) -> String {
    package.splitn(3, '.').take(2).collect::<Vec<_>>().join(".")
}

/// Counts occurrences and keeps the `limit` most frequent.
///
/// Equal counts keep first-encounter order.
fn top_n<'a>(items: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<Ranked> {
    let mut ranked: Vec<Ranked> = Vec::new();
    let mut position: HashMap<&'a str, usize> = HashMap::new();

    for item in items {
        match position.get(item) {
            Some(&i) => ranked[i].count += 1,
            None => {
                position.insert(item, ranked.len());
                ranked.push(Ranked {
                    name: item.to_string(),
                    count: 1,
                });
            }
        }
    }

    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

fn ranked_as_map<S: Serializer>(ranked: &[Ranked], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(ranked.len()))?;
    for entry in ranked {
        map.serialize_entry(&entry.name, &entry.count)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use modgraph_core::{EndpointRecord, FieldRecord, MethodRecord};

    #[test]
    fn test_empty_graph() {
        let graph = KnowledgeGraph::new();
        let signature = GraphSummarizer::default().summarize(&graph);

        assert_eq!(signature, ApiSignature::default());
    }

    #[test]
    fn test_top_n_ties_keep_encounter_order() {
        let ranked = top_n(["b", "a", "c", "a", "b"], 2);
        assert_eq!(ranked[0].name, "b");
        assert_eq!(ranked[1].name, "a");
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_annotation_occurrences_are_not_deduplicated() {
        let mut graph = KnowledgeGraph::new();
        graph.add_class(
            ClassRecord::new("Foo", "com.x", "Foo.java")
                .with_annotation(AnnotationUse::new("Tag"))
                .with_annotation(AnnotationUse::new("@Tag"))
                .with_annotation(AnnotationUse::new("Service")),
        );
        let signature = GraphSummarizer::default().summarize(&graph);
        assert_eq!(signature.annotation_count("Tag"), 2);
        assert_eq!(signature.annotation_count("Service"), 1);
    }

    #[test]
    fn test_packages_and_prefixes() {
        let mut graph = KnowledgeGraph::new();
        graph.add_class(ClassRecord::new("A", "org.acme.web", "A.java"));
        graph.add_class(ClassRecord::new("B", "org.acme.web", "B.java"));
        graph.add_class(ClassRecord::new("C", "org.acme.data", "C.java"));
        graph.add_class(ClassRecord::new("D", "util", "D.java"));

        let packages = GraphSummarizer::default().summarize(&graph).packages;
        assert_eq!(packages.distinct_packages, 3);
        assert_eq!(packages.top_packages[0], Ranked { name: "org.acme.web".into(), count: 2 });
        assert_eq!(packages.top_prefixes[0], Ranked { name: "org.acme".into(), count: 3 });
        assert_eq!(packages.top_prefixes[1].name, "util");
    }

    #[test]
    fn test_endpoint_samples_are_bounded() {
        let mut graph = KnowledgeGraph::new();
        for i in 0..12 {
            let verb = if i % 3 == 0 { "POST" } else { "GET" };
            graph.add_endpoint(EndpointRecord::new(verb, format!("/r/{}", i), "com.x.C", "h"));
        }
        let endpoints = GraphSummarizer::default().summarize(&graph).endpoints;

        assert_eq!(endpoints.total, 12);
        assert_eq!(endpoints.sample_paths, vec!["/r/0", "/r/1", "/r/2", "/r/3", "/r/4"]);
        assert_eq!(endpoints.http_methods[0], Ranked { name: "GET".into(), count: 8 });
        assert_eq!(endpoints.http_methods[1], Ranked { name: "POST".into(), count: 4 });
    }

    #[test]
    fn test_di_hints() {
        let autowired = || AnnotationUse::new("Autowired");
        let mut graph = KnowledgeGraph::new();
        graph.add_class(ClassRecord::new("Svc", "com.x", "Svc.java"));
        graph.add_field(FieldRecord::new("repo", "com.x.Svc", "Repo").with_annotation(autowired()));
        graph.add_field(FieldRecord::new("plain", "com.x.Svc", "int"));
        graph.add_method(MethodRecord::new("Svc", "com.x.Svc").with_annotation(autowired()));
        graph.add_method(MethodRecord::new("setRepo", "com.x.Svc").with_annotation(autowired()));
        graph.add_method(MethodRecord::new("init", "com.x.Svc").with_annotation(autowired()));

        let hints = GraphSummarizer::default().summarize(&graph).di_hints;
        assert_eq!(hints.field_injection, 1);
        assert_eq!(hints.constructor_injection, 1);
        assert_eq!(hints.setter_injection, 1);
    }

    #[test]
    fn test_custom_di_marker() {
        let config = SummarizerConfig {
            di_markers: vec!["Inject".to_string()],
            ..SummarizerConfig::default()
        };
        let mut graph = KnowledgeGraph::new();
        graph.add_field(
            FieldRecord::new("repo", "com.x.Svc", "Repo")
                .with_annotation(AnnotationUse::new("javax.inject.Inject")),
        );
        let hints = GraphSummarizer::new(config).summarize(&graph).di_hints;
        assert_eq!(hints.field_injection, 1);
    }

    #[test]
    fn test_representatives_skip_unannotated() {
        let mut graph = KnowledgeGraph::new();
        graph.add_class(ClassRecord::new("Plain", "com.x", "Plain.java"));
        for i in 0..15 {
            graph.add_class(
                ClassRecord::new(format!("C{}", i), "com.x", "C.java")
                    .with_annotation(AnnotationUse::new("Component")),
            );
        }
        let samples = GraphSummarizer::default().summarize(&graph).representative_classes;
        assert_eq!(samples.len(), 10);
        assert_eq!(samples[0].name, "C0");
        assert!(samples.iter().all(|s| !s.annotations.is_empty()));
    }

    #[test]
    fn test_annotation_counts_serialize_as_map() {
        let mut graph = KnowledgeGraph::new();
        graph.add_class(
            ClassRecord::new("Foo", "com.x", "Foo.java").with_annotation(AnnotationUse::new("Service")),
        );
        let json = serde_json::to_value(GraphSummarizer::default().summarize(&graph)).unwrap();
        assert_eq!(json["annotation_counts"]["Service"], 1);
        assert_eq!(json["type_breakdown"]["enum"], 0);
    }
}
