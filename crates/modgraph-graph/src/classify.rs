//! API style classification from a graph signature.

use crate::graph::KnowledgeGraph;
use crate::summary::ApiSignature;
use serde::Serialize;

/// An API style a codebase can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ApiStyle {
    #[serde(rename = "REST")]
    Rest,
    #[serde(rename = "SOAP")]
    Soap,
    #[serde(rename = "GraphQL")]
    GraphQl,
    #[serde(rename = "RPC")]
    Rpc,
}

impl ApiStyle {
    /// Scoring order; earlier styles win ties.
    pub const ALL: [ApiStyle; 4] = [Self::Rest, Self::Soap, Self::GraphQl, Self::Rpc];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rest => "REST",
            Self::Soap => "SOAP",
            Self::GraphQl => "GraphQL",
            Self::Rpc => "RPC",
        }
    }

    /// Annotation name fragments that indicate this style.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Rest => &["RequestMapping", "GetMapping", "PostMapping", "RestController"],
            Self::Soap => &["WebService", "WebMethod"],
            Self::GraphQl => &["GraphQLQuery", "GraphQLMutation"],
            Self::Rpc => &["JsonRpc", "Rpc"],
        }
    }
}

impl std::fmt::Display for ApiStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classifier's verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub primary_style: ApiStyle,
    pub scores: Vec<(ApiStyle, usize)>,
    pub endpoint_count: usize,
    pub has_rest_endpoints: bool,
}

impl Classification {
    /// Label stored on class nodes, e.g. `rest`.
    pub fn label(&self) -> String {
        self.primary_style.as_str().to_ascii_lowercase()
    }
}

/// Assigns a style to a codebase from its signature.
///
/// Implementations may be heuristic or call out to an external model; the
/// signature is their whole view of the graph.
pub trait PatternClassifier {
    fn classify(&self, signature: &ApiSignature) -> Classification;
}

/// Scores styles by counting annotation occurrences that contain one of the
/// style's keywords.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl PatternClassifier for HeuristicClassifier {
    fn classify(&self, signature: &ApiSignature) -> Classification {
        let scores: Vec<(ApiStyle, usize)> = ApiStyle::ALL
            .iter()
            .map(|&style| {
                let score = signature
                    .annotation_counts
                    .iter()
                    .filter(|r| style.keywords().iter().any(|k| r.name.contains(k)))
                    .map(|r| r.count)
                    .sum::<usize>();
                (style, score)
            })
            .collect();

        let mut primary = ApiStyle::Rest;
        let mut best = 0;
        for &(style, score) in &scores {
            if score > best {
                primary = style;
                best = score;
            }
        }

        Classification {
            primary_style: primary,
            scores,
            endpoint_count: signature.endpoints.total,
            has_rest_endpoints: signature.endpoints.total > 0,
        }
    }
}

/// Richardson maturity assessment of the REST surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestMaturity {
    pub level: u8,
    pub max_level: u8,
    pub description: &'static str,
    pub http_methods: Vec<String>,
    pub endpoint_count: usize,
    pub recommendations: Vec<&'static str>,
}

/// Rates the graph's endpoints on the Richardson model.
///
/// Level 1 needs resource paths; level 2 needs more than one HTTP verb.
/// Level 3 (hypermedia) cannot be seen statically and is never reported.
pub fn rest_maturity(graph: &KnowledgeGraph) -> RestMaturity {
    let mut http_methods: Vec<String> = Vec::new();
    let mut has_resources = false;
    let mut endpoint_count = 0;

    for (_, endpoint) in graph.endpoints() {
        endpoint_count += 1;
        has_resources |= endpoint.path.contains('/');
        if !http_methods.contains(&endpoint.http_method) {
            http_methods.push(endpoint.http_method.clone());
        }
    }

    let level = if http_methods.len() > 1 {
        2
    } else if has_resources {
        1
    } else {
        0
    };

    RestMaturity {
        level,
        max_level: 3,
        description: maturity_description(level, endpoint_count),
        http_methods,
        endpoint_count,
        recommendations: recommendations(level),
    }
}

fn maturity_description(level: u8, endpoints: usize) -> &'static str {
    match level {
        _ if endpoints == 0 => "No REST endpoints found",
        0 => "No REST endpoints - uses legacy/SOAP patterns",
        1 => "Resource-based APIs - basic REST structure",
        2 => "HTTP Verbs used - proper REST implementation",
        _ => "HATEOAS implemented - fully mature REST API",
    }
}

fn recommendations(level: u8) -> Vec<&'static str> {
    match level {
        0 => vec![
            "Migrate to REST architecture",
            "Create resource-based endpoints",
            "Use standard HTTP methods",
        ],
        1 => vec![
            "Implement proper HTTP method verbs (GET, POST, PUT, DELETE)",
            "Add versioning to API paths",
            "Standardize error responses",
        ],
        2 => vec![
            "Implement HATEOAS for discoverability",
            "Add comprehensive API documentation",
            "Consider API versioning strategy",
        ],
        _ => vec![
            "Maintain comprehensive API documentation",
            "Monitor API versioning strategy",
            "Consider adding caching strategies",
        ],
    }
}

/// Classifies the graph and writes the label onto every class.
pub fn apply_classification(
    graph: &mut KnowledgeGraph,
    classifier: &dyn PatternClassifier,
    signature: &ApiSignature,
) -> Classification {
    let result = classifier.classify(signature);
    let label = result.label();
    let class_ids: Vec<String> = graph.classes().map(|(id, _)| id.to_string()).collect();
    for id in class_ids {
        graph.set_classification(&id, &label);
    }
    result
}
