//! Architecture and security assessment from graph facts.
//!
//! Both reports are read-only heuristics over the annotations, names and
//! endpoints already in the graph. Nothing outside the graph is consulted.

use crate::graph::KnowledgeGraph;
use modgraph_core::{AnnotationUse, JavaKind};
use serde::Serialize;
use std::collections::HashSet;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    /// Points subtracted from the security score per finding.
    fn penalty(&self) -> u8 {
        match self {
            Self::Low => 5,
            Self::Medium => 10,
            Self::High => 20,
            Self::Critical => 30,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simple annotation names on every class, method and field.
struct AnnotationIndex {
    names: Vec<String>,
}

impl AnnotationIndex {
    fn of(graph: &KnowledgeGraph) -> Self {
        let names = graph
            .nodes()
            .flat_map(|n| n.entity.annotations())
            .map(|a| AnnotationUse::simple_name(a).to_string())
            .collect();
        Self { names }
    }

    /// True if any annotation name contains one of the fragments.
    fn any(&self, fragments: &[&str]) -> bool {
        self.names
            .iter()
            .any(|name| fragments.iter().any(|f| name.contains(f)))
    }

    fn count(&self, fragments: &[&str]) -> usize {
        self.names
            .iter()
            .filter(|name| fragments.iter().any(|f| name.contains(f)))
            .count()
    }
}

const DI: &[&str] = &["Autowired", "Inject"];
const ASYNC: &[&str] = &["Async", "CompletableFuture"];
const CACHING: &[&str] = &["Cache"];
const STEREOTYPES: &[&str] = &["Service", "Controller", "Repository", "Component"];
const AUTH: &[&str] = &["Auth", "Security"];
const VALIDATION: &[&str] = &["Valid", "RequestBody"];
const ERROR_HANDLING: &[&str] = &["Exception"];
const SQL: &[&str] = &["Query", "SQL"];
const LOGGING: &[&str] = &["Log"];
const USER_INPUT: &[&str] = &["RequestParam", "RequestBody"];
const ENCRYPTION: &[&str] = &["Encrypt", "Crypto"];
const ACCESS_CONTROL: &[&str] = &["PreAuthorize", "Secured"];
const TRANSPORT: &[&str] = &["Ssl", "Https", "RequiresChannel"];

/// Estimated technical debt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnicalDebt {
    /// 0-100, ten points per item.
    pub score: u8,
    pub items: Vec<&'static str>,
    pub severity: Severity,
}

/// Quality scores for the codebase's structure. Scores range over 0-100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchitectureReport {
    /// Distinct packages per class, as a percentage.
    pub modularity: f64,
    pub scalability: u8,
    pub maintainability: u8,
    pub testability: u8,
    /// Mean of the four scores above.
    pub overall: f64,
    pub concerns: Vec<&'static str>,
    pub technical_debt: TechnicalDebt,
}

/// Scores modularity, scalability, maintainability and testability.
pub fn assess_architecture(graph: &KnowledgeGraph) -> ArchitectureReport {
    let annotations = AnnotationIndex::of(graph);
    let has_di = annotations.any(DI);
    let has_error_handling = annotations.any(ERROR_HANDLING);

    let modularity = modularity(graph);

    let mut scalability: u8 = 50;
    if has_di {
        scalability += 15;
    }
    if annotations.any(ASYNC) {
        scalability += 15;
    }
    if annotations.any(CACHING) {
        scalability += 10;
    }
    if graph.counts().endpoints > 10 {
        scalability += 10;
    }

    let mut maintainability: u8 = 40;
    if graph.counts().classes > 20 {
        maintainability += 15;
    }
    if annotations.count(STEREOTYPES) > 3 {
        maintainability += 25;
    }
    if has_clear_naming(graph) {
        maintainability += 20;
    }

    let mut testability: u8 = 30;
    if has_di {
        testability += 30;
    }
    if uses_interfaces(graph) {
        testability += 20;
    }
    if has_small_methods(graph) {
        testability += 20;
    }

    let mut concerns = Vec::new();
    if !annotations.any(AUTH) {
        concerns.push("No authentication patterns detected");
    }
    if !annotations.any(VALIDATION) {
        concerns.push("No input validation patterns detected");
    }
    if !has_error_handling {
        concerns.push("Inadequate error handling");
    }
    if annotations.any(SQL) {
        concerns.push("Potential SQL injection risks");
    }

    let mut items = Vec::new();
    if !annotations.any(LOGGING) {
        items.push("Missing comprehensive logging");
    }
    if !has_error_handling {
        items.push("Insufficient error handling");
    }
    let score = (items.len() * 10).min(100) as u8;
    let severity = match score {
        s if s > 50 => Severity::High,
        s if s > 25 => Severity::Medium,
        _ => Severity::Low,
    };

    let overall = round1(
        (modularity + f64::from(scalability) + f64::from(maintainability) + f64::from(testability))
            / 4.0,
    );

    ArchitectureReport {
        modularity,
        scalability: scalability.min(100),
        maintainability: maintainability.min(100),
        testability: testability.min(100),
        overall,
        concerns,
        technical_debt: TechnicalDebt {
            score,
            items,
            severity,
        },
    }
}

fn modularity(graph: &KnowledgeGraph) -> f64 {
    let classes = graph.counts().classes;
    if classes == 0 {
        return 0.0;
    }
    let packages: HashSet<&str> = graph
        .classes()
        .map(|(_, c)| c.package.as_str())
        .filter(|p| !p.is_empty())
        .collect();
    round1((packages.len() as f64 / classes as f64 * 100.0).min(100.0))
}

/// More than 70% of method names are longer than three characters.
fn has_clear_naming(graph: &KnowledgeGraph) -> bool {
    let (total, descriptive) = graph.methods().fold((0usize, 0usize), |(t, d), (_, m)| {
        (t + 1, d + usize::from(m.name.chars().count() > 3))
    });
    total > 0 && descriptive as f64 / total as f64 > 0.7
}

fn uses_interfaces(graph: &KnowledgeGraph) -> bool {
    graph
        .classes()
        .any(|(_, c)| c.java_type == JavaKind::Interface || !c.interfaces.is_empty())
}

/// Average method length under 30 lines. Methods without line info count
/// as one line.
fn has_small_methods(graph: &KnowledgeGraph) -> bool {
    let (total, lines) = graph.methods().fold((0usize, 0usize), |(t, l), (_, m)| {
        let span = if m.line_end >= m.line_start && m.line_start > 0 {
            (m.line_end - m.line_start + 1) as usize
        } else {
            1
        };
        (t + 1, l + span)
    });
    total == 0 || (lines as f64 / total as f64) < 30.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A potential vulnerability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vulnerability {
    pub severity: Severity,
    pub title: &'static str,
    pub description: &'static str,
    pub recommendation: &'static str,
}

/// A compliance control that was not found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceGap {
    pub framework: &'static str,
    pub requirement: &'static str,
    pub priority: Severity,
}

/// Data-protection measures visible in the annotations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DataProtection {
    pub encryption: bool,
    pub access_control: bool,
    pub audit_logging: bool,
    pub input_validation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityReport {
    /// 100 minus severity-weighted penalties, floored at 0.
    pub score: u8,
    pub vulnerabilities: Vec<Vulnerability>,
    pub compliance_gaps: Vec<ComplianceGap>,
    pub data_protection: DataProtection,
}

/// Flags vulnerability risks, compliance gaps and data-protection measures.
pub fn assess_security(graph: &KnowledgeGraph) -> SecurityReport {
    let annotations = AnnotationIndex::of(graph);
    let mut vulnerabilities = Vec::new();

    if annotations.any(&["Query"]) {
        vulnerabilities.push(Vulnerability {
            severity: Severity::High,
            title: "SQL Injection Risk",
            description: "Found SQL queries - ensure parameterized statements are used",
            recommendation: "Use prepared statements and ORM frameworks",
        });
    }
    if annotations.any(USER_INPUT) {
        vulnerabilities.push(Vulnerability {
            severity: Severity::Medium,
            title: "XSS Vulnerability Risk",
            description: "User input detected - ensure proper sanitization",
            recommendation: "Sanitize request input and encode output",
        });
    }
    if !annotations.any(AUTH) {
        vulnerabilities.push(Vulnerability {
            severity: Severity::Critical,
            title: "Missing Authentication",
            description: "No authentication patterns found",
            recommendation: "Add an authentication layer such as OAuth2",
        });
    }
    let has_endpoints = graph.counts().endpoints > 0;
    let https_visible = graph
        .endpoints()
        .any(|(_, e)| e.path.to_ascii_lowercase().contains("https"))
        || annotations.any(TRANSPORT);
    if has_endpoints && !https_visible {
        vulnerabilities.push(Vulnerability {
            severity: Severity::High,
            title: "No HTTPS Enforcement",
            description: "API endpoints should enforce HTTPS",
            recommendation: "Enable TLS and enforce it in configuration",
        });
    }

    let data_protection = DataProtection {
        encryption: annotations.any(ENCRYPTION),
        access_control: annotations.any(ACCESS_CONTROL),
        audit_logging: annotations.any(LOGGING),
        input_validation: annotations.any(VALIDATION),
    };

    let mut compliance_gaps = Vec::new();
    if !data_protection.audit_logging {
        compliance_gaps.push(ComplianceGap {
            framework: "SOC2",
            requirement: "Audit Logging",
            priority: Severity::High,
        });
    }
    if !data_protection.encryption {
        compliance_gaps.push(ComplianceGap {
            framework: "GDPR/HIPAA",
            requirement: "Data Encryption",
            priority: Severity::High,
        });
    }
    if !data_protection.access_control {
        compliance_gaps.push(ComplianceGap {
            framework: "SOC2",
            requirement: "Access Control",
            priority: Severity::High,
        });
    }

    let penalty: u32 = vulnerabilities
        .iter()
        .map(|v| u32::from(v.severity.penalty()))
        .chain(compliance_gaps.iter().map(|_| 5))
        .sum();
    let score = 100u32.saturating_sub(penalty) as u8;

    SecurityReport {
        score,
        vulnerabilities,
        compliance_gaps,
        data_protection,
    }
}
