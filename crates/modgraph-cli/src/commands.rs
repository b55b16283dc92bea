//! CLI command implementations.

use crate::config::{Config, CONFIG_DIR};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use modgraph_core::{ids, AccessType, ExtractedUnit, NodeKind};
use modgraph_graph::{
    apply_classification, assess_architecture, assess_security, documents, rest_maturity,
    Direction, EdgeKind, GraphBuilder, GraphStore, GraphSummarizer, HeuristicClassifier,
    KnowledgeGraph, PatternClassifier, Severity, Snapshot,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Anything the CLI accepts as a graph source.
#[derive(Deserialize)]
#[serde(untagged)]
enum GraphInput {
    Snapshot(Snapshot),
    Units(Vec<ExtractedUnit>),
    Unit(ExtractedUnit),
}

/// Initialize Modgraph in a directory.
pub fn init(path: &Path) -> Result<()> {
    let config_dir = path.join(CONFIG_DIR);

    if config_dir.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(&config_dir)?;

    let config_path = Config::path_in(path);
    fs::write(&config_path, serde_json::to_string_pretty(&Config::default())?)?;

    println!("{} Initialized Modgraph in {}", "✓".green(), path.display());
    println!(
        "  Run {} to build the graph",
        "modgraph ingest <records.json>".cyan()
    );

    Ok(())
}

/// Build the graph from extracted records and write a snapshot.
pub fn ingest(input: &Path, output: &Path, store: Option<&Path>, no_bodies: bool) -> Result<()> {
    println!("{}", "Building knowledge graph...".cyan());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message("Reading records...");

    let units = read_units(input)?;

    spinner.set_message("Linking relationships...");
    let mut builder = if no_bodies {
        GraphBuilder::new().without_body_analysis()
    } else {
        GraphBuilder::new()
    };
    for unit in units {
        builder.add_unit(unit);
    }
    let (graph, report) = builder.build()?;

    spinner.finish_and_clear();

    println!(
        "{} Ingested {} classes, {} methods, {} fields, {} endpoints",
        "✓".green(),
        report.classes.to_string().cyan(),
        report.methods.to_string().cyan(),
        report.fields.to_string().cyan(),
        report.endpoints.to_string().cyan()
    );
    println!(
        "  {} calls, {} accesses, {} structural edges",
        report.calls, report.accesses, report.structural
    );

    if report.rejected > 0 {
        println!("{} {} records rejected", "⚠".yellow(), report.rejected);
    }
    if report.unparsed_bodies > 0 {
        println!(
            "{} {} method bodies could not be analyzed",
            "⚠".yellow(),
            report.unparsed_bodies
        );
    }
    if report.reconcile.unresolved > 0 {
        println!(
            "  {} links point at entities outside the codebase",
            report.reconcile.unresolved.to_string().dimmed()
        );
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let snapshot = graph.snapshot();
    snapshot.save_json(output)?;
    println!("{} Wrote snapshot to {}", "✓".green(), output.display());

    if let Some(dir) = store {
        GraphStore::open(dir)?.save_snapshot(&snapshot)?;
        println!("{} Saved to store {}", "✓".green(), dir.display());
    }

    Ok(())
}

/// Show graph statistics.
pub fn stats(graph_path: &Path) -> Result<()> {
    let graph = load_graph(graph_path)?;
    let stats = graph.stats();

    println!("{}", "Modgraph Status".cyan().bold());
    println!();
    println!("  {} {}", "Classes:".dimmed(), stats.classes);
    println!("  {} {}", "Methods:".dimmed(), stats.methods);
    println!("  {} {}", "Fields:".dimmed(), stats.fields);
    println!("  {} {}", "Endpoints:".dimmed(), stats.endpoints);
    println!("  {} {}", "Annotations:".dimmed(), stats.annotations);
    println!("  {} {}", "Nodes:".dimmed(), stats.total_nodes);
    println!("  {} {}", "Edges:".dimmed(), stats.total_edges);
    println!("  {} {}", "Entry points:".dimmed(), stats.entry_points);

    Ok(())
}

/// Print the API signature.
pub fn summary(graph_path: &Path) -> Result<()> {
    let config = Config::for_graph(graph_path)?;
    let graph = load_graph(graph_path)?;
    let signature = GraphSummarizer::new(config.summarizer).summarize(&graph);
    println!("{}", serde_json::to_string_pretty(&signature)?);
    Ok(())
}

/// Detect API style and REST maturity.
pub fn classify(graph_path: &Path, apply: bool) -> Result<()> {
    let config = Config::for_graph(graph_path)?;
    let mut graph = load_graph(graph_path)?;
    let signature = GraphSummarizer::new(config.summarizer).summarize(&graph);

    let classification = if apply {
        apply_classification(&mut graph, &HeuristicClassifier, &signature)
    } else {
        HeuristicClassifier.classify(&signature)
    };
    let maturity = rest_maturity(&graph);

    println!("{}", "API Style".cyan().bold());
    println!(
        "  {} {}",
        "Primary:".dimmed(),
        classification.primary_style.to_string().green().bold()
    );
    for (style, score) in &classification.scores {
        println!("  {:>8} {}", style.to_string(), score);
    }
    println!();
    println!(
        "{} level {} of {}",
        "REST Maturity:".cyan().bold(),
        maturity.level,
        maturity.max_level
    );
    println!("  {}", maturity.description);
    if !maturity.http_methods.is_empty() {
        println!("  {} {}", "Verbs:".dimmed(), maturity.http_methods.join(", "));
    }
    for recommendation in &maturity.recommendations {
        println!("  • {}", recommendation);
    }

    if apply {
        save_snapshot_back(graph_path, &graph)?;
        println!();
        println!(
            "{} Labeled classes as {}",
            "✓".green(),
            classification.label().cyan()
        );
    }

    Ok(())
}

/// Architecture scores and security findings.
pub fn assess(graph_path: &Path, json: bool) -> Result<()> {
    let graph = load_graph(graph_path)?;
    let architecture = assess_architecture(&graph);
    let security = assess_security(&graph);

    if json {
        let report = serde_json::json!({
            "architecture": architecture,
            "security": security,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Architecture".cyan().bold());
    println!("  {} {}", "Modularity:".dimmed(), architecture.modularity);
    println!("  {} {}", "Scalability:".dimmed(), architecture.scalability);
    println!("  {} {}", "Maintainability:".dimmed(), architecture.maintainability);
    println!("  {} {}", "Testability:".dimmed(), architecture.testability);
    println!("  {} {}", "Overall:".dimmed(), architecture.overall.to_string().bold());
    for concern in &architecture.concerns {
        println!("  {} {}", "!".yellow(), concern);
    }
    let debt = &architecture.technical_debt;
    println!(
        "  {} {} ({})",
        "Technical debt:".dimmed(),
        debt.score,
        debt.severity
    );
    for item in &debt.items {
        println!("    • {}", item);
    }

    println!();
    println!(
        "{} score {}",
        "Security".cyan().bold(),
        security.score.to_string().bold()
    );
    if security.vulnerabilities.is_empty() {
        println!("  {} No major issues", "✓".green());
    }
    for vulnerability in &security.vulnerabilities {
        let severity = match vulnerability.severity {
            Severity::Critical | Severity::High => vulnerability.severity.to_string().red(),
            _ => vulnerability.severity.to_string().yellow(),
        };
        println!("  [{}] {}", severity, vulnerability.title);
        println!("    {}", vulnerability.recommendation.dimmed());
    }
    for gap in &security.compliance_gaps {
        println!(
            "  {} {} missing ({})",
            gap.framework.dimmed(),
            gap.requirement,
            gap.priority
        );
    }

    Ok(())
}

/// Forward reachability from an entry point.
pub fn trace(graph_path: &Path, entry: &str, depth: Option<usize>) -> Result<()> {
    let config = Config::for_graph(graph_path)?;
    let graph = load_graph(graph_path)?;
    let entry = resolve_target(&graph, entry)?;
    let depth = depth.unwrap_or(config.trace.max_depth);

    let reached = graph.forward_trace_hops(&entry, depth);
    println!(
        "{} {} nodes reachable from {} within {} hops",
        "→".cyan(),
        reached.len(),
        entry.cyan(),
        depth
    );
    for node in reached {
        println!("  {} {}", format!("[{}]", node.hops).dimmed(), node.id);
    }
    Ok(())
}

/// Paths from every entry point to a target.
pub fn backtrack(graph_path: &Path, target: &str, depth: Option<usize>) -> Result<()> {
    let config = Config::for_graph(graph_path)?;
    let graph = load_graph(graph_path)?;
    let target = resolve_target(&graph, target)?;
    let depth = depth.unwrap_or(config.trace.max_depth);

    let paths = graph.backtrack_to_entry_points(&target, depth);
    if paths.is_empty() {
        println!("No entry point reaches {} within {} edges", target, depth);
        return Ok(());
    }

    println!("Found {} paths:\n", paths.len());
    for path in paths {
        let (first, rest) = path.split_first().ok_or("empty path")?;
        print!("  {}", first.green());
        for step in rest {
            print!(" {} {}", "→".dimmed(), step);
        }
        println!();
    }
    Ok(())
}

/// Methods accessing a field.
pub fn accessors(graph_path: &Path, field: &str, access: Option<&str>) -> Result<()> {
    let access = access.map(str::parse::<AccessType>).transpose()?;
    let graph = load_graph(graph_path)?;
    let field = ids::with_prefix(ids::FIELD_PREFIX, field);

    let methods = graph.methods_accessing_field(&field, access);
    print_list(&methods, &format!("No methods access {}", field));
    Ok(())
}

/// Methods called by a method.
pub fn callees(graph_path: &Path, method: &str) -> Result<()> {
    let graph = load_graph(graph_path)?;
    let method = ids::with_prefix(ids::METHOD_PREFIX, method);

    let callees = graph.methods_called_by(&method);
    print_list(&callees, &format!("{} calls no known methods", method));
    Ok(())
}

/// Neighbors over one edge kind.
pub fn neighbors(graph_path: &Path, node: &str, edge: &str, incoming: bool) -> Result<()> {
    let kind: EdgeKind = edge.parse()?;
    let graph = load_graph(graph_path)?;
    let node = resolve_target(&graph, node)?;
    let direction = if incoming {
        Direction::Incoming
    } else {
        Direction::Outgoing
    };

    let found = graph.neighbors_by_kind(&node, kind, direction);
    print_list(&found, &format!("No {} edges at {}", kind, node));
    Ok(())
}

/// Print documents as JSON lines.
pub fn docs(graph_path: &Path, kind: Option<&str>) -> Result<()> {
    let kind = kind.map(str::parse::<NodeKind>).transpose()?;
    let graph = load_graph(graph_path)?;

    let docs = match kind {
        Some(kind) => documents::project_kind(&graph, kind),
        None => documents::project(&graph),
    };
    for doc in docs {
        println!("{}", serde_json::to_string(&doc)?);
    }
    Ok(())
}

fn print_list(items: &[String], empty: &str) {
    if items.is_empty() {
        println!("{}", empty);
        return;
    }
    for item in items {
        println!("  {}", item);
    }
}

/// Loads a graph from a store directory, a snapshot, or raw records.
fn load_graph(path: &Path) -> Result<KnowledgeGraph> {
    debug!("Loading graph from {}", path.display());
    if path.is_dir() {
        return GraphStore::open(path)?
            .load_graph()?
            .ok_or_else(|| format!("No graph stored in {}", path.display()).into());
    }
    if !path.exists() {
        return Err(format!(
            "{} not found; run `modgraph ingest <records.json>` first",
            path.display()
        )
        .into());
    }

    let text = fs::read_to_string(path)?;
    match serde_json::from_str::<GraphInput>(&text)? {
        GraphInput::Snapshot(snapshot) => Ok(KnowledgeGraph::from_snapshot(snapshot)),
        GraphInput::Units(units) => build(units),
        GraphInput::Unit(unit) => build(vec![unit]),
    }
}

fn build(units: Vec<ExtractedUnit>) -> Result<KnowledgeGraph> {
    let mut builder = GraphBuilder::new();
    for unit in units {
        builder.add_unit(unit);
    }
    Ok(builder.build()?.0)
}

fn read_units(path: &Path) -> Result<Vec<ExtractedUnit>> {
    let text = fs::read_to_string(path)?;
    match serde_json::from_str::<GraphInput>(&text)? {
        GraphInput::Units(units) => Ok(units),
        GraphInput::Unit(unit) => Ok(vec![unit]),
        GraphInput::Snapshot(_) => {
            Err(format!("{} is already a snapshot", path.display()).into())
        }
    }
}

fn save_snapshot_back(path: &Path, graph: &KnowledgeGraph) -> Result<()> {
    if path.is_dir() {
        GraphStore::open(path)?.save_graph(graph)?;
    } else {
        graph.snapshot().save_json(path)?;
    }
    Ok(())
}

/// Finds a node by id, by id without its prefix, or by simple name.
fn resolve_target(graph: &KnowledgeGraph, raw: &str) -> Result<String> {
    if graph.contains(raw) {
        return Ok(raw.to_string());
    }

    let prefixes = [
        ids::ENDPOINT_PREFIX,
        ids::METHOD_PREFIX,
        ids::FIELD_PREFIX,
        ids::CLASS_PREFIX,
    ];
    if let Some(id) = prefixes
        .iter()
        .map(|prefix| ids::with_prefix(prefix, raw))
        .find(|id| graph.contains(id))
    {
        return Ok(id);
    }

    graph
        .find_by_name(raw)
        .first()
        .map(|n| n.id.clone())
        .ok_or_else(|| format!("Node '{}' not found in graph", raw).into())
}
