//! Modgraph CLI - Command-line interface for Modgraph
//!
//! Ingests extracted Java records into a knowledge graph and answers
//! questions about it: stats, summary signature, style classification,
//! architecture and security assessment, reachability and field access.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "modgraph")]
#[command(author = "Modgraph Contributors")]
#[command(version)]
#[command(about = "Knowledge graph and API signature for Java codebases", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Graph to query: a snapshot JSON, a records JSON, or a store directory
    #[arg(short, long, global = true, default_value = ".modgraph/graph.json")]
    graph: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Modgraph in the current directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Build the graph from extracted records
    Ingest {
        /// Records JSON: one unit or a list of units
        input: PathBuf,

        /// Output file for the snapshot JSON (defaults to --graph)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also persist the snapshot into an embedded store at this directory
        #[arg(long)]
        store: Option<PathBuf>,

        /// Skip call and field-access mining from method bodies
        #[arg(long)]
        no_bodies: bool,
    },

    /// Show graph statistics
    Stats,

    /// Print the bounded API signature as JSON
    Summary,

    /// Detect the API style and REST maturity
    Classify {
        /// Write the detected label onto every class in the snapshot
        #[arg(long)]
        apply: bool,
    },

    /// Score architecture quality and flag security risks
    Assess {
        /// Print both reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// List everything reachable from an entry point
    Trace {
        /// Node id or name to start from
        entry: String,

        /// Maximum hops (defaults to the configured trace depth)
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// List paths from entry points to a node
    Backtrack {
        /// Node id or name to reach
        target: String,

        /// Maximum path length in edges
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// List methods that read or write a field
    Accessors {
        /// Field id, with or without the `field:` prefix
        field: String,

        /// Only `read` or `write` accesses
        #[arg(short, long)]
        access: Option<String>,
    },

    /// List methods called by a method
    Callees {
        /// Method id, with or without the `method:` prefix
        method: String,
    },

    /// List neighbors over one edge kind
    Neighbors {
        /// Node id or name
        node: String,

        /// Edge kind, e.g. CALLS or depends-on
        #[arg(short, long)]
        edge: String,

        /// Follow incoming edges instead of outgoing
        #[arg(long)]
        incoming: bool,
    },

    /// Render nodes as retrieval documents (JSON lines)
    Docs {
        /// Only nodes of this kind (class, interface, enum, method, field, endpoint,
        /// annotation); class also matches interfaces and enums
        #[arg(short, long)]
        kind: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let graph = cli.graph.as_path();
    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Ingest {
            input,
            output,
            store,
            no_bodies,
        } => commands::ingest(
            &input,
            output.as_deref().unwrap_or(graph),
            store.as_deref(),
            no_bodies,
        ),
        Commands::Stats => commands::stats(graph),
        Commands::Summary => commands::summary(graph),
        Commands::Classify { apply } => commands::classify(graph, apply),
        Commands::Assess { json } => commands::assess(graph, json),
        Commands::Trace { entry, depth } => commands::trace(graph, &entry, depth),
        Commands::Backtrack { target, depth } => commands::backtrack(graph, &target, depth),
        Commands::Accessors { field, access } => {
            commands::accessors(graph, &field, access.as_deref())
        }
        Commands::Callees { method } => commands::callees(graph, &method),
        Commands::Neighbors {
            node,
            edge,
            incoming,
        } => commands::neighbors(graph, &node, &edge, incoming),
        Commands::Docs { kind } => commands::docs(graph, kind.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
