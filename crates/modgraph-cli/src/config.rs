//! Project configuration stored in `.modgraph/config.json`.

use modgraph_graph::{SummarizerConfig, TraceConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_DIR: &str = ".modgraph";
const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub summarizer: SummarizerConfig,
    pub trace: TraceConfig,
}

impl Config {
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Loads the config under `root`, falling back to defaults when the
    /// file does not exist.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Loads the config of the project a graph belongs to.
    pub fn for_graph(graph_path: &Path) -> Result<Self, ConfigError> {
        Self::load(&project_root(graph_path))
    }
}

/// The project root owning `graph_path`: the parent of the nearest
/// enclosing `.modgraph` directory, or else the directory holding the graph.
pub fn project_root(graph_path: &Path) -> PathBuf {
    let holder = match graph_path
        .ancestors()
        .find(|p| p.file_name().map_or(false, |n| n == CONFIG_DIR))
    {
        Some(dir) => dir.parent(),
        None if graph_path.is_dir() => Some(graph_path),
        None => graph_path.parent(),
    };
    match holder {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
