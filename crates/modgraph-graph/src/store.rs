use crate::error::Result;
use crate::graph::KnowledgeGraph;
use crate::snapshot::Snapshot;
use sled::Db;
use std::path::Path;

const SNAPSHOT_KEY: &str = "main_graph";

/// Embedded on-disk store for graph snapshots.
pub struct GraphStore {
    db: Db,
}

impl GraphStore {
    /// Opens or creates a graph store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Saves the graph's snapshot to the store.
    ///
    /// The snapshot is serialized using bincode and stored under a fixed key.
    pub fn save_graph(&self, graph: &KnowledgeGraph) -> Result<()> {
        self.save_snapshot(&graph.snapshot())
    }

    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let bytes = bincode::serialize(snapshot)?;
        self.db.insert(SNAPSHOT_KEY, bytes)?;
        self.db.flush()?;
        Ok(())
    }

    /// Loads the stored snapshot, if any.
    pub fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        match self.db.get(SNAPSHOT_KEY)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Loads and rebuilds the stored graph.
    pub fn load_graph(&self) -> Result<Option<KnowledgeGraph>> {
        Ok(self.load_snapshot()?.map(KnowledgeGraph::from_snapshot))
    }

    /// Clears the stored graph.
    pub fn clear(&self) -> Result<()> {
        self.db.remove(SNAPSHOT_KEY)?;
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modgraph_core::{AnnotationUse, ClassRecord, EndpointRecord, MethodRecord};
    use tempfile::tempdir;

    #[test]
    fn test_save_load_graph() {
        let dir = tempdir().unwrap();
        let store = GraphStore::open(dir.path()).unwrap();

        let mut graph = KnowledgeGraph::new();
        graph.add_class(
            ClassRecord::new("Api", "com.x", "Api.java")
                .with_annotation(AnnotationUse::new("RequestMapping").with_value("value", "/api")),
        );
        graph.add_method(MethodRecord::new("list", "com.x.Api"));
        graph.add_endpoint(EndpointRecord::new("GET", "/api/items", "com.x.Api", "list"));

        store.save_graph(&graph).unwrap();

        let loaded = store.load_graph().unwrap().unwrap();
        assert_eq!(loaded.stats(), graph.stats());
        assert_eq!(
            loaded.get_class("com.x.Api").and_then(|c| c.annotations[0].value("value")),
            Some("/api")
        );
    }

    #[test]
    fn test_empty_store_and_clear() {
        let dir = tempdir().unwrap();
        let store = GraphStore::open(dir.path()).unwrap();
        assert!(store.load_snapshot().unwrap().is_none());

        store.save_graph(&KnowledgeGraph::new()).unwrap();
        assert!(store.load_graph().unwrap().is_some());

        store.clear().unwrap();
        assert!(store.load_graph().unwrap().is_none());
    }
}
