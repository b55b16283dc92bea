//! Reachability queries over the knowledge graph.
//!
//! Forward trace answers "what can this entry point reach?"; backtracking
//! answers "which entry points lead here, and how?". Both follow every
//! edge kind and are bounded by a hop limit, which keeps them finite on
//! cyclic graphs.

use crate::graph::{KnowledgeGraph, NodeId};
use petgraph::graph::EdgeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Default hop limits for traversal queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub max_depth: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self { max_depth: 5 }
    }
}

/// A node discovered by a forward trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracedNode {
    pub id: String,
    /// Number of edges from the entry point.
    pub hops: usize,
}

impl KnowledgeGraph {
    /// Every node reachable from `entry` within `max_depth` hops, including
    /// `entry` itself.
    ///
    /// An unknown entry yields an empty set.
    pub fn forward_trace(&self, entry: &str, max_depth: usize) -> BTreeSet<String> {
        self.forward_trace_hops(entry, max_depth)
            .into_iter()
            .map(|n| n.id)
            .collect()
    }

    /// Same as [`forward_trace`](Self::forward_trace) but keeps the hop
    /// distance of each node, ordered by distance then discovery.
    pub fn forward_trace_hops(&self, entry: &str, max_depth: usize) -> Vec<TracedNode> {
        let Some(start) = self.get_index(entry) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();

        visited.insert(start);
        queue.push_back((start, 0));

        while let Some((current, depth)) = queue.pop_front() {
            result.push(TracedNode {
                id: self.graph[current].id.clone(),
                hops: depth,
            });

            if depth >= max_depth {
                continue;
            }

            for neighbor in self.successors(current) {
                if visited.insert(neighbor) {
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }

        result
    }

    /// All simple paths from any entry point to `target` using at most
    /// `max_depth` edges.
    ///
    /// Each path starts at an entry point and ends at `target`. Entry points
    /// are visited in insertion order and their paths concatenated. An entry
    /// point that is the target itself contributes the one-node path.
    pub fn backtrack_to_entry_points(&self, target: &str, max_depth: usize) -> Vec<Vec<String>> {
        let Some(goal) = self.get_index(target) else {
            return Vec::new();
        };

        let mut paths = Vec::new();
        for &entry in self.entry_points_index() {
            for path in self.simple_paths(entry, goal, max_depth) {
                paths.push(
                    path.into_iter()
                        .map(|idx| self.graph[idx].id.clone())
                        .collect(),
                );
            }
        }
        paths
    }

    /// Depth-first enumeration of simple paths with an explicit stack.
    fn simple_paths(&self, from: NodeId, to: NodeId, max_depth: usize) -> Vec<Vec<NodeId>> {
        if from == to {
            return vec![vec![from]];
        }
        if max_depth == 0 {
            return Vec::new();
        }

        let mut paths = Vec::new();
        let mut path = vec![from];
        let mut stack = vec![self.successors(from).into_iter()];

        while let Some(children) = stack.last_mut() {
            match children.next() {
                Some(child) => {
                    if path.contains(&child) {
                        continue;
                    }
                    if child == to {
                        let mut found = path.clone();
                        found.push(child);
                        paths.push(found);
                        continue;
                    }
                    // Extending keeps room for at least one more edge to the target.
                    if path.len() < max_depth {
                        path.push(child);
                        stack.push(self.successors(child).into_iter());
                    }
                }
                None => {
                    stack.pop();
                    path.pop();
                }
            }
        }

        paths
    }

    /// Distinct successors in edge insertion order.
    ///
    /// Parallel edges collapse to one neighbor so that traversal never
    /// produces the same path twice.
    fn successors(&self, node: NodeId) -> Vec<NodeId> {
        let mut edges: Vec<(EdgeIndex, NodeId)> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
            .collect();
        edges.sort_by_key(|(idx, _)| *idx);

        let mut out: Vec<NodeId> = Vec::with_capacity(edges.len());
        for (_, target) in edges {
            if !out.contains(&target) {
                out.push(target);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{Edge, EdgeKind};
    use modgraph_core::{ClassRecord, EndpointRecord, MethodRecord};

    fn chain(names: &[&str]) -> (KnowledgeGraph, Vec<String>) {
        let mut graph = KnowledgeGraph::new();
        graph.add_class(ClassRecord::new("Svc", "com.x", "Svc.java"));
        let ids: Vec<String> = names
            .iter()
            .map(|n| graph.add_method(MethodRecord::new(*n, "com.x.Svc")))
            .collect();
        for pair in ids.windows(2) {
            graph.add_method_call(&pair[0], &pair[1]);
        }
        (graph, ids)
    }

    #[test]
    fn test_trace_depth_zero() {
        let (graph, ids) = chain(&["a", "b"]);
        let result = graph.forward_trace(&ids[0], 0);
        assert_eq!(result.len(), 1);
        assert!(result.contains(&ids[0]));
    }

    #[test]
    fn test_trace_unknown_entry() {
        let graph = KnowledgeGraph::new();
        assert!(graph.forward_trace("endpoint:GET:/nope", 5).is_empty());
    }

    #[test]
    fn test_trace_cycle_terminates() {
        let (mut graph, ids) = chain(&["a", "b"]);
        graph.add_method_call(&ids[1], &ids[0]);

        for depth in [1, 2, 10] {
            let result = graph.forward_trace(&ids[0], depth);
            assert_eq!(result.len(), 2);
        }
    }

    #[test]
    fn test_trace_respects_depth() {
        let (graph, ids) = chain(&["a", "b", "c", "d"]);
        let hops = graph.forward_trace_hops(&ids[0], 2);
        let reached: Vec<&str> = hops.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(reached, vec![ids[0].as_str(), ids[1].as_str(), ids[2].as_str()]);
        assert_eq!(hops[2].hops, 2);
    }

    #[test]
    fn test_backtrack_diamond() {
        //       endpoint
        //          |
        //          a
        //         / \
        //        b   c
        //         \ /
        //          d
        let (mut graph, ids) = chain(&["a", "b", "d"]);
        let c = graph.add_method(MethodRecord::new("c", "com.x.Svc"));
        graph.add_method_call(&ids[0], &c);
        graph.add_method_call(&c, &ids[2]);
        let endpoint = graph.add_endpoint(EndpointRecord::new("GET", "/a", "com.x.Svc", "a"));

        let paths = graph.backtrack_to_entry_points(&ids[2], 5);
        assert_eq!(paths.len(), 2);
        for path in &paths {
            assert_eq!(path.first(), Some(&endpoint));
            assert_eq!(path.last(), Some(&ids[2]));
        }
        assert_ne!(paths[0], paths[1]);

        // endpoint -> a -> b -> d needs three edges
        assert!(graph.backtrack_to_entry_points(&ids[2], 2).is_empty());
    }

    #[test]
    fn test_backtrack_parallel_edges_no_duplicates() {
        let (mut graph, ids) = chain(&["a", "b"]);
        graph.add_method_call(&ids[0], &ids[1]);
        graph.add_relation(&ids[0], &ids[1], Edge::new(EdgeKind::DependsOn));
        graph.add_endpoint(EndpointRecord::new("GET", "/a", "com.x.Svc", "a"));

        let paths = graph.backtrack_to_entry_points(&ids[1], 5);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 3);
    }

    #[test]
    fn test_backtrack_with_cycle() {
        let (mut graph, ids) = chain(&["a", "b", "c"]);
        graph.add_method_call(&ids[1], &ids[0]);
        graph.add_endpoint(EndpointRecord::new("GET", "/a", "com.x.Svc", "a"));

        let paths = graph.backtrack_to_entry_points(&ids[2], 10);
        assert_eq!(paths.len(), 1);
        let unique: HashSet<&String> = paths[0].iter().collect();
        assert_eq!(unique.len(), paths[0].len());
    }

    #[test]
    fn test_backtrack_missing_target() {
        let (mut graph, _) = chain(&["a"]);
        graph.add_endpoint(EndpointRecord::new("GET", "/a", "com.x.Svc", "a"));
        assert!(graph
            .backtrack_to_entry_points("method:com.x.Svc.nope", 5)
            .is_empty());
    }

    #[test]
    fn test_backtrack_target_is_entry_point() {
        let (mut graph, _) = chain(&["a"]);
        let endpoint = graph.add_endpoint(EndpointRecord::new("GET", "/a", "com.x.Svc", "a"));
        let paths = graph.backtrack_to_entry_points(&endpoint, 3);
        assert_eq!(paths, vec![vec![endpoint]]);
    }
}
