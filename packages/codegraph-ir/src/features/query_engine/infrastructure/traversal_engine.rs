// Infrastructure: TraversalEngine - BFS graph traversal with Rayon
// Implements RFC-071 REACH primitive

use super::graph_index::GraphIndex;
use crate::config::TraversalOptions;
use crate::features::query_engine::domain::{
    EdgeType, PathResult, TraversalDirection, TraversalResult, TruncationReason,
};
use crate::shared::models::{Edge, Node};
use std::collections::{HashSet, VecDeque};
use std::time::Instant;

/// Traversal Engine - BFS-based path finding
///
/// Implements:
/// - Forward/backward BFS
/// - Depth limiting
/// - Path limiting (early termination)
/// - Timeout handling
pub struct TraversalEngine<'a> {
    index: &'a GraphIndex,
}

impl<'a> TraversalEngine<'a> {
    pub fn new(index: &'a GraphIndex) -> Self {
        Self { index }
    }

    /// Find paths from sources to targets (BFS), bounded by `options`.
    pub fn find_paths(
        &self,
        sources: &[&Node],
        targets: &[&Node],
        edge_type: EdgeType,
        direction: TraversalDirection,
        options: &TraversalOptions,
    ) -> TraversalResult {
        let start_time = Instant::now();
        let target_ids: HashSet<String> = targets.iter().map(|n| n.id.clone()).collect();
        let mut paths = Vec::new();
        let mut nodes_visited = 0usize;
        let mut truncation = None;

        for source in sources {
            if paths.len() >= options.max_paths {
                truncation = Some(TruncationReason::PathLimit);
                break;
            }
            if start_time.elapsed().as_millis() > options.timeout_ms as u128 {
                truncation = Some(TruncationReason::Timeout);
                break;
            }

            let (found, reason) = self.bfs_single(
                source,
                &target_ids,
                edge_type,
                direction,
                options,
                start_time,
                &mut nodes_visited,
            );

            paths.extend(found);
            if reason.is_some() {
                truncation = reason;
                break;
            }
        }

        match truncation {
            Some(reason) => TraversalResult::truncated(paths, reason),
            None => TraversalResult::complete(paths),
        }
    }

    /// BFS from a single source. Returns the paths found plus the
    /// truncation reason, if the worklist was cut off before exhausting
    /// the reachable set.
    fn bfs_single(
        &self,
        source: &Node,
        target_ids: &HashSet<String>,
        edge_type: EdgeType,
        direction: TraversalDirection,
        options: &TraversalOptions,
        start_time: Instant,
        nodes_visited: &mut usize,
    ) -> (Vec<PathResult>, Option<TruncationReason>) {
        let mut paths = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        queue.push_back((source.id.clone(), vec![source.id.clone()], 0usize));
        visited.insert(source.id.clone());

        while let Some((node_id, path, depth)) = queue.pop_front() {
            if paths.len() >= options.max_paths {
                return (paths, Some(TruncationReason::PathLimit));
            }
            if start_time.elapsed().as_millis() > options.timeout_ms as u128 {
                return (paths, Some(TruncationReason::Timeout));
            }
            if *nodes_visited >= options.max_nodes {
                return (paths, Some(TruncationReason::NodeLimit));
            }

            if depth >= options.max_depth {
                continue;
            }

            let edges = match direction {
                TraversalDirection::Forward => self.index.get_edges_from(&node_id),
                TraversalDirection::Backward => self.index.get_edges_to(&node_id),
            };

            let filtered_edges: Vec<&Edge> = edges
                .into_iter()
                .filter(|e| self.matches_edge_type(e, edge_type))
                .collect();

            for edge in filtered_edges {
                let next_id = match direction {
                    TraversalDirection::Forward => &edge.target_id,
                    TraversalDirection::Backward => &edge.source_id,
                };

                if target_ids.contains(next_id) {
                    let mut final_path = path.clone();
                    final_path.push(next_id.clone());

                    paths.push(PathResult {
                        node_ids: final_path,
                        edge_ids: vec![],
                    });

                    if paths.len() >= options.max_paths {
                        return (paths, Some(TruncationReason::PathLimit));
                    }
                    continue;
                }

                if !visited.contains(next_id) {
                    visited.insert(next_id.clone());
                    *nodes_visited += 1;
                    let mut new_path = path.clone();
                    new_path.push(next_id.clone());
                    queue.push_back((next_id.clone(), new_path, depth + 1));
                }
            }
        }

        (paths, None)
    }

    /// Check if edge matches edge type filter
    fn matches_edge_type(&self, edge: &Edge, edge_type: EdgeType) -> bool {
        match edge_type {
            EdgeType::All => true,
            EdgeType::DFG => edge.kind.is_dfg(),
            EdgeType::CFG => edge.kind.is_cfg(),
            EdgeType::Call => edge.kind.is_call(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir_generation::domain::ir_document::IRDocument;
    use crate::shared::models::{EdgeKind, NodeKind, Span};

    fn var_node(id: &str, fqn: &str, name: &str, line: u32) -> Node {
        Node::new(id.to_string(), NodeKind::Variable, fqn.to_string(), "test.py".to_string(), Span::new(line, 1, line, 10))
            .with_language("python")
            .with_name(name)
    }

    fn create_test_graph() -> GraphIndex {
        let mut ir_doc = IRDocument::new("test.py".to_string());

        // Chain: node1 -> node2 -> node3
        ir_doc.nodes.push(var_node("node1", "test.input", "input", 1));
        ir_doc.nodes.push(var_node("node2", "test.temp", "temp", 2));
        ir_doc.nodes.push(
            Node::new("node3".to_string(), NodeKind::Function, "test.execute".to_string(), "test.py".to_string(), Span::new(3, 1, 3, 10))
                .with_language("python")
                .with_name("execute"),
        );

        ir_doc.edges.push(Edge::new("node1", "node2", EdgeKind::DataFlow));
        ir_doc.edges.push(Edge::new("node2", "node3", EdgeKind::DataFlow));

        GraphIndex::new(&ir_doc)
    }

    fn opts(max_depth: usize, max_paths: usize) -> TraversalOptions {
        TraversalOptions {
            max_depth,
            max_paths,
            ..TraversalOptions::default()
        }
    }

    #[test]
    fn test_forward_traversal() {
        let index = create_test_graph();
        let engine = TraversalEngine::new(&index);

        let source = index.get_node("node1").unwrap();
        let target = index.get_node("node3").unwrap();

        let result = engine.find_paths(&[source], &[target], EdgeType::DFG, TraversalDirection::Forward, &opts(10, 100));

        assert!(!result.is_truncated());
        assert_eq!(result.paths.len(), 1);
        assert_eq!(result.paths[0].node_ids.len(), 3);
        assert_eq!(result.paths[0].node_ids[0], "node1");
        assert_eq!(result.paths[0].node_ids[2], "node3");
    }

    #[test]
    fn test_backward_traversal() {
        let index = create_test_graph();
        let engine = TraversalEngine::new(&index);

        let source = index.get_node("node1").unwrap();
        let target = index.get_node("node3").unwrap();

        let result = engine.find_paths(&[target], &[source], EdgeType::DFG, TraversalDirection::Backward, &opts(10, 100));

        assert_eq!(result.paths.len(), 1);
        assert_eq!(result.paths[0].node_ids.len(), 3);
    }

    #[test]
    fn test_depth_limit() {
        let index = create_test_graph();
        let engine = TraversalEngine::new(&index);

        let source = index.get_node("node1").unwrap();
        let target = index.get_node("node3").unwrap();

        let result = engine.find_paths(&[source], &[target], EdgeType::DFG, TraversalDirection::Forward, &opts(1, 100));

        assert_eq!(result.paths.len(), 0);
    }

    #[test]
    fn test_path_limit() {
        let index = create_test_graph();
        let engine = TraversalEngine::new(&index);

        let source = index.get_node("node1").unwrap();
        let target = index.get_node("node3").unwrap();

        let result = engine.find_paths(&[source], &[target], EdgeType::DFG, TraversalDirection::Forward, &opts(10, 1));

        assert!(result.paths.len() <= 1);
    }
}
