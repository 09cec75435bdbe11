//! petgraph-based directed graph wrapper for the workflow.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use super::types::Workflow;
use crate::error::{ConvertError, Endpoint};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLabel {
    pub connection_id: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

pub struct FlowGraph {
    pub graph: DiGraph<String, EdgeLabel>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl FlowGraph {
    /// Build the petgraph arena. Edges with unknown endpoints are skipped
    /// here and reported by structural validation, so a graph with dangling
    /// connections can still be inspected for its other problems.
    pub fn build(workflow: &Workflow) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for node in &workflow.nodes {
            // First occurrence wins; duplicates are a validation error.
            if !node_indices.contains_key(&node.id) {
                let idx = graph.add_node(node.id.clone());
                node_indices.insert(node.id.clone(), idx);
            }
        }

        for conn in &workflow.connections {
            if let (Some(&s), Some(&t)) = (
                node_indices.get(&conn.source),
                node_indices.get(&conn.target),
            ) {
                graph.add_edge(
                    s,
                    t,
                    EdgeLabel {
                        connection_id: conn.id.clone(),
                        source_handle: conn.source_handle.clone(),
                        target_handle: conn.target_handle.clone(),
                    },
                );
            }
        }

        FlowGraph {
            graph,
            node_indices,
        }
    }

    /// Connections whose endpoints do not resolve to known node ids.
    pub fn dangling_edges(&self, workflow: &Workflow) -> Vec<ConvertError> {
        let mut errors = Vec::new();
        for conn in &workflow.connections {
            if !self.node_indices.contains_key(&conn.source) {
                errors.push(ConvertError::DanglingEdge {
                    connection_id: conn.id.clone(),
                    endpoint: Endpoint::Source,
                    node_id: conn.source.clone(),
                });
            }
            if !self.node_indices.contains_key(&conn.target) {
                errors.push(ConvertError::DanglingEdge {
                    connection_id: conn.id.clone(),
                    endpoint: Endpoint::Target,
                    node_id: conn.target.clone(),
                });
            }
        }
        errors
    }
}
