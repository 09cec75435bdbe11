//! Graph-level structural validation rules.
//!
//! Every rule appends to the shared error list; validation never stops at
//! the first problem so a caller can report everything in one pass.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use crate::error::ConvertError;
use crate::graph::digraph::FlowGraph;
use crate::graph::types::Workflow;

pub fn validate_structural(workflow: &Workflow, graph: &FlowGraph) -> Vec<ConvertError> {
    let mut errors = Vec::new();

    rule_non_empty(workflow, &mut errors);
    rule_unique_node_ids(workflow, &mut errors);
    rule_edges_reference_existing_nodes(workflow, graph, &mut errors);
    rule_no_self_loops(workflow, &mut errors);
    rule_no_cycles(graph, &mut errors);

    errors
}

fn rule_non_empty(workflow: &Workflow, errors: &mut Vec<ConvertError>) {
    if workflow.nodes.is_empty() {
        errors.push(ConvertError::EmptyGraph);
    }
}

fn rule_unique_node_ids(workflow: &Workflow, errors: &mut Vec<ConvertError>) {
    let mut seen = HashSet::new();
    for node in &workflow.nodes {
        if !seen.insert(node.id.as_str()) {
            errors.push(ConvertError::DuplicateNodeId {
                node_id: node.id.clone(),
            });
        }
    }
}

fn rule_edges_reference_existing_nodes(
    workflow: &Workflow,
    graph: &FlowGraph,
    errors: &mut Vec<ConvertError>,
) {
    errors.extend(graph.dangling_edges(workflow));
}

fn rule_no_self_loops(workflow: &Workflow, errors: &mut Vec<ConvertError>) {
    for conn in &workflow.connections {
        if conn.source == conn.target {
            errors.push(ConvertError::SelfLoop {
                node_id: conn.source.clone(),
            });
        }
    }
}

fn rule_no_cycles(graph: &FlowGraph, errors: &mut Vec<ConvertError>) {
    if let Some(ids) = find_cycle(graph) {
        errors.push(ConvertError::CyclicDependency { ids });
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Iterative DFS with explicit white/gray/black marking. Returns the node
/// ids participating in the first cycle found, in cycle order. Length-1
/// cycles are skipped; self-loops are reported by their own rule.
fn find_cycle(flow: &FlowGraph) -> Option<Vec<String>> {
    let g = &flow.graph;
    let mut color = vec![Color::White; g.node_count()];

    for start in g.node_indices() {
        if color[start.index()] != Color::White {
            continue;
        }

        // Stack frames: (node, successors, cursor into successors).
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> =
            vec![(start, successors(flow, start), 0)];
        color[start.index()] = Color::Gray;

        while !stack.is_empty() {
            let top = stack.len() - 1;
            let node = stack[top].0;

            let next = {
                let frame = &mut stack[top];
                if frame.2 < frame.1.len() {
                    let n = frame.1[frame.2];
                    frame.2 += 1;
                    Some(n)
                } else {
                    None
                }
            };

            match next {
                None => {
                    color[node.index()] = Color::Black;
                    stack.pop();
                }
                Some(next) if next == node => {}
                Some(next) => match color[next.index()] {
                    Color::White => {
                        color[next.index()] = Color::Gray;
                        let next_succs = successors(flow, next);
                        stack.push((next, next_succs, 0));
                    }
                    Color::Gray => {
                        // All frames from `next` to the top of the stack
                        // form the cycle, in traversal order.
                        let from = stack
                            .iter()
                            .position(|(n, _, _)| *n == next)
                            .unwrap_or(0);
                        return Some(
                            stack[from..]
                                .iter()
                                .map(|(n, _, _)| g[*n].clone())
                                .collect(),
                        );
                    }
                    Color::Black => {}
                },
            }
        }
    }

    None
}

/// Outgoing neighbors in edge insertion order, for reproducible traversal.
fn successors(flow: &FlowGraph, idx: NodeIndex) -> Vec<NodeIndex> {
    let mut out: Vec<NodeIndex> = flow
        .graph
        .neighbors_directed(idx, petgraph::Direction::Outgoing)
        .collect();
    // petgraph iterates neighbors in reverse insertion order.
    out.reverse();
    out
}
