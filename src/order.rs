//! Deterministic execution-order resolution.
//!
//! The resolver linearizes the node array so every connection source
//! precedes its target. It is intentionally not a canonical minimal
//! topological sort: ties between mutually independent nodes resolve by
//! original array position, and traversal starts from entry nodes (no
//! incoming connections) in array order, followed by a sweep over the node
//! array for anything not yet reached. Downstream fragment ordering depends
//! on this exact tie-break for byte-reproducible output, so the policy is
//! part of the contract.
//!
//! Must only be called after structural validation has ruled out cycles.

use std::collections::HashMap;

use crate::graph::types::Workflow;

/// Returns indices into `workflow.nodes` in execution order.
pub fn execution_order(workflow: &Workflow) -> Vec<usize> {
    let index_of: HashMap<&str, usize> = workflow
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let n = workflow.nodes.len();

    // Incoming sources per node, in connection array order. Dangling
    // endpoints were rejected by validation.
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); n];
    for conn in &workflow.connections {
        if let (Some(&s), Some(&t)) = (
            index_of.get(conn.source.as_str()),
            index_of.get(conn.target.as_str()),
        ) {
            incoming[t].push(s);
        }
    }

    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);

    // Entry points first, in array order.
    for i in 0..n {
        if incoming[i].is_empty() {
            visit(i, &incoming, &mut visited, &mut order);
        }
    }

    // Second pass over the array picks up every node not reachable through
    // the dependency walk above.
    for i in 0..n {
        if !visited[i] {
            visit(i, &incoming, &mut visited, &mut order);
        }
    }

    order
}

enum Frame {
    Enter(usize),
    Emit(usize),
}

/// Iterative post-order walk over incoming connections: a node is emitted
/// only after all of its dependencies.
fn visit(start: usize, incoming: &[Vec<usize>], visited: &mut [bool], order: &mut Vec<usize>) {
    let mut stack = vec![Frame::Enter(start)];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(i) => {
                if visited[i] {
                    continue;
                }
                visited[i] = true;
                stack.push(Frame::Emit(i));
                // Reverse push so the first dependency is emitted first.
                for &dep in incoming[i].iter().rev() {
                    if !visited[dep] {
                        stack.push(Frame::Enter(dep));
                    }
                }
            }
            Frame::Emit(i) => order.push(i),
        }
    }
}
