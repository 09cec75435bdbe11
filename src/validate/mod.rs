//! Validation phase: structural rules over the graph plus per-node
//! parameter checks. All issues are collected into one report.

pub mod params;
pub mod structural;

use crate::convert::ConverterRegistry;
use crate::error::ConvertError;
use crate::graph::digraph::FlowGraph;
use crate::graph::types::Workflow;

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub issues: Vec<ConvertError>,
}

impl ValidationReport {
    /// Errors that abort the run: the resolver needs a clean DAG.
    pub fn fatal(&self) -> Vec<ConvertError> {
        self.issues.iter().filter(|e| e.is_fatal()).cloned().collect()
    }

    /// Degraded-but-recoverable issues, surfaced as warnings on the result.
    pub fn advisory(&self) -> Vec<ConvertError> {
        self.issues
            .iter()
            .filter(|e| !e.is_fatal())
            .cloned()
            .collect()
    }

    pub fn has_fatal(&self) -> bool {
        self.issues.iter().any(|e| e.is_fatal())
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn validate(
    workflow: &Workflow,
    graph: &FlowGraph,
    registry: &ConverterRegistry,
) -> ValidationReport {
    let mut issues = structural::validate_structural(workflow, graph);
    issues.extend(params::validate_params(workflow, registry));
    ValidationReport { issues }
}
