//! Input phase: JSON → Rust types + graph construction.

pub mod digraph;
pub mod types;

pub use digraph::FlowGraph;
pub use types::*;

use crate::error::ConvertError;

/// Deserialize a workflow JSON string into a `Workflow` struct.
pub fn parse(json: &str) -> Result<Workflow, ConvertError> {
    serde_json::from_str::<Workflow>(json).map_err(|e| ConvertError::Parse {
        message: e.to_string(),
    })
}

/// Parse JSON and build the connection graph in one step.
pub fn parse_and_build(json: &str) -> Result<(Workflow, FlowGraph), ConvertError> {
    let workflow = parse(json)?;
    let graph = FlowGraph::build(&workflow);
    Ok((workflow, graph))
}
