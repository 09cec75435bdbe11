//! End-to-end conversion: validate, order, dispatch, assemble, emit.

use crate::assemble::fragments::assemble;
use crate::codegen;
use crate::convert::{dispatch, ConverterRegistry};
use crate::error::ConvertError;
use crate::graph::digraph::FlowGraph;
use crate::graph::types::Workflow;
use crate::ir::{ConversionResult, GenerationContext};
use crate::order::execution_order;
use crate::validate;

/// Convert a workflow into generated files.
///
/// Fatal validation issues (structural defects the resolver cannot work
/// around) abort the run and return every collected issue, fatal and
/// advisory alike. On a structurally sound graph the run always completes:
/// advisory issues and per-node conversion failures degrade to warnings on
/// the result, and `errors` stays empty.
pub fn convert(
    workflow: &Workflow,
    ctx: &GenerationContext,
    registry: &ConverterRegistry,
) -> Result<ConversionResult, Vec<ConvertError>> {
    let graph = FlowGraph::build(workflow);
    let report = validate::validate(workflow, &graph, registry);
    if report.has_fatal() {
        return Err(report.issues);
    }

    let order = execution_order(workflow);
    let ordered: Vec<&_> = order.iter().map(|&i| &workflow.nodes[i]).collect();

    let output = dispatch(&ordered, ctx, registry);
    let assembled = assemble(output.fragments);

    let mut warnings: Vec<String> =
        report.advisory().iter().map(|e| e.to_string()).collect();
    warnings.extend(output.warnings);

    Ok(codegen::emit(
        workflow,
        ctx,
        &assembled,
        &output.dependencies,
        warnings,
    ))
}

/// Parse a workflow from JSON and convert it in one step.
pub fn convert_json(
    json: &str,
    ctx: &GenerationContext,
    registry: &ConverterRegistry,
) -> Result<ConversionResult, Vec<ConvertError>> {
    let workflow = crate::graph::parse(json).map_err(|e| vec![e])?;
    convert(&workflow, ctx, registry)
}
