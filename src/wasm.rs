//! WASM entry points for browser use.

use wasm_bindgen::prelude::*;

use crate::convert::ConverterRegistry;
use crate::error::ConvertError;
use crate::ir::GenerationContext;

/// Validate a workflow JSON: parse + structural + parameter validation.
/// Returns a JSON array of error objects.
#[wasm_bindgen]
pub fn validate_workflow(json: &str) -> JsValue {
    let result = validate_workflow_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn validate_workflow_inner(json: &str) -> Vec<ErrorDto> {
    let (workflow, graph) = match crate::graph::parse_and_build(json) {
        Ok(pair) => pair,
        Err(e) => return vec![ErrorDto::from(e)],
    };

    let registry = ConverterRegistry::with_builtins();
    let report = crate::validate::validate(&workflow, &graph, &registry);
    report.issues.into_iter().map(ErrorDto::from).collect()
}

/// Full pipeline: parse → validate → order → dispatch → assemble → emit.
/// `ctx_json` is an optional `GenerationContext` object; pass `"{}"` for
/// defaults. Returns `{status: "success", result}` or `{status: "errors",
/// errors}`.
#[wasm_bindgen]
pub fn convert_workflow(json: &str, ctx_json: &str) -> JsValue {
    let result = convert_workflow_inner(json, ctx_json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn convert_workflow_inner(json: &str, ctx_json: &str) -> ConvertOutcome {
    let mut ctx: GenerationContext = match serde_json::from_str(ctx_json) {
        Ok(ctx) => ctx,
        Err(e) => {
            return ConvertOutcome::Errors(vec![ErrorDto {
                code: "J001".into(),
                message: format!("invalid generation context: {}", e),
                node_id: None,
            }]);
        }
    };

    let workflow = match crate::graph::parse(json) {
        Ok(w) => w,
        Err(e) => return ConvertOutcome::Errors(vec![ErrorDto::from(e)]),
    };
    if ctx.project_name.is_empty() {
        ctx.project_name = workflow.metadata.name.clone();
    }

    let registry = ConverterRegistry::with_builtins();
    match crate::pipeline::convert(&workflow, &ctx, &registry) {
        Ok(result) => ConvertOutcome::Success(Box::new(result)),
        Err(errors) => {
            ConvertOutcome::Errors(errors.into_iter().map(ErrorDto::from).collect())
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: String,
    message: String,
    node_id: Option<String>,
}

impl From<ConvertError> for ErrorDto {
    fn from(e: ConvertError) -> Self {
        ErrorDto {
            code: e.code().to_string(),
            message: e.to_string(),
            node_id: e.node_id().map(str::to_string),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(tag = "status")]
enum ConvertOutcome {
    #[serde(rename = "success")]
    Success(Box<crate::ir::ConversionResult>),
    #[serde(rename = "errors")]
    Errors(Vec<ErrorDto>),
}
