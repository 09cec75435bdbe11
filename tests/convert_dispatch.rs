//! Integration tests for converter dispatch and its degradation policy.

mod helpers;

use std::sync::Arc;

use flowgen::convert::{dispatch, ConverterRegistry, NodeConverter};
use flowgen::error::ConvertError;
use flowgen::graph::types::Node;
use flowgen::ir::{CodeFragment, FragmentKind, GenerationContext};
use flowgen::pipeline;

use helpers::*;

/// Converter that always fails, standing in for one hitting a bad node
/// configuration at conversion time.
struct FlakyConverter;

impl NodeConverter for FlakyConverter {
    fn node_type(&self) -> &'static str {
        "flakyTool"
    }

    fn category(&self) -> &'static str {
        "tool"
    }

    fn convert(
        &self,
        node: &Node,
        _ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConvertError> {
        Err(ConvertError::Converter {
            node_id: node.id.clone(),
            message: "tool schema unavailable".into(),
        })
    }
}

#[test]
fn unknown_type_degrades_to_placeholder_and_warning() {
    let registry = ConverterRegistry::with_builtins();
    let ctx = context();
    let mystery = node("mystery_1", "quantumResolver");

    let output = dispatch(&[&mystery], &ctx, &registry);

    assert_eq!(output.fragments.len(), 1);
    let placeholder = &output.fragments[0];
    assert_eq!(placeholder.kind, FragmentKind::Declaration);
    assert!(placeholder.content.contains("quantumResolver"));
    assert_eq!(output.warnings.len(), 1);
    assert!(output.warnings[0].contains("mystery_1"));
}

#[test]
fn unknown_type_never_fails_the_run() {
    let registry = ConverterRegistry::with_builtins();
    let ctx = context();
    let flow = workflow(
        vec![chat_node("llm_1"), node("mystery_1", "quantumResolver")],
        vec![connection("e1", "llm_1", "mystery_1")],
    );

    let result = pipeline::convert(&flow, &ctx, &registry).expect("run should complete");
    assert!(result.errors.is_empty());
    assert!(result.warnings.iter().any(|w| w.contains("quantumResolver")));

    let main = &result.files[0];
    assert!(main.content.contains("// TODO: node \"mystery_1\""));
    assert!(main.content.contains("new ChatOpenAI"));
}

#[test]
fn converter_error_degrades_to_placeholder_and_warning() {
    let mut registry = ConverterRegistry::with_builtins();
    registry.register(Arc::new(FlakyConverter));
    let ctx = context();
    let flaky = node("flaky_1", "flakyTool");

    let output = dispatch(&[&flaky], &ctx, &registry);

    assert_eq!(output.fragments.len(), 1);
    assert_eq!(output.fragments[0].kind, FragmentKind::Declaration);
    assert!(output.fragments[0].content.contains("flaky_1"));
    assert_eq!(output.warnings.len(), 1);
    assert!(
        output.warnings[0].contains("converter failed: tool schema unavailable"),
        "{}",
        output.warnings[0]
    );
}

#[test]
fn converter_error_never_fails_the_run() {
    let mut registry = ConverterRegistry::with_builtins();
    registry.register(Arc::new(FlakyConverter));
    let ctx = context();
    let flow = workflow(
        vec![chat_node("llm_1"), node("flaky_1", "flakyTool")],
        vec![connection("e1", "llm_1", "flaky_1")],
    );

    let result = pipeline::convert(&flow, &ctx, &registry).expect("run should complete");
    assert!(result.errors.is_empty());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.contains("flaky_1") && w.contains("converter failed")));

    let main = &result.files[0];
    assert!(main.content.contains("// TODO: node \"flaky_1\""));
    assert!(main.content.contains("new ChatOpenAI"));
}

#[test]
fn aliases_resolve_to_the_same_converter() {
    let registry = ConverterRegistry::with_builtins();
    assert!(registry.contains("chatOpenAI"));
    assert!(registry.contains("openAIChat"));
    assert!(registry.contains("serpApi"));

    let ctx = context();
    let mut aliased = chat_node("llm_1");
    aliased.node_type = "openAIChat".into();
    let output = dispatch(&[&aliased], &ctx, &registry);
    assert!(output.warnings.is_empty());
    assert!(output
        .fragments
        .iter()
        .any(|f| f.content.contains("new ChatOpenAI")));
}

#[test]
fn order_stamp_leaves_room_for_intra_node_fragments() {
    let registry = ConverterRegistry::with_builtins();
    let ctx = context();
    let a = chat_node("a");
    let b = chat_node("b");

    let output = dispatch(&[&a, &b], &ctx, &registry);

    let orders: Vec<u64> = output.fragments.iter().map(|f| f.meta.order).collect();
    assert_eq!(orders, vec![0, 1, 1000, 1001]);
}

#[test]
fn dependencies_union_is_first_seen_and_deduped() {
    let registry = ConverterRegistry::with_builtins();
    let ctx = context();
    let a = chat_node("a");
    let b = chat_node("b");
    let c = node("c", "calculator");

    let output = dispatch(&[&a, &b, &c], &ctx, &registry);

    assert_eq!(
        output.dependencies,
        vec![
            "@langchain/openai".to_string(),
            "@langchain/core".to_string(),
            "@langchain/community".to_string(),
        ]
    );
}
