use std::collections::BTreeMap;

use flowgen::graph::types::{
    Connection, Node, ParamValue, Parameter, Workflow, WorkflowMetadata,
};
use flowgen::ir::GenerationContext;

// =============================================================================
// Workflow builders
// =============================================================================

pub fn node(id: &str, node_type: &str) -> Node {
    Node {
        id: id.into(),
        node_type: node_type.into(),
        category: String::new(),
        label: String::new(),
        parameters: BTreeMap::new(),
        position: None,
    }
}

pub fn with_param(mut node: Node, name: &str, value: ParamValue) -> Node {
    node.parameters.insert(
        name.into(),
        Parameter {
            value,
            param_type: None,
            required: false,
        },
    );
    node
}

pub fn with_credential(mut node: Node, name: &str) -> Node {
    node.parameters.insert(
        name.into(),
        Parameter {
            value: ParamValue::Null,
            param_type: Some("credential".into()),
            required: true,
        },
    );
    node
}

pub fn connection(id: &str, source: &str, target: &str) -> Connection {
    Connection {
        id: id.into(),
        source: source.into(),
        target: target.into(),
        source_handle: None,
        target_handle: None,
    }
}

pub fn workflow(nodes: Vec<Node>, connections: Vec<Connection>) -> Workflow {
    Workflow {
        metadata: WorkflowMetadata {
            name: "test-flow".into(),
            version: Some("1.0.0".into()),
            description: None,
        },
        nodes,
        connections,
    }
}

pub fn context() -> GenerationContext {
    GenerationContext::new("test-flow")
}

// =============================================================================
// Canonical nodes for the builtin converters
// =============================================================================

pub fn chat_node(id: &str) -> Node {
    with_param(
        node(id, "chatOpenAI"),
        "modelName",
        ParamValue::String("gpt-4o-mini".into()),
    )
}

pub fn prompt_node(id: &str) -> Node {
    with_param(
        node(id, "promptTemplate"),
        "template",
        ParamValue::String("Answer the question: {input}".into()),
    )
}

pub fn chain_node(id: &str, llm: &str, prompt: &str) -> Node {
    let n = with_param(
        node(id, "llmChain"),
        "llm",
        ParamValue::String(llm.into()),
    );
    with_param(n, "prompt", ParamValue::String(prompt.into()))
}

/// The standard three-node flow: prompt and llm feeding a chain.
pub fn chain_workflow() -> Workflow {
    workflow(
        vec![
            prompt_node("prompt_1"),
            chat_node("llm_1"),
            chain_node("chain_1", "llm_1", "prompt_1"),
        ],
        vec![
            connection("e1", "prompt_1", "chain_1"),
            connection("e2", "llm_1", "chain_1"),
        ],
    )
}
