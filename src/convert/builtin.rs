//! Builtin converter library.
//!
//! One converter per supported node type, each emitting an import fragment
//! plus declaration (and, for chains, execution) fragments. Cross-node
//! wiring is expressed through parameters naming the upstream node ids; the
//! fragment assembler guarantees those declarations land earlier in the
//! module because dispatch walks nodes in execution order.

use std::sync::Arc;

use crate::error::ConvertError;
use crate::graph::types::Node;
use crate::ir::types::{CodeFragment, FragmentKind, GenerationContext};

use super::{NodeConverter, ParamSpec, ParamType};

/// Every converter shipped with the crate.
pub fn all() -> Vec<Arc<dyn NodeConverter>> {
    vec![
        Arc::new(ChatOpenAiConverter),
        Arc::new(PromptTemplateConverter),
        Arc::new(LlmChainConverter),
        Arc::new(BufferMemoryConverter),
        Arc::new(CalculatorConverter),
        Arc::new(SerpApiConverter),
    ]
}

/// Sanitize a node id into a TypeScript identifier.
pub fn ident(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for c in id.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(true) {
        out.insert(0, '_');
    }
    out
}

/// Derive the environment variable name for a credential parameter.
/// Splits camelCase at lower-to-upper boundaries only, so acronym runs
/// stay intact ("chatOpenAI" -> "CHAT_OPEN_AI").
pub fn env_key(node_type: &str, param_name: &str) -> String {
    let mut out = String::new();
    for part in [node_type, param_name] {
        let mut prev_lower = false;
        for c in part.chars() {
            if c.is_ascii_uppercase() && prev_lower && !out.ends_with('_') {
                out.push('_');
            }
            if c.is_ascii_alphanumeric() {
                out.push(c.to_ascii_uppercase());
            } else if !out.ends_with('_') && !out.is_empty() {
                out.push('_');
            }
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
        if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

// =============================================================================
// LLM
// =============================================================================

pub struct ChatOpenAiConverter;

impl NodeConverter for ChatOpenAiConverter {
    fn node_type(&self) -> &'static str {
        "chatOpenAI"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["openAIChat"]
    }

    fn category(&self) -> &'static str {
        "llm"
    }

    fn required_parameters(&self) -> &'static [ParamSpec] {
        const SPECS: [ParamSpec; 1] = [ParamSpec::required("modelName", ParamType::String)];
        &SPECS
    }

    fn convert(
        &self,
        node: &Node,
        _ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConvertError> {
        let var = ident(&node.id);
        let model = node.param_str_or("modelName", "gpt-4o-mini");
        let temperature = node.param_f64_or("temperature", 0.7);

        let import = CodeFragment::new(
            format!("{}-import", node.id),
            FragmentKind::Import,
            "import { ChatOpenAI } from \"@langchain/openai\";",
        )
        .with_dependencies(&["@langchain/openai"]);

        let declaration = CodeFragment::new(
            format!("{}-decl", node.id),
            FragmentKind::Declaration,
            format!(
                "const {var} = new ChatOpenAI({{\n  model: \"{model}\",\n  temperature: {temperature},\n  apiKey: process.env.{},\n}});",
                env_key(&node.node_type, "apiKey")
            ),
        )
        .with_exports(&[&var]);

        Ok(vec![import, declaration])
    }

    fn dependencies(&self, _node: &Node, _ctx: &GenerationContext) -> Vec<String> {
        vec!["@langchain/openai".into(), "@langchain/core".into()]
    }
}

// =============================================================================
// PROMPT
// =============================================================================

pub struct PromptTemplateConverter;

impl NodeConverter for PromptTemplateConverter {
    fn node_type(&self) -> &'static str {
        "promptTemplate"
    }

    fn category(&self) -> &'static str {
        "prompt"
    }

    fn required_parameters(&self) -> &'static [ParamSpec] {
        const SPECS: [ParamSpec; 1] = [ParamSpec::required("template", ParamType::String)];
        &SPECS
    }

    fn convert(
        &self,
        node: &Node,
        _ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConvertError> {
        let var = ident(&node.id);
        let template = node.param_str_or("template", "{input}");

        let import = CodeFragment::new(
            format!("{}-import", node.id),
            FragmentKind::Import,
            "import { PromptTemplate } from \"@langchain/core/prompts\";",
        )
        .with_dependencies(&["@langchain/core"]);

        let declaration = CodeFragment::new(
            format!("{}-decl", node.id),
            FragmentKind::Declaration,
            format!(
                "const {var} = PromptTemplate.fromTemplate(`{}`);",
                template.replace('`', "\\`")
            ),
        )
        .with_exports(&[&var]);

        Ok(vec![import, declaration])
    }

    fn dependencies(&self, _node: &Node, _ctx: &GenerationContext) -> Vec<String> {
        vec!["@langchain/core".into()]
    }
}

// =============================================================================
// CHAIN
// =============================================================================

pub struct LlmChainConverter;

impl NodeConverter for LlmChainConverter {
    fn node_type(&self) -> &'static str {
        "llmChain"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["chain"]
    }

    fn category(&self) -> &'static str {
        "chain"
    }

    fn convert(
        &self,
        node: &Node,
        _ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConvertError> {
        let var = ident(&node.id);
        // Upstream node ids arrive as parameters set by the editor when the
        // corresponding input handles are connected.
        let llm = ident(node.param_str_or("llm", "model"));
        let prompt = ident(node.param_str_or("prompt", "prompt"));
        let result_var = format!("{var}_result");

        let declaration = CodeFragment::new(
            format!("{}-decl", node.id),
            FragmentKind::Declaration,
            format!("const {var} = {prompt}.pipe({llm});"),
        )
        .with_exports(&[&var]);

        let execution = CodeFragment::new(
            format!("{}-exec", node.id),
            FragmentKind::Execution,
            format!("const {result_var} = await {var}.invoke(input);"),
        )
        .with_exports(&[&result_var])
        .asynchronous();

        Ok(vec![declaration, execution])
    }

    fn dependencies(&self, _node: &Node, _ctx: &GenerationContext) -> Vec<String> {
        vec!["@langchain/core".into()]
    }
}

// =============================================================================
// MEMORY
// =============================================================================

pub struct BufferMemoryConverter;

impl NodeConverter for BufferMemoryConverter {
    fn node_type(&self) -> &'static str {
        "bufferMemory"
    }

    fn category(&self) -> &'static str {
        "memory"
    }

    fn convert(
        &self,
        node: &Node,
        _ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConvertError> {
        let var = ident(&node.id);
        let memory_key = node.param_str_or("memoryKey", "chat_history");

        let import = CodeFragment::new(
            format!("{}-import", node.id),
            FragmentKind::Import,
            "import { BufferMemory } from \"langchain/memory\";",
        )
        .with_dependencies(&["langchain"]);

        let declaration = CodeFragment::new(
            format!("{}-decl", node.id),
            FragmentKind::Declaration,
            format!("const {var} = new BufferMemory({{ memoryKey: \"{memory_key}\" }});"),
        )
        .with_exports(&[&var]);

        Ok(vec![import, declaration])
    }

    fn dependencies(&self, _node: &Node, _ctx: &GenerationContext) -> Vec<String> {
        vec!["langchain".into()]
    }
}

// =============================================================================
// TOOLS
// =============================================================================

pub struct CalculatorConverter;

impl NodeConverter for CalculatorConverter {
    fn node_type(&self) -> &'static str {
        "calculator"
    }

    fn category(&self) -> &'static str {
        "tool"
    }

    fn convert(
        &self,
        node: &Node,
        _ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConvertError> {
        let var = ident(&node.id);

        let import = CodeFragment::new(
            format!("{}-import", node.id),
            FragmentKind::Import,
            "import { Calculator } from \"@langchain/community/tools/calculator\";",
        )
        .with_dependencies(&["@langchain/community"]);

        let declaration = CodeFragment::new(
            format!("{}-decl", node.id),
            FragmentKind::Declaration,
            format!("const {var} = new Calculator();"),
        )
        .with_exports(&[&var]);

        Ok(vec![import, declaration])
    }

    fn dependencies(&self, _node: &Node, _ctx: &GenerationContext) -> Vec<String> {
        vec!["@langchain/community".into()]
    }
}

pub struct SerpApiConverter;

impl NodeConverter for SerpApiConverter {
    fn node_type(&self) -> &'static str {
        "serpAPI"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["serpApi"]
    }

    fn category(&self) -> &'static str {
        "tool"
    }

    fn required_parameters(&self) -> &'static [ParamSpec] {
        const SPECS: [ParamSpec; 1] = [ParamSpec::required("apiKey", ParamType::String)];
        &SPECS
    }

    fn convert(
        &self,
        node: &Node,
        _ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConvertError> {
        let var = ident(&node.id);

        let import = CodeFragment::new(
            format!("{}-import", node.id),
            FragmentKind::Import,
            "import { SerpAPI } from \"@langchain/community/tools/serpapi\";",
        )
        .with_dependencies(&["@langchain/community"]);

        let declaration = CodeFragment::new(
            format!("{}-decl", node.id),
            FragmentKind::Declaration,
            format!(
                "const {var} = new SerpAPI(process.env.{});",
                env_key(&node.node_type, "apiKey")
            ),
        )
        .with_exports(&[&var]);

        Ok(vec![import, declaration])
    }

    fn dependencies(&self, _node: &Node, _ctx: &GenerationContext) -> Vec<String> {
        vec!["@langchain/community".into()]
    }
}
