//! Converter registry and per-node dispatch.
//!
//! A converter translates one node type into code fragments. The registry
//! maps `Node.type` strings (plus aliases) to trait objects; the core
//! depends only on the `NodeConverter` interface, never on concrete types.

pub mod builtin;

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ConvertError;
use crate::graph::types::{Node, ParamValue};
use crate::ir::types::{CodeFragment, FragmentKind, GenerationContext};

// =============================================================================
// PARAMETER SPECS
// =============================================================================

/// Value shape a converter expects for a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Any,
}

impl ParamType {
    pub fn matches(&self, value: &ParamValue) -> bool {
        match self {
            ParamType::String => matches!(value, ParamValue::String(_)),
            ParamType::Number => matches!(value, ParamValue::Number(_)),
            ParamType::Boolean => matches!(value, ParamValue::Bool(_)),
            ParamType::Object => matches!(value, ParamValue::Object(_)),
            ParamType::Array => matches!(value, ParamValue::Array(_)),
            ParamType::Any => true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
            ParamType::Any => "any",
        }
    }
}

/// A parameter a converter declares as required.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: ParamType,
}

impl ParamSpec {
    pub const fn required(name: &'static str, param_type: ParamType) -> Self {
        ParamSpec { name, param_type }
    }
}

// =============================================================================
// CONVERTER TRAIT
// =============================================================================

/// A pluggable translator for one node type. Implementations must be pure:
/// no I/O, no ambient mutable state, no mutation of the context.
pub trait NodeConverter: Send + Sync {
    /// Primary `Node.type` string this converter handles.
    fn node_type(&self) -> &'static str;

    /// Recognized alternative type strings.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn category(&self) -> &'static str;

    /// Parameters that must be present (and shape-conformant) on the node.
    fn required_parameters(&self) -> &'static [ParamSpec] {
        &[]
    }

    /// Last-chance rejection hook for nodes the registry routed here.
    fn can_convert(&self, node: &Node) -> bool {
        node.node_type == self.node_type() || self.aliases().contains(&node.node_type.as_str())
    }

    /// Translate the node into ordered code fragments. `meta.order` is
    /// stamped by dispatch afterwards; converters control only the relative
    /// order within the returned vector.
    fn convert(&self, node: &Node, ctx: &GenerationContext)
    -> Result<Vec<CodeFragment>, ConvertError>;

    /// Package names this node type pulls into the dependency manifest.
    fn dependencies(&self, _node: &Node, _ctx: &GenerationContext) -> Vec<String> {
        Vec::new()
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

#[derive(Default)]
pub struct ConverterRegistry {
    by_type: HashMap<String, Arc<dyn NodeConverter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the builtin converter library.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for converter in builtin::all() {
            registry.register(converter);
        }
        registry
    }

    pub fn register(&mut self, converter: Arc<dyn NodeConverter>) {
        for alias in converter.aliases() {
            self.by_type.insert(alias.to_string(), Arc::clone(&converter));
        }
        self.by_type
            .insert(converter.node_type().to_string(), converter);
    }

    pub fn get(&self, node_type: &str) -> Option<&Arc<dyn NodeConverter>> {
        self.by_type.get(node_type)
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.by_type.contains_key(node_type)
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

pub struct DispatchOutput {
    pub fragments: Vec<CodeFragment>,
    /// Package names gathered from converters, in first-seen order.
    pub dependencies: Vec<String>,
    pub warnings: Vec<String>,
}

/// Convert every node, in execution order, into fragments.
///
/// Partial-failure policy: an unknown type, a `can_convert` rejection, or a
/// converter error never aborts the run. The node degrades to a single
/// placeholder declaration fragment plus a warning so the rest of the graph
/// still produces a usable artifact.
pub fn dispatch(
    ordered_nodes: &[&Node],
    ctx: &GenerationContext,
    registry: &ConverterRegistry,
) -> DispatchOutput {
    let mut fragments = Vec::new();
    let mut dependencies = Vec::new();
    let mut warnings = Vec::new();

    for (exec_index, node) in ordered_nodes.iter().enumerate() {
        let produced = match registry.get(&node.node_type) {
            Some(converter) if converter.can_convert(node) => {
                match converter.convert(node, ctx) {
                    Ok(produced) => {
                        for dep in converter.dependencies(node, ctx) {
                            if !dependencies.contains(&dep) {
                                dependencies.push(dep);
                            }
                        }
                        produced
                    }
                    Err(e) => {
                        let wrapped = match e {
                            e @ ConvertError::Converter { .. } => e,
                            other => ConvertError::Converter {
                                node_id: node.id.clone(),
                                message: other.to_string(),
                            },
                        };
                        warnings.push(wrapped.to_string());
                        vec![placeholder(node)]
                    }
                }
            }
            Some(_) | None => {
                warnings.push(
                    ConvertError::UnsupportedNode {
                        node_id: node.id.clone(),
                        node_type: node.node_type.clone(),
                    }
                    .to_string(),
                );
                vec![placeholder(node)]
            }
        };

        // 1000 order slots per node: execution order is the primary key,
        // intra-node fragment order the secondary key.
        for (i, mut fragment) in produced.into_iter().enumerate() {
            fragment.meta.node_id = node.id.clone();
            fragment.meta.order = (exec_index as u64) * 1000 + i as u64;
            if fragment.meta.category.is_empty() {
                fragment.meta.category = node.category.clone();
            }
            for dep in &fragment.dependencies {
                if !dependencies.contains(dep) {
                    dependencies.push(dep.clone());
                }
            }
            fragments.push(fragment);
        }
    }

    DispatchOutput {
        fragments,
        dependencies,
        warnings,
    }
}

/// Stand-in declaration for a node that could not be converted.
pub fn placeholder(node: &Node) -> CodeFragment {
    CodeFragment::new(
        format!("{}-placeholder", node.id),
        FragmentKind::Declaration,
        format!(
            "// TODO: node \"{}\" has unsupported type \"{}\"",
            node.id, node.node_type
        ),
    )
}
