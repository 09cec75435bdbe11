//! Rust types mirroring the frontend workflow JSON.
//!
//! These types are the serde target for the node-and-edge graph exported by
//! the visual editor. Node configuration is open-schema: each converter
//! decides which parameters it reads, so `parameters` is a loosely typed map
//! rather than a closed enum of config shapes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// TOP-LEVEL WORKFLOW
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(default)]
    pub metadata: WorkflowMetadata,
    pub nodes: Vec<Node>,
    #[serde(default, alias = "edges")]
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowMetadata {
    #[serde(default)]
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

// =============================================================================
// NODE
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    /// Selects the converter.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Coarse tag ("llm", "memory", "tool", ...) used for cross-cutting features.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,
    pub position: Option<Position>,
}

impl Node {
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// String value of a parameter, or `default` when the parameter is
    /// missing or not a string.
    pub fn param_str_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.param(name)
            .and_then(|p| p.value.as_str())
            .unwrap_or(default)
    }

    pub fn param_f64_or(&self, name: &str, default: f64) -> f64 {
        self.param(name)
            .and_then(|p| p.value.as_f64())
            .unwrap_or(default)
    }

    pub fn param_bool_or(&self, name: &str, default: bool) -> bool {
        self.param(name)
            .and_then(|p| p.value.as_bool())
            .unwrap_or(default)
    }

    /// Parameters declared as credentials: these feed the `.env` template.
    pub fn credential_params(&self) -> impl Iterator<Item = (&String, &Parameter)> {
        self.parameters.iter().filter(|(_, p)| p.is_credential())
    }
}

// =============================================================================
// PARAMETERS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(default)]
    pub value: ParamValue,
    /// Declared type from the editor ("string", "number", "boolean",
    /// "credential", "password", "json", ...).
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl Parameter {
    pub fn is_credential(&self) -> bool {
        matches!(self.param_type.as_deref(), Some("credential") | Some("password"))
    }
}

/// Loosely typed parameter value. Absence of a key in `Node.parameters` is
/// the "missing" case; defaults are resolved explicitly through the
/// `param_*_or` helpers on `Node`, never implicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<ParamValue>),
    Object(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    /// Human-readable name of the value's shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Null => "null",
            ParamValue::Bool(_) => "boolean",
            ParamValue::Number(_) => "number",
            ParamValue::String(_) => "string",
            ParamValue::Array(_) => "array",
            ParamValue::Object(_) => "object",
        }
    }
}
