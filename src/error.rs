//! Error taxonomy shared by all pipeline phases.
//!
//! Structural issues (empty graph, duplicate ids, dangling edges, self-loops,
//! cycles) are fatal: the execution order resolver cannot run without a clean
//! DAG. Semantic issues (missing/invalid parameters) and converter failures
//! are advisory: the affected node degrades to a placeholder and the run
//! continues.

use thiserror::Error;

/// Which endpoint of a connection an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Source => write!(f, "source"),
            Endpoint::Target => write!(f, "target"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("failed to parse workflow JSON: {message}")]
    Parse { message: String },

    #[error("workflow graph has no nodes")]
    EmptyGraph,

    #[error("duplicate node id '{node_id}'")]
    DuplicateNodeId { node_id: String },

    #[error("connection '{connection_id}' references unknown {endpoint} node '{node_id}'")]
    DanglingEdge {
        connection_id: String,
        endpoint: Endpoint,
        node_id: String,
    },

    #[error("node '{node_id}' connects to itself")]
    SelfLoop { node_id: String },

    #[error("cyclic dependency: {}", ids.join(" -> "))]
    CyclicDependency { ids: Vec<String> },

    #[error("node '{node_id}': missing required parameter '{name}'")]
    MissingParameter { node_id: String, name: String },

    #[error("node '{node_id}': parameter '{name}' expected {expected}, got {actual}")]
    InvalidParameter {
        node_id: String,
        name: String,
        expected: String,
        actual: String,
    },

    #[error("node '{node_id}': no converter registered for type '{node_type}'")]
    UnsupportedNode { node_id: String, node_type: String },

    #[error("node '{node_id}': converter failed: {message}")]
    Converter { node_id: String, message: String },
}

impl ConvertError {
    /// Stable error code carried on wire DTOs.
    pub fn code(&self) -> &'static str {
        match self {
            ConvertError::Parse { .. } => "J001",
            ConvertError::EmptyGraph => "G001",
            ConvertError::DuplicateNodeId { .. } => "G002",
            ConvertError::DanglingEdge { .. } => "G003",
            ConvertError::SelfLoop { .. } => "G004",
            ConvertError::CyclicDependency { .. } => "G005",
            ConvertError::MissingParameter { .. } => "P001",
            ConvertError::InvalidParameter { .. } => "P002",
            ConvertError::UnsupportedNode { .. } => "C001",
            ConvertError::Converter { .. } => "C002",
        }
    }

    /// Fatal errors abort the run before fragment generation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ConvertError::Parse { .. }
                | ConvertError::EmptyGraph
                | ConvertError::DuplicateNodeId { .. }
                | ConvertError::DanglingEdge { .. }
                | ConvertError::SelfLoop { .. }
                | ConvertError::CyclicDependency { .. }
        )
    }

    /// The node this error points at, if any.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            ConvertError::Parse { .. } | ConvertError::EmptyGraph => None,
            ConvertError::DuplicateNodeId { node_id }
            | ConvertError::DanglingEdge { node_id, .. }
            | ConvertError::SelfLoop { node_id }
            | ConvertError::MissingParameter { node_id, .. }
            | ConvertError::InvalidParameter { node_id, .. }
            | ConvertError::UnsupportedNode { node_id, .. }
            | ConvertError::Converter { node_id, .. } => Some(node_id),
            ConvertError::CyclicDependency { ids } => ids.first().map(String::as_str),
        }
    }
}
