//! Core IR of a conversion run: the generation context supplied by the
//! caller, the code fragments emitted by converters, and the final result.
//!
//! All per-run state lives in these values; nothing is carried between runs,
//! so concurrent conversions of distinct graphs are safe by construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// GENERATION CONTEXT
// =============================================================================

/// Immutable configuration for a single conversion run. Converters receive a
/// shared reference and must never mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    #[serde(default)]
    pub project_name: String,
    /// Prefix recorded on `GeneratedFile.path`. Empty = repository root.
    #[serde(default)]
    pub output_dir: String,
    #[serde(default)]
    pub target: TargetVariant,
    #[serde(default)]
    pub style: StyleOptions,
    /// Extra environment entries merged into the `.env` template.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    #[serde(default)]
    pub include_tests: bool,
    #[serde(default = "default_true")]
    pub include_comments: bool,
    /// Emit timing instrumentation around the flow invocation.
    #[serde(default)]
    pub instrumentation: bool,
}

fn default_true() -> bool {
    true
}

impl GenerationContext {
    pub fn new(project_name: impl Into<String>) -> Self {
        GenerationContext {
            project_name: project_name.into(),
            output_dir: String::new(),
            target: TargetVariant::default(),
            style: StyleOptions::default(),
            environment: BTreeMap::new(),
            include_tests: false,
            include_comments: true,
            instrumentation: false,
        }
    }

    /// File extension for source artifacts under the current target.
    pub fn source_ext(&self) -> &'static str {
        match self.target {
            TargetVariant::TypeScript => "ts",
            TargetVariant::JavaScript => "js",
        }
    }

    pub fn file_path(&self, name: &str) -> String {
        if self.output_dir.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.output_dir.trim_end_matches('/'), name)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetVariant {
    #[default]
    #[serde(rename = "typescript")]
    TypeScript,
    #[serde(rename = "javascript")]
    JavaScript,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleOptions {
    pub indent_width: usize,
    pub quote_style: QuoteStyle,
    pub semicolons: bool,
}

impl Default for StyleOptions {
    fn default() -> Self {
        StyleOptions {
            indent_width: 2,
            quote_style: QuoteStyle::Double,
            semicolons: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteStyle {
    #[serde(rename = "single")]
    Single,
    #[serde(rename = "double")]
    Double,
}

impl QuoteStyle {
    pub fn char(&self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }

    pub fn other(&self) -> char {
        match self {
            QuoteStyle::Single => '"',
            QuoteStyle::Double => '\'',
        }
    }
}

// =============================================================================
// CODE FRAGMENTS
// =============================================================================

/// The bucket a fragment lands in when the main module is assembled.
/// Buckets are emitted in declaration order of this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FragmentKind {
    Import,
    Declaration,
    Initialization,
    Execution,
    Export,
}

impl FragmentKind {
    pub const ALL: [FragmentKind; 5] = [
        FragmentKind::Import,
        FragmentKind::Declaration,
        FragmentKind::Initialization,
        FragmentKind::Execution,
        FragmentKind::Export,
    ];
}

/// A minimal, independently ordered unit of generated code. Immutable once
/// produced; ordering derives solely from `meta.order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeFragment {
    pub id: String,
    pub kind: FragmentKind,
    pub content: String,
    /// Package names this fragment needs in the dependency manifest.
    pub dependencies: Vec<String>,
    pub language: String,
    pub meta: FragmentMeta,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentMeta {
    pub node_id: String,
    /// `execution_index * 1000 + intra_node_index`, stamped by dispatch.
    pub order: u64,
    pub category: String,
    pub is_async: bool,
    /// Symbols this fragment introduces into the module scope.
    pub exports: Vec<String>,
}

impl CodeFragment {
    pub fn new(id: impl Into<String>, kind: FragmentKind, content: impl Into<String>) -> Self {
        CodeFragment {
            id: id.into(),
            kind,
            content: content.into(),
            dependencies: Vec::new(),
            language: "typescript".into(),
            meta: FragmentMeta::default(),
        }
    }

    pub fn with_dependencies(mut self, deps: &[&str]) -> Self {
        self.dependencies = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_exports(mut self, exports: &[&str]) -> Self {
        self.meta.exports = exports.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn asynchronous(mut self) -> Self {
        self.meta.is_async = true;
        self
    }
}

// =============================================================================
// CONVERSION RESULT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileKind {
    Module,
    Types,
    Config,
    Manifest,
    EnvTemplate,
    Test,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
    pub kind: FileKind,
    /// Content length in bytes.
    pub size: usize,
    pub exports: Vec<String>,
}

impl GeneratedFile {
    pub fn new(path: String, content: String, kind: FileKind) -> Self {
        let size = content.len();
        GeneratedFile {
            path,
            content,
            kind,
            size,
            exports: Vec::new(),
        }
    }
}

/// Advisory complexity tier derived from node/connection counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    pub fn estimate(node_count: usize, connection_count: usize) -> Self {
        if node_count > 15 || connection_count > 20 {
            Complexity::Complex
        } else if node_count <= 5 && connection_count <= 4 {
            Complexity::Simple
        } else {
            Complexity::Medium
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub project_name: String,
    pub node_count: usize,
    pub connection_count: usize,
    pub complexity: Complexity,
}

/// Complete output of one conversion run. `errors` lists reasons the run is
/// incomplete or invalid; `warnings` lists parts that degraded but completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub files: Vec<GeneratedFile>,
    /// Package name → version, the union of all declared dependencies.
    pub dependencies: BTreeMap<String, String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub metadata: ResultMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complexity_thresholds() {
        assert_eq!(Complexity::estimate(3, 2), Complexity::Simple);
        assert_eq!(Complexity::estimate(5, 4), Complexity::Simple);
        assert_eq!(Complexity::estimate(6, 4), Complexity::Medium);
        assert_eq!(Complexity::estimate(5, 5), Complexity::Medium);
        assert_eq!(Complexity::estimate(16, 0), Complexity::Complex);
        assert_eq!(Complexity::estimate(2, 21), Complexity::Complex);
    }

    #[test]
    fn file_path_respects_output_dir() {
        let mut ctx = GenerationContext::new("x");
        assert_eq!(ctx.file_path("index.ts"), "index.ts");
        ctx.output_dir = "out/".into();
        assert_eq!(ctx.file_path("index.ts"), "out/index.ts");
    }
}
