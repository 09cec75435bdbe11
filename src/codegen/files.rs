//! Generate supporting project files: package.json, .env.example,
//! flow.config.json, types.ts and the optional test scaffold.
//!
//! The main executable module is assembled in [`super::emit`]; everything
//! here is a pure `&Workflow`/`&GenerationContext` -> `String` generator.

use std::collections::BTreeMap;

use crate::codegen::template::{TemplateContext, Templates, TplValue, TEST_SCAFFOLD};
use crate::convert::builtin::env_key;
use crate::graph::types::Workflow;
use crate::ir::{GenerationContext, TargetVariant};

/// Known package versions for the manifest. Anything a converter declares
/// that is not listed here falls back to `"latest"`.
const PINNED_VERSIONS: &[(&str, &str)] = &[
    ("langchain", "^0.3.0"),
    ("@langchain/core", "^0.3.0"),
    ("@langchain/openai", "^0.3.0"),
    ("@langchain/community", "^0.3.0"),
    ("dotenv", "^16.4.0"),
];

pub fn pin_version(package: &str) -> &'static str {
    PINNED_VERSIONS
        .iter()
        .find(|(name, _)| *name == package)
        .map(|(_, version)| *version)
        .unwrap_or("latest")
}

/// Resolve a list of declared package names into a name -> version table.
pub fn resolve_dependencies(names: &[String]) -> BTreeMap<String, String> {
    names
        .iter()
        .map(|name| (name.clone(), pin_version(name).to_string()))
        .collect()
}

/// Generate `package.json` content.
pub fn gen_package_json(ctx: &GenerationContext, deps: &BTreeMap<String, String>) -> String {
    let name = if ctx.project_name.is_empty() {
        "generated-flow"
    } else {
        ctx.project_name.as_str()
    };
    let dep_entries: Vec<String> = deps
        .iter()
        .map(|(k, v)| format!("    \"{}\": \"{}\"", k, v))
        .collect();

    let mut dev_deps = vec![r#"    "vitest": "^2.0.0""#.to_string()];
    if matches!(ctx.target, TargetVariant::TypeScript) {
        dev_deps.insert(0, r#"    "typescript": "^5.5.0""#.to_string());
    }

    format!(
        r#"{{
  "name": "{name}",
  "version": "1.0.0",
  "private": true,
  "type": "module",
  "main": "index.{ext}",
  "scripts": {{
    "test": "vitest run"
  }},
  "dependencies": {{
{deps}
  }},
  "devDependencies": {{
{dev_deps}
  }}
}}
"#,
        ext = ctx.source_ext(),
        deps = dep_entries.join(",\n"),
        dev_deps = dev_deps.join(",\n"),
    )
}

/// Generate `.env.example` content from credential-typed parameters and the
/// context's environment table.
pub fn gen_env_example(workflow: &Workflow, ctx: &GenerationContext) -> String {
    let mut keys: Vec<String> = Vec::new();
    for node in &workflow.nodes {
        for (param_name, _) in node.credential_params() {
            let key = env_key(&node.node_type, param_name);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }

    let mut lines = vec![
        "# Environment template: copy to .env and fill in real values".to_string(),
    ];
    if keys.is_empty() && ctx.environment.is_empty() {
        lines.push("# No credentials required for this flow".to_string());
    } else {
        lines.push(String::new());
        for key in keys {
            lines.push(format!("{key}="));
        }
        for (key, value) in &ctx.environment {
            lines.push(format!("{key}={value}"));
        }
    }
    lines.push(String::new());
    lines.join("\n")
}

/// Generate `flow.config.json` content.
pub fn gen_flow_config(workflow: &Workflow, ctx: &GenerationContext) -> String {
    let target = match ctx.target {
        TargetVariant::TypeScript => "typescript",
        TargetVariant::JavaScript => "javascript",
    };
    let node_entries: Vec<String> = workflow
        .nodes
        .iter()
        .map(|n| {
            format!(
                "    {{ \"id\": \"{}\", \"type\": \"{}\" }}",
                n.id, n.node_type
            )
        })
        .collect();

    format!(
        r#"{{
  "name": "{name}",
  "version": "{version}",
  "target": "{target}",
  "nodes": [
{nodes}
  ]
}}
"#,
        name = ctx.project_name,
        version = workflow.metadata.version.as_deref().unwrap_or("1.0.0"),
        nodes = node_entries.join(",\n"),
    )
}

/// Generate `types.ts` content. TypeScript targets only.
pub fn gen_types(workflow: &Workflow) -> String {
    let mut out = String::new();
    out.push_str("export interface FlowInput {\n");
    out.push_str("  input: string;\n");
    out.push_str("  [key: string]: unknown;\n");
    out.push_str("}\n\n");
    out.push_str("export interface FlowOutput {\n");
    out.push_str("  output: unknown;\n");
    out.push_str("}\n\n");
    out.push_str("export type NodeKind =\n");
    let mut kinds: Vec<&str> = workflow
        .nodes
        .iter()
        .map(|n| n.node_type.as_str())
        .collect();
    kinds.sort_unstable();
    kinds.dedup();
    if kinds.is_empty() {
        out.push_str("  never;\n");
    } else {
        for (i, kind) in kinds.iter().enumerate() {
            let sep = if i + 1 == kinds.len() { ";" } else { "" };
            out.push_str(&format!("  | \"{kind}\"{sep}\n"));
        }
    }
    out
}

/// Generate the `__tests__/flow.test.ts` scaffold.
pub fn gen_test_scaffold(ctx: &GenerationContext) -> String {
    let templates = Templates::default();
    let mut tpl_ctx = TemplateContext::new();
    tpl_ctx.insert(
        "projectName".to_string(),
        TplValue::str(ctx.project_name.clone()),
    );
    templates.render(TEST_SCAFFOLD, &tpl_ctx)
}
