//! Final assembly: turn ordered fragments into named output artifacts.

pub mod files;
pub mod format;
pub mod template;
pub mod writer;

use crate::assemble::fragments::AssembledFragments;
use crate::assemble::imports::consolidate_block;
use crate::codegen::template::{TemplateContext, Templates, TplValue, MODULE_HEADER};
use crate::codegen::writer::CodeWriter;
use crate::graph::types::Workflow;
use crate::ir::{
    Complexity, ConversionResult, FileKind, GeneratedFile, GenerationContext, FragmentKind,
    ResultMetadata, TargetVariant,
};

/// Assemble the main executable module: consolidated imports, declarations,
/// initializations, an async `runFlow` wrapper around the execution
/// fragments, then explicit export fragments.
pub fn gen_main_module(
    workflow: &Workflow,
    ctx: &GenerationContext,
    assembled: &AssembledFragments,
) -> String {
    let mut w = CodeWriter::new(ctx.style.indent_width);

    if ctx.include_comments {
        let templates = Templates::default();
        let mut tpl_ctx = TemplateContext::new();
        tpl_ctx.insert(
            "projectName".to_string(),
            TplValue::str(ctx.project_name.clone()),
        );
        if let Some(description) = &workflow.metadata.description {
            tpl_ctx.insert("description".to_string(), TplValue::str(description.clone()));
        }
        w.lines(&templates.render(MODULE_HEADER, &tpl_ctx));
        w.blank();
    }

    // Imports: converter-emitted import fragments, consolidated per module.
    let mut import_lines: Vec<String> = Vec::new();
    if reads_env(assembled) {
        import_lines.push("import \"dotenv/config\";".to_string());
    }
    for fragment in assembled.of_kind(FragmentKind::Import) {
        for line in fragment.content.lines() {
            if !line.trim().is_empty() {
                import_lines.push(line.to_string());
            }
        }
    }
    if !import_lines.is_empty() {
        w.lines(consolidate_block(&import_lines).trim_end());
        w.blank();
    }

    for fragment in assembled.of_kind(FragmentKind::Declaration) {
        w.lines(&fragment.content);
    }
    if !assembled.of_kind(FragmentKind::Declaration).is_empty() {
        w.blank();
    }

    for fragment in assembled.of_kind(FragmentKind::Initialization) {
        w.lines(&fragment.content);
    }
    if !assembled.of_kind(FragmentKind::Initialization).is_empty() {
        w.blank();
    }

    let input_type = match ctx.target {
        TargetVariant::TypeScript => "input: Record<string, unknown>",
        TargetVariant::JavaScript => "input",
    };
    // `runFlow` is async only when some execution fragment awaits.
    let keyword = if assembled.any_async() {
        "async function"
    } else {
        "function"
    };
    w.block_open(&format!("export {keyword} runFlow({input_type})"));
    if ctx.instrumentation {
        w.line(&format!("console.time(\"{}\");", ctx.project_name));
    }
    for fragment in assembled.of_kind(FragmentKind::Execution) {
        w.lines(&fragment.content);
    }
    if ctx.instrumentation {
        w.line(&format!("console.timeEnd(\"{}\");", ctx.project_name));
    }
    match last_execution_export(assembled) {
        Some(result) => w.line(&format!("return {result};")),
        None => w.line("return input;"),
    }
    w.block_close();

    for fragment in assembled.of_kind(FragmentKind::Export) {
        w.blank();
        w.lines(&fragment.content);
    }

    w.finish()
}

/// Produce the full artifact set plus result metadata.
pub fn emit(
    workflow: &Workflow,
    ctx: &GenerationContext,
    assembled: &AssembledFragments,
    converter_deps: &[String],
    warnings: Vec<String>,
) -> ConversionResult {
    let mut dep_names: Vec<String> = converter_deps.to_vec();
    for dep in assembled.dependencies() {
        if !dep_names.contains(&dep) {
            dep_names.push(dep);
        }
    }
    if reads_env(assembled) && !dep_names.iter().any(|d| d == "dotenv") {
        dep_names.push("dotenv".to_string());
    }
    let dependencies = files::resolve_dependencies(&dep_names);

    let mut out = Vec::new();

    let main = format::format_source(&gen_main_module(workflow, ctx, assembled), &ctx.style);
    let mut main_file = GeneratedFile::new(
        ctx.file_path(&format!("index.{}", ctx.source_ext())),
        main,
        FileKind::Module,
    );
    main_file.exports = main_exports(assembled);
    out.push(main_file);

    if matches!(ctx.target, TargetVariant::TypeScript) {
        let types = format::format_source(&files::gen_types(workflow), &ctx.style);
        let mut types_file =
            GeneratedFile::new(ctx.file_path("types.ts"), types, FileKind::Types);
        types_file.exports = vec![
            "FlowInput".to_string(),
            "FlowOutput".to_string(),
            "NodeKind".to_string(),
        ];
        out.push(types_file);
    }

    // JSON and env artifacts skip the source formatter: quote and semicolon
    // normalization is for the target language only.
    out.push(GeneratedFile::new(
        ctx.file_path("flow.config.json"),
        files::gen_flow_config(workflow, ctx),
        FileKind::Config,
    ));
    out.push(GeneratedFile::new(
        ctx.file_path("package.json"),
        files::gen_package_json(ctx, &dependencies),
        FileKind::Manifest,
    ));
    out.push(GeneratedFile::new(
        ctx.file_path(".env.example"),
        files::gen_env_example(workflow, ctx),
        FileKind::EnvTemplate,
    ));

    if ctx.include_tests {
        let scaffold = format::format_source(&files::gen_test_scaffold(ctx), &ctx.style);
        out.push(GeneratedFile::new(
            ctx.file_path(&format!("__tests__/flow.test.{}", ctx.source_ext())),
            scaffold,
            FileKind::Test,
        ));
    }

    ConversionResult {
        files: out,
        dependencies,
        warnings,
        errors: Vec::new(),
        metadata: ResultMetadata {
            project_name: ctx.project_name.clone(),
            node_count: workflow.nodes.len(),
            connection_count: workflow.connections.len(),
            complexity: Complexity::estimate(workflow.nodes.len(), workflow.connections.len()),
        },
    }
}

/// True when any fragment reads an environment variable: those modules need
/// dotenv loaded before the first declaration runs.
fn reads_env(assembled: &AssembledFragments) -> bool {
    assembled.iter().any(|f| f.content.contains("process.env."))
}

/// The binding the generated `runFlow` returns: the last symbol the last
/// execution fragment introduced.
fn last_execution_export(assembled: &AssembledFragments) -> Option<String> {
    assembled
        .of_kind(FragmentKind::Execution)
        .iter()
        .rev()
        .find_map(|f| f.meta.exports.last().cloned())
}

fn main_exports(assembled: &AssembledFragments) -> Vec<String> {
    let mut exports = vec!["runFlow".to_string()];
    for export in assembled.exports() {
        if !exports.contains(&export) {
            exports.push(export);
        }
    }
    exports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::fragments::assemble;
    use crate::graph::types::WorkflowMetadata;
    use crate::ir::CodeFragment;

    fn empty_workflow() -> Workflow {
        Workflow {
            metadata: WorkflowMetadata::default(),
            nodes: vec![],
            connections: vec![],
        }
    }

    fn fragment(kind: FragmentKind, content: &str, order: u64) -> CodeFragment {
        let mut f = CodeFragment::new(format!("f{order}"), kind, content);
        f.meta.order = order;
        f
    }

    #[test]
    fn main_module_buckets_appear_in_order() {
        let assembled = assemble(vec![
            fragment(FragmentKind::Execution, "const r = await c.invoke(input);", 2000)
                .asynchronous(),
            fragment(FragmentKind::Declaration, "const c = make();", 1000),
            fragment(FragmentKind::Import, "import { make } from \"pkg\";", 0),
        ]);
        let ctx = GenerationContext::new("demo");
        let main = gen_main_module(&empty_workflow(), &ctx, &assembled);

        let import_at = main.find("import { make }").unwrap();
        let decl_at = main.find("const c = make()").unwrap();
        let exec_at = main.find("await c.invoke").unwrap();
        assert!(import_at < decl_at && decl_at < exec_at);
        assert!(main.contains("export async function runFlow"));
    }

    #[test]
    fn run_flow_is_synchronous_without_async_fragments() {
        let assembled = assemble(vec![fragment(
            FragmentKind::Declaration,
            "const tool = new Calculator();",
            0,
        )]);
        let ctx = GenerationContext::new("demo");
        let main = gen_main_module(&empty_workflow(), &ctx, &assembled);
        assert!(main.contains("export function runFlow"));
        assert!(!main.contains("async function"));
    }

    #[test]
    fn env_access_pulls_in_dotenv() {
        let decl = fragment(
            FragmentKind::Declaration,
            "const key = process.env.SERP_API_API_KEY;",
            0,
        );
        let assembled = assemble(vec![decl]);
        let ctx = GenerationContext::new("demo");

        let main = gen_main_module(&empty_workflow(), &ctx, &assembled);
        assert!(main.contains("import \"dotenv/config\";"));

        let result = emit(&empty_workflow(), &ctx, &assembled, &[], vec![]);
        assert!(result.dependencies.contains_key("dotenv"));
    }

    #[test]
    fn modules_without_env_access_skip_dotenv() {
        let assembled = assemble(vec![fragment(
            FragmentKind::Declaration,
            "const tool = new Calculator();",
            0,
        )]);
        let ctx = GenerationContext::new("demo");

        let main = gen_main_module(&empty_workflow(), &ctx, &assembled);
        assert!(!main.contains("dotenv"));

        let result = emit(&empty_workflow(), &ctx, &assembled, &[], vec![]);
        assert!(!result.dependencies.contains_key("dotenv"));
    }

    #[test]
    fn instrumentation_flag_adds_timing() {
        let assembled = assemble(vec![]);
        let mut ctx = GenerationContext::new("demo");
        assert!(!gen_main_module(&empty_workflow(), &ctx, &assembled).contains("console.time"));
        ctx.instrumentation = true;
        let main = gen_main_module(&empty_workflow(), &ctx, &assembled);
        assert!(main.contains("console.time(\"demo\")"));
        assert!(main.contains("console.timeEnd(\"demo\")"));
    }

    #[test]
    fn run_flow_returns_last_execution_export() {
        let exec = fragment(FragmentKind::Execution, "const out = await c.invoke(input);", 1000)
            .with_exports(&["out"])
            .asynchronous();
        let assembled = assemble(vec![exec]);
        let ctx = GenerationContext::new("demo");
        let main = gen_main_module(&empty_workflow(), &ctx, &assembled);
        assert!(main.contains("return out;"));
    }

    #[test]
    fn emit_produces_the_fixed_artifact_set() {
        let assembled = assemble(vec![]);
        let mut ctx = GenerationContext::new("demo");
        ctx.include_tests = true;
        let result = emit(&empty_workflow(), &ctx, &assembled, &[], vec![]);

        let paths: Vec<&str> = result.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "index.ts",
                "types.ts",
                "flow.config.json",
                "package.json",
                ".env.example",
                "__tests__/flow.test.ts",
            ]
        );
        for file in &result.files {
            assert_eq!(file.size, file.content.len());
        }
        assert!(result.errors.is_empty());
    }

    #[test]
    fn javascript_target_drops_types_file() {
        let assembled = assemble(vec![]);
        let mut ctx = GenerationContext::new("demo");
        ctx.target = TargetVariant::JavaScript;
        let result = emit(&empty_workflow(), &ctx, &assembled, &[], vec![]);
        assert!(result.files.iter().all(|f| f.kind != FileKind::Types));
        assert_eq!(result.files[0].path, "index.js");
    }
}
