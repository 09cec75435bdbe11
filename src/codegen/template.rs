//! Micro template engine for named code templates.
//!
//! Supports `{{var}}` interpolation, `{{#if flag}}...{{else}}...{{/if}}`
//! conditionals and `{{#each list}}...{{/each}}` iteration. `{{.}}` is the
//! current item inside an `each` block; map items expose their keys as
//! variables, shadowing the outer scope. Unknown variables render empty.
//!
//! Template state is a plain value passed into every call; nothing is
//! shared or mutated across renders.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum TplValue {
    Str(String),
    Bool(bool),
    List(Vec<TplValue>),
    Map(BTreeMap<String, TplValue>),
}

impl TplValue {
    pub fn str(s: impl Into<String>) -> Self {
        TplValue::Str(s.into())
    }

    fn truthy(&self) -> bool {
        match self {
            TplValue::Str(s) => !s.is_empty(),
            TplValue::Bool(b) => *b,
            TplValue::List(l) => !l.is_empty(),
            TplValue::Map(m) => !m.is_empty(),
        }
    }

    fn render(&self) -> String {
        match self {
            TplValue::Str(s) => s.clone(),
            TplValue::Bool(b) => b.to_string(),
            TplValue::List(_) | TplValue::Map(_) => String::new(),
        }
    }
}

pub type TemplateContext = BTreeMap<String, TplValue>;

// =============================================================================
// PARSING
// =============================================================================

#[derive(Debug)]
enum Segment {
    Text(String),
    Var(String),
    If {
        name: String,
        then: Vec<Segment>,
        otherwise: Vec<Segment>,
    },
    Each {
        name: String,
        body: Vec<Segment>,
    },
}

#[derive(Debug)]
enum Token {
    Text(String),
    Var(String),
    IfOpen(String),
    Else,
    IfClose,
    EachOpen(String),
    EachClose,
}

fn tokenize(template: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        if open > 0 {
            tokens.push(Token::Text(rest[..open].to_string()));
        }
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            // Unterminated tag: treat the remainder as literal text.
            tokens.push(Token::Text(rest[open..].to_string()));
            return tokens;
        };
        let tag = after[..close].trim();
        rest = &after[close + 2..];

        if let Some(name) = tag.strip_prefix("#if ") {
            tokens.push(Token::IfOpen(name.trim().to_string()));
        } else if let Some(name) = tag.strip_prefix("#each ") {
            tokens.push(Token::EachOpen(name.trim().to_string()));
        } else if tag == "else" {
            tokens.push(Token::Else);
        } else if tag == "/if" {
            tokens.push(Token::IfClose);
        } else if tag == "/each" {
            tokens.push(Token::EachClose);
        } else {
            tokens.push(Token::Var(tag.to_string()));
        }
    }
    if !rest.is_empty() {
        tokens.push(Token::Text(rest.to_string()));
    }
    tokens
}

fn parse(tokens: &mut std::vec::IntoIter<Token>) -> Vec<Segment> {
    parse_until(tokens, &mut |_| false).0
}

/// Parse segments until `stop` matches a control token (consumed).
/// Returns the segments and the stopping token, if any.
fn parse_until(
    tokens: &mut std::vec::IntoIter<Token>,
    stop: &mut dyn FnMut(&Token) -> bool,
) -> (Vec<Segment>, Option<Token>) {
    let mut segments = Vec::new();

    while let Some(token) = tokens.next() {
        if stop(&token) {
            return (segments, Some(token));
        }
        match token {
            Token::Text(t) => segments.push(Segment::Text(t)),
            Token::Var(v) => segments.push(Segment::Var(v)),
            Token::IfOpen(name) => {
                let (then, stopped) = parse_until(tokens, &mut |t| {
                    matches!(t, Token::Else | Token::IfClose)
                });
                let otherwise = if matches!(stopped, Some(Token::Else)) {
                    parse_until(tokens, &mut |t| matches!(t, Token::IfClose)).0
                } else {
                    Vec::new()
                };
                segments.push(Segment::If {
                    name,
                    then,
                    otherwise,
                });
            }
            Token::EachOpen(name) => {
                let (body, _) = parse_until(tokens, &mut |t| matches!(t, Token::EachClose));
                segments.push(Segment::Each { name, body });
            }
            // Stray closers render as nothing.
            Token::Else | Token::IfClose | Token::EachClose => {}
        }
    }

    (segments, None)
}

// =============================================================================
// EVALUATION
// =============================================================================

fn lookup<'a>(name: &str, scopes: &'a [&TemplateContext]) -> Option<&'a TplValue> {
    scopes.iter().rev().find_map(|scope| scope.get(name))
}

fn eval(segments: &[Segment], scopes: &[&TemplateContext], out: &mut String) {
    for segment in segments {
        match segment {
            Segment::Text(t) => out.push_str(t),
            Segment::Var(name) => {
                if let Some(value) = lookup(name, scopes) {
                    out.push_str(&value.render());
                }
            }
            Segment::If {
                name,
                then,
                otherwise,
            } => {
                let truthy = lookup(name, scopes).map(TplValue::truthy).unwrap_or(false);
                eval(if truthy { then } else { otherwise }, scopes, out);
            }
            Segment::Each { name, body } => {
                let Some(TplValue::List(items)) = lookup(name, scopes) else {
                    continue;
                };
                for item in items {
                    let mut scope = TemplateContext::new();
                    scope.insert(".".into(), item.clone());
                    if let TplValue::Map(fields) = item {
                        for (k, v) in fields {
                            scope.insert(k.clone(), v.clone());
                        }
                    }
                    let mut inner: Vec<&TemplateContext> = scopes.to_vec();
                    inner.push(&scope);
                    eval(body, &inner, out);
                }
            }
        }
    }
}

/// Render a template string against a context.
pub fn render_str(template: &str, ctx: &TemplateContext) -> String {
    let tokens = tokenize(template);
    let segments = parse(&mut tokens.into_iter());
    let mut out = String::new();
    eval(&segments, &[ctx], &mut out);
    out
}

// =============================================================================
// NAMED REGISTRY
// =============================================================================

/// The named templates used by the file assembler.
pub struct Templates {
    by_name: BTreeMap<&'static str, &'static str>,
}

pub const MODULE_HEADER: &str = "module_header";
pub const FUNCTION_DECLARATION: &str = "function_declaration";
pub const CONFIG_OBJECT: &str = "config_object";
pub const TEST_SCAFFOLD: &str = "test_scaffold";

impl Default for Templates {
    fn default() -> Self {
        let mut by_name = BTreeMap::new();
        by_name.insert(
            MODULE_HEADER,
            "// Generated by flowgen. Do not edit by hand.\n// Project: {{projectName}}\n{{#if description}}// {{description}}\n{{/if}}",
        );
        by_name.insert(
            FUNCTION_DECLARATION,
            "export {{#if isAsync}}async {{/if}}function {{name}}({{params}}) {\n{{body}}\n}",
        );
        by_name.insert(
            CONFIG_OBJECT,
            "{{#each entries}}  {{key}}: {{value}},\n{{/each}}",
        );
        by_name.insert(
            TEST_SCAFFOLD,
            "import { describe, expect, test } from \"vitest\";\nimport { runFlow } from \"../index\";\n\ndescribe(\"{{projectName}}\", () => {\n  test(\"runs the flow\", async () => {\n    const result = await runFlow({ input: \"hello\" });\n    expect(result).toBeDefined();\n  });\n});\n",
        );
        Templates { by_name }
    }
}

impl Templates {
    /// Render a named template. Unknown names render empty, mirroring the
    /// unknown-variable policy.
    pub fn render(&self, name: &str, ctx: &TemplateContext) -> String {
        self.by_name
            .get(name)
            .map(|t| render_str(t, ctx))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, TplValue)]) -> TemplateContext {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn interpolates_variables() {
        let c = ctx(&[("name", TplValue::str("world"))]);
        assert_eq!(render_str("hello {{name}}!", &c), "hello world!");
    }

    #[test]
    fn unknown_variables_render_empty() {
        let c = TemplateContext::new();
        assert_eq!(render_str("[{{missing}}]", &c), "[]");
    }

    #[test]
    fn if_blocks_follow_truthiness() {
        let c = ctx(&[("on", TplValue::Bool(true)), ("off", TplValue::Bool(false))]);
        assert_eq!(render_str("{{#if on}}yes{{/if}}", &c), "yes");
        assert_eq!(render_str("{{#if off}}yes{{else}}no{{/if}}", &c), "no");
        assert_eq!(render_str("{{#if absent}}yes{{else}}no{{/if}}", &c), "no");
    }

    #[test]
    fn each_iterates_string_items() {
        let c = ctx(&[(
            "items",
            TplValue::List(vec![TplValue::str("a"), TplValue::str("b")]),
        )]);
        assert_eq!(render_str("{{#each items}}<{{.}}>{{/each}}", &c), "<a><b>");
    }

    #[test]
    fn each_exposes_map_keys() {
        let mut entry = BTreeMap::new();
        entry.insert("key".to_string(), TplValue::str("retries"));
        entry.insert("value".to_string(), TplValue::str("3"));
        let c = ctx(&[("entries", TplValue::List(vec![TplValue::Map(entry)]))]);
        assert_eq!(
            render_str("{{#each entries}}{{key}}={{value}};{{/each}}", &c),
            "retries=3;"
        );
    }

    #[test]
    fn nested_if_inside_each() {
        let c = ctx(&[
            (
                "items",
                TplValue::List(vec![TplValue::str("x"), TplValue::str("")]),
            ),
        ]);
        assert_eq!(
            render_str("{{#each items}}{{#if .}}[{{.}}]{{else}}[-]{{/if}}{{/each}}", &c),
            "[x][-]"
        );
    }

    #[test]
    fn named_module_header() {
        let templates = Templates::default();
        let c = ctx(&[("projectName", TplValue::str("demo"))]);
        let out = templates.render(MODULE_HEADER, &c);
        assert!(out.contains("Project: demo"));
        assert!(!out.contains("// \n"));
    }

    #[test]
    fn named_function_declaration() {
        let templates = Templates::default();
        let c = ctx(&[
            ("name", TplValue::str("runFlow")),
            ("params", TplValue::str("input")),
            ("body", TplValue::str("  return input;")),
            ("isAsync", TplValue::Bool(true)),
        ]);
        assert_eq!(
            templates.render(FUNCTION_DECLARATION, &c),
            "export async function runFlow(input) {\n  return input;\n}"
        );

        let mut sync = c.clone();
        sync.insert("isAsync".into(), TplValue::Bool(false));
        assert!(templates
            .render(FUNCTION_DECLARATION, &sync)
            .starts_with("export function runFlow"));
    }

    #[test]
    fn named_config_object() {
        let templates = Templates::default();
        let mut retries = BTreeMap::new();
        retries.insert("key".to_string(), TplValue::str("retries"));
        retries.insert("value".to_string(), TplValue::str("3"));
        let mut verbose = BTreeMap::new();
        verbose.insert("key".to_string(), TplValue::str("verbose"));
        verbose.insert("value".to_string(), TplValue::str("true"));
        let c = ctx(&[(
            "entries",
            TplValue::List(vec![TplValue::Map(retries), TplValue::Map(verbose)]),
        )]);
        assert_eq!(
            templates.render(CONFIG_OBJECT, &c),
            "  retries: 3,\n  verbose: true,\n"
        );
    }

    #[test]
    fn unterminated_tag_is_literal() {
        let c = TemplateContext::new();
        assert_eq!(render_str("oops {{broken", &c), "oops {{broken");
    }
}
