//! Import consolidation: merge the raw import statements emitted by
//! converters into one statement per module.
//!
//! Consolidation is idempotent: feeding the rendered output back through
//! the consolidator reproduces it byte for byte.

use std::collections::BTreeSet;

/// A parsed ES import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub module: String,
    pub default_binding: Option<String>,
    pub namespace_binding: Option<String>,
    /// Named bindings, possibly aliased (`name` or `name as alias`).
    pub named: BTreeSet<String>,
    /// Bare `import "module";` side-effect form.
    pub side_effect: bool,
}

impl ImportStatement {
    fn new(module: &str) -> Self {
        ImportStatement {
            module: module.to_string(),
            default_binding: None,
            namespace_binding: None,
            named: BTreeSet::new(),
            side_effect: false,
        }
    }
}

/// Parse a single import line. Returns `None` for anything that is not a
/// recognizable import statement; such lines pass through unconsolidated.
pub fn parse_import(line: &str) -> Option<ImportStatement> {
    let line = line.trim().trim_end_matches(';').trim();
    let rest = line.strip_prefix("import")?.trim();

    // Side-effect form: import "module"
    if let Some(module) = unquote(rest) {
        let mut stmt = ImportStatement::new(module);
        stmt.side_effect = true;
        return Some(stmt);
    }

    let (bindings, module_part) = rest.split_once(" from ")?;
    let module = unquote(module_part.trim())?;
    let mut stmt = ImportStatement::new(module);

    for part in split_bindings(bindings.trim()) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some(ns) = part.strip_prefix("* as ") {
            stmt.namespace_binding = Some(ns.trim().to_string());
        } else if part.starts_with('{') {
            let inner = part.trim_start_matches('{').trim_end_matches('}');
            for name in inner.split(',') {
                let name = name.trim();
                if !name.is_empty() {
                    stmt.named.insert(name.to_string());
                }
            }
        } else {
            stmt.default_binding = Some(part.to_string());
        }
    }

    Some(stmt)
}

/// Split the binding section on top-level commas (commas inside `{ }` stay).
fn split_bindings(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn unquote(s: &str) -> Option<&str> {
    let s = s.trim();
    if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
    {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

/// Merge import statements per module. Module order is first-seen; named
/// bindings are deduplicated and sorted; the first default and namespace
/// bindings win. Unparseable lines are returned separately, verbatim.
pub fn consolidate(lines: &[String]) -> (Vec<ImportStatement>, Vec<String>) {
    let mut statements: Vec<ImportStatement> = Vec::new();
    let mut passthrough = Vec::new();

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some(parsed) = parse_import(trimmed) else {
            if !passthrough.contains(line) {
                passthrough.push(line.clone());
            }
            continue;
        };

        match statements.iter_mut().find(|s| s.module == parsed.module) {
            Some(existing) => {
                if existing.default_binding.is_none() {
                    existing.default_binding = parsed.default_binding;
                }
                if existing.namespace_binding.is_none() {
                    existing.namespace_binding = parsed.namespace_binding;
                }
                existing.named.extend(parsed.named);
                existing.side_effect &= parsed.side_effect;
            }
            None => statements.push(parsed),
        }
    }

    (statements, passthrough)
}

/// Render merged statements back to source, one line per module, followed
/// by any passthrough lines.
pub fn render(statements: &[ImportStatement], passthrough: &[String]) -> String {
    let mut out = String::new();

    for stmt in statements {
        if stmt.side_effect
            && stmt.default_binding.is_none()
            && stmt.namespace_binding.is_none()
            && stmt.named.is_empty()
        {
            out.push_str(&format!("import \"{}\";\n", stmt.module));
            continue;
        }

        let mut bindings = Vec::new();
        if let Some(default) = &stmt.default_binding {
            bindings.push(default.clone());
        }
        if let Some(ns) = &stmt.namespace_binding {
            bindings.push(format!("* as {ns}"));
        }
        if !stmt.named.is_empty() {
            let named: Vec<&str> = stmt.named.iter().map(String::as_str).collect();
            bindings.push(format!("{{ {} }}", named.join(", ")));
        }

        out.push_str(&format!(
            "import {} from \"{}\";\n",
            bindings.join(", "),
            stmt.module
        ));
    }

    for line in passthrough {
        out.push_str(line);
        out.push('\n');
    }

    out
}

/// Consolidate and render in one step.
pub fn consolidate_block(lines: &[String]) -> String {
    let (statements, passthrough) = consolidate(lines);
    render(&statements, &passthrough)
}
