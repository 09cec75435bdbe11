//! Lightweight source formatting applied to every generated file.
//!
//! The pass is idempotent: `format(format(s)) == format(s)`. It normalizes
//! indentation, trailing whitespace, blank-line runs, statement semicolons
//! and (when loss-free) quote style.

use crate::ir::{QuoteStyle, StyleOptions};

/// Format a block of generated source according to the style options.
pub fn format_source(source: &str, style: &StyleOptions) -> String {
    let indent = " ".repeat(style.indent_width);
    let mut lines: Vec<String> = Vec::new();

    for raw in source.lines() {
        let line = raw.replace('\t', &indent);
        let line = line.trim_end().to_string();
        lines.push(line);
    }

    collapse_blank_runs(&mut lines);

    let mut out = String::new();
    for line in &lines {
        let mut line = line.clone();
        if style.semicolons {
            line = append_semicolon(&line);
        }
        line = normalize_quotes(&line, style.quote_style);
        out.push_str(&line);
        out.push('\n');
    }

    // Trailing blank lines collapse to a single terminating newline.
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

/// Collapse runs of 2+ blank lines into one, and drop leading blanks.
fn collapse_blank_runs(lines: &mut Vec<String>) {
    let mut kept = Vec::with_capacity(lines.len());
    let mut blank_run = 0usize;
    for line in lines.drain(..) {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 || kept.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        kept.push(line);
    }
    *lines = kept;
}

/// Append a semicolon to plain statement lines that are missing one.
///
/// Only lines that declare or assign are touched; control flow, braces,
/// comments, imports already carrying `;`, and continuation lines are left
/// alone. Conservative on purpose: a skipped semicolon is valid TypeScript,
/// a wrongly added one may not be.
fn append_semicolon(line: &str) -> String {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return line.to_string();
    }
    let needs = (trimmed.starts_with("const ")
        || trimmed.starts_with("let ")
        || trimmed.starts_with("var ")
        || trimmed.starts_with("return ")
        || trimmed == "return")
        && !trimmed.ends_with(';')
        && !trimmed.ends_with('{')
        && !trimmed.ends_with('(')
        && !trimmed.ends_with(',')
        && !trimmed.ends_with("=>")
        && !trimmed.ends_with('=')
        && !trimmed.ends_with('`')
        && balanced(trimmed);
    if needs {
        format!("{line};")
    } else {
        line.to_string()
    }
}

/// True when parens, brackets and braces all balance on the line.
fn balanced(line: &str) -> bool {
    let mut paren = 0i32;
    let mut bracket = 0i32;
    let mut brace = 0i32;
    for ch in line.chars() {
        match ch {
            '(' => paren += 1,
            ')' => paren -= 1,
            '[' => bracket += 1,
            ']' => bracket -= 1,
            '{' => brace += 1,
            '}' => brace -= 1,
            _ => {}
        }
    }
    paren == 0 && bracket == 0 && brace == 0
}

/// Swap string quotes to the configured style, but only when the line is
/// free of the target quote character (and of backticks), so the swap is
/// loss-free. Lines with mixed or template strings pass through untouched.
fn normalize_quotes(line: &str, style: QuoteStyle) -> String {
    let want = style.char();
    let other = style.other();
    if !line.contains(other) {
        return line.to_string();
    }
    if line.contains(want) || line.contains('`') || line.contains('\\') {
        return line.to_string();
    }
    line.replace(other, &want.to_string())
}
