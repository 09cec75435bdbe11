//! Indent-aware string builder for generated source.

/// Indent-aware string builder. Indent width comes from the caller's style
/// options so one writer serves both 2- and 4-space projects.
pub struct CodeWriter {
    buf: String,
    indent_level: usize,
    indent_width: usize,
    at_line_start: bool,
}

impl CodeWriter {
    pub fn new(indent_width: usize) -> Self {
        Self {
            buf: String::with_capacity(4096),
            indent_level: 0,
            indent_width,
            at_line_start: true,
        }
    }

    /// Write a complete line (appends newline).
    pub fn line(&mut self, text: &str) {
        self.write_indent();
        self.buf.push_str(text);
        self.buf.push('\n');
        self.at_line_start = true;
    }

    /// Write a multi-line chunk, indenting every line.
    pub fn lines(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.blank();
            } else {
                self.line(line);
            }
        }
    }

    /// Write an empty line.
    pub fn blank(&mut self) {
        self.buf.push('\n');
        self.at_line_start = true;
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Write `text {` and increase indent.
    pub fn block_open(&mut self, text: &str) {
        self.line(&format!("{} {{", text));
        self.indent();
    }

    /// Decrease indent and write `}`.
    pub fn block_close(&mut self) {
        self.dedent();
        self.line("}");
    }

    /// Consume the writer and return the generated string.
    pub fn finish(self) -> String {
        self.buf
    }

    fn write_indent(&mut self) {
        if self.at_line_start && self.indent_level > 0 {
            for _ in 0..self.indent_level * self.indent_width {
                self.buf.push(' ');
            }
        }
        self.at_line_start = false;
    }
}
