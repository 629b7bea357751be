//! Output writer with indentation tracking
//!
//! Indentation is applied lazily: the first write on a line emits the current indent. Blank lines never carry
//! trailing whitespace, and preprocessor lines can bypass indentation entirely.

use super::config::GeneratorConfig;

/// Writer that tracks indentation and builds generated source.
pub struct CodeWriter {
    output: String,
    indent_level: usize,
    indent_width: usize,
    at_line_start: bool,
}

impl CodeWriter {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            indent_width: config.indent_width,
            at_line_start: true,
        }
    }

    /// Get the generated text
    pub fn finish(self) -> String {
        self.output
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    pub fn current_indent(&self) -> usize {
        self.indent_level
    }

    fn write_indent(&mut self) {
        if self.at_line_start {
            let width = self.indent_level * self.indent_width;
            self.output.extend(std::iter::repeat_n(' ', width));
            self.at_line_start = false;
        }
    }

    /// Write a string (with auto-indent)
    pub fn write(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.write_indent();
        self.output.push_str(s);
    }

    /// Write a string and newline
    pub fn writeln(&mut self, s: &str) {
        self.write(s);
        self.newline();
    }

    /// Write a line at column zero, whatever the current indentation.
    ///
    /// Used for `#pragma` lines. Must be called at the start of a line.
    pub fn writeln_unindented(&mut self, s: &str) {
        debug_assert!(self.at_line_start, "unindented line written mid-line");
        self.output.push_str(s);
        self.newline();
    }

    pub fn newline(&mut self) {
        self.output.push('\n');
        self.at_line_start = true;
    }

    /// `{`, then indent.
    pub fn open_brace(&mut self) {
        self.writeln("{");
        self.indent();
    }

    /// Dedent, then `suffix` after the closing brace (`}`, `});`, `};`).
    pub fn close_brace(&mut self, suffix: &str) {
        self.dedent();
        self.write("}");
        self.writeln(suffix);
    }
}
