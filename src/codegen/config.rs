//! Generator configuration

use zerounit_core::vocab;

/// Settings for a generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Number of spaces per indentation level
    pub indent_width: usize,
    /// Name under which the generated source unit is registered
    pub hint_name: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            hint_name: vocab::DEFAULT_HINT_NAME.to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn with_hint_name(mut self, name: impl Into<String>) -> Self {
        self.hint_name = name.into();
        self
    }
}
