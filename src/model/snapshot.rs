//! JSON snapshots of a compilation
//!
//! An external analysis step serialises the host program into a [`Compilation`]. Loading checks every symbol
//! reference so the generator can index without further checks:
//! - namespace parents and type containers must be declared *before* the symbol that refers to them, which also
//!   rules out containment cycles;
//! - interface, owner, and entry-point references must resolve.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use super::{Compilation, Container};

/// Error raised while loading a compilation snapshot.
#[derive(Debug, Error, Diagnostic)]
pub enum SnapshotError {
    #[error("malformed compilation snapshot: {message}")]
    #[diagnostic(code(zerounit::snapshot::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("{referrer} refers to {target} #{index}, which is not declared before it")]
    #[diagnostic(
        code(zerounit::snapshot::dangling_reference),
        help("symbols must be listed after the namespaces and types that contain them")
    )]
    DanglingReference {
        referrer: String,
        target: &'static str,
        index: usize,
    },
}

impl Compilation {
    /// Parse and validate a JSON snapshot. `name` labels the source in diagnostics.
    pub fn from_json(name: &str, text: &str) -> Result<Self, SnapshotError> {
        let compilation: Compilation = serde_json::from_str(text).map_err(|err| SnapshotError::Syntax {
            message: err.to_string(),
            span: (byte_offset(text, err.line(), err.column()), 1).into(),
            src: NamedSource::new(name, text.to_string()),
        })?;
        compilation.validate()?;
        Ok(compilation)
    }

    /// Serialise as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check that every symbol reference resolves.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        for (index, namespace) in self.namespaces.iter().enumerate() {
            if let Some(parent) = namespace.parent {
                if parent.0 >= index {
                    return Err(dangling(format!("namespace `{}`", namespace.name), "namespace", parent.0));
                }
            }
        }

        for (index, ty) in self.types.iter().enumerate() {
            let referrer = || format!("type `{}`", ty.name);
            match ty.container {
                Container::Global => {}
                Container::Namespace(ns) if ns.0 >= self.namespaces.len() => {
                    return Err(dangling(referrer(), "namespace", ns.0));
                }
                Container::Type(outer) if outer.0 >= index => {
                    return Err(dangling(referrer(), "type", outer.0));
                }
                Container::Namespace(_) | Container::Type(_) => {}
            }
            if let Some(interface) = ty.interfaces.iter().find(|id| id.0 >= self.types.len()) {
                return Err(dangling(referrer(), "type", interface.0));
            }
        }

        for method in &self.methods {
            if method.owner.0 >= self.types.len() {
                return Err(dangling(format!("method `{}`", method.name), "type", method.owner.0));
            }
        }

        if let Some(entry) = self.entry_point {
            if entry.0 >= self.methods.len() {
                return Err(dangling("entry point".to_string(), "method", entry.0));
            }
        }

        Ok(())
    }
}

fn dangling(referrer: String, target: &'static str, index: usize) -> SnapshotError {
    SnapshotError::DanglingReference {
        referrer,
        target,
        index,
    }
}

/// Convert serde_json's 1-based line/column into a byte offset, clamped to the text.
fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len().saturating_sub(1))
}
