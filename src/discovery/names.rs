//! Name Qualifier
//!
//! Builds metadata-stable, fully qualified names. Walking outward from a symbol, each containing scope contributes
//! its metadata name; a boundary between two type scopes is written `+`, any other boundary `.`. The global
//! namespace is never part of the name.
//!
//! `Inner` nested in `Outer` in namespace `A.B` qualifies as `A.B.Outer+Inner`.

use std::fmt;

use crate::model::{Container, MethodId, NamespaceId, SemanticModel, TypeId};

/// A fully qualified name. Used verbatim both as an invocation target and as a report label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName(String);

impl QualifiedName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for QualifiedName {
    fn from(name: String) -> Self {
        QualifiedName(name)
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        QualifiedName(name.to_string())
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Qualified name of a type.
pub fn qualify_type<M: SemanticModel + ?Sized>(model: &M, id: TypeId) -> QualifiedName {
    let ty = model.type_symbol(id);
    qualify(model, ty.metadata_name(), true, ty.container)
}

/// Qualified name of a namespace (always dot-separated).
pub fn qualify_namespace<M: SemanticModel + ?Sized>(model: &M, id: NamespaceId) -> QualifiedName {
    let ns = model.namespace(id);
    let container = ns.parent.map_or(Container::Global, Container::Namespace);
    qualify(model, &ns.name, false, container)
}

/// Report label of a method: `{qualified owner}.{method name}`.
pub fn qualify_method<M: SemanticModel + ?Sized>(model: &M, id: MethodId) -> QualifiedName {
    let method = model.method(id);
    let owner = qualify_type(model, method.owner);
    QualifiedName(format!("{}.{}", owner, method.name))
}

fn qualify<'a, M: SemanticModel + ?Sized>(
    model: &'a M,
    leaf: &'a str,
    leaf_is_type: bool,
    mut current: Container,
) -> QualifiedName {
    let mut parts = vec![leaf];
    let mut last_is_type = leaf_is_type;

    loop {
        let (name, is_type, next) = match current {
            Container::Global => break,
            Container::Namespace(id) => {
                let ns = model.namespace(id);
                (ns.name.as_str(), false, ns.parent.map_or(Container::Global, Container::Namespace))
            }
            Container::Type(id) => {
                let ty = model.type_symbol(id);
                (ty.metadata_name(), true, ty.container)
            }
        };
        parts.push(if is_type && last_is_type { "+" } else { "." });
        parts.push(name);
        last_is_type = is_type;
        current = next;
    }

    parts.reverse();
    QualifiedName(parts.concat())
}
