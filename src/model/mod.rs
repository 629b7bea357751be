//! Static-analysis model consumed by the generator
//!
//! The generator never parses host source itself. An external analysis step describes the host program as a
//! [`Compilation`]: namespaces, types, and methods (in declaration order) plus the designated entry point. The
//! generator reads it through the [`SemanticModel`] trait, so embedders can plug in their own symbol tables.
//!
//! ## Modules
//!
//! - `builder` - Programmatic construction of well-formed compilations
//! - `snapshot` - JSON snapshot loading and validation

pub mod builder;
pub mod snapshot;

use serde::{Deserialize, Serialize};

pub use builder::{CompilationBuilder, MethodBuilder, TypeBuilder};
pub use snapshot::SnapshotError;

// ============================================================================
// Symbol identifiers
// ============================================================================

/// Index of a namespace in a [`Compilation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceId(pub usize);

/// Index of a type in a [`Compilation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub usize);

/// Index of a method in a [`Compilation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodId(pub usize);

// ============================================================================
// Symbols
// ============================================================================

/// Declared accessibility of a type, constructor, or method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    #[default]
    Private,
    /// `private protected`
    ProtectedAndInternal,
    Protected,
    Internal,
    /// `protected internal`
    ProtectedOrInternal,
    Public,
}

/// The scope that directly contains a type or namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Container {
    /// The global namespace; never part of a qualified name.
    #[default]
    Global,
    Namespace(NamespaceId),
    Type(TypeId),
}

/// A declared namespace segment (`B` in `namespace A.B`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSymbol {
    pub name: String,
    /// Enclosing namespace; `None` when the parent is the global namespace.
    #[serde(default)]
    pub parent: Option<NamespaceId>,
}

/// Kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Record,
    Interface,
    Enum,
}

/// A declared instance constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorSymbol {
    pub accessibility: Accessibility,
    pub parameter_count: usize,
}

/// A declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSymbol {
    /// Simple source name (`List`).
    pub name: String,
    /// Metadata name when it differs from `name` (`List`1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_name: Option<String>,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub container: Container,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_generic: bool,
    #[serde(default)]
    pub is_partial: bool,
    /// Instance constructors, including the implicit default constructor.
    #[serde(default)]
    pub constructors: Vec<ConstructorSymbol>,
    /// All implemented interfaces, transitively.
    #[serde(default)]
    pub interfaces: Vec<TypeId>,
}

impl TypeSymbol {
    /// The metadata-stable name used by the qualifier.
    pub fn metadata_name(&self) -> &str {
        self.metadata_name.as_deref().unwrap_or(&self.name)
    }
}

/// Semantic classification of a method's return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnShape {
    /// Returns no value.
    #[default]
    Void,
    /// Returns an awaitable without payload (`Task`).
    Awaitable,
    /// Returns a value (including `Task<T>`).
    Value,
}

/// Return type as written in the declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum ReturnTypeSyntax {
    /// A keyword type such as `void` or `int`.
    Predefined(String),
    /// A simple identifier such as `Task`.
    Identifier(String),
    /// A dotted name such as `System.Threading.Tasks.Task`.
    Qualified(String),
    /// Anything else (`Task<int>`, arrays, tuples, ...).
    Other(String),
}

impl Default for ReturnTypeSyntax {
    fn default() -> Self {
        ReturnTypeSyntax::Predefined(zerounit_core::vocab::VOID_KEYWORD.to_string())
    }
}

/// Declaration syntax of a method, as seen by the structural gate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MethodSyntax {
    /// Modifier keywords in source order (`protected`, `internal`, `static`, `partial`, ...).
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub return_type: ReturnTypeSyntax,
    /// Kind of the declaration the method is written in.
    #[serde(default)]
    pub parent_kind: TypeKind,
    /// Modifiers of that enclosing declaration.
    #[serde(default)]
    pub parent_modifiers: Vec<String>,
    #[serde(default = "default_has_body")]
    pub has_body: bool,
}

fn default_has_body() -> bool {
    true
}

/// A declared method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSymbol {
    pub name: String,
    pub owner: TypeId,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_generic: bool,
    /// Declared with the `async` modifier.
    ///
    /// Informational snapshot data. Whether a test is awaited follows from [`MethodSymbol::returns`] alone, so an
    /// `async void` method is invoked fire-and-forget and a plain `Task` method is awaited.
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub parameter_count: usize,
    #[serde(default)]
    pub returns: ReturnShape,
    #[serde(default)]
    pub syntax: MethodSyntax,
}

// ============================================================================
// Provider interface
// ============================================================================

/// Read access to the analysed host program.
///
/// Identifiers handed out by an implementation must resolve in that same implementation; lookups with foreign
/// identifiers may panic.
pub trait SemanticModel {
    fn namespace(&self, id: NamespaceId) -> &NamespaceSymbol;

    fn type_symbol(&self, id: TypeId) -> &TypeSymbol;

    fn method(&self, id: MethodId) -> &MethodSymbol;

    /// All method declarations in stable declaration order.
    fn method_ids(&self) -> Vec<MethodId>;

    /// The designated startup routine, if the host declares one.
    fn entry_point(&self) -> Option<MethodId>;

    /// Methods of `owner` named `name`, in declaration order.
    fn members_named(&self, owner: TypeId, name: &str) -> Vec<MethodId> {
        self.method_ids()
            .into_iter()
            .filter(|id| {
                let method = self.method(*id);
                method.owner == owner && method.name == name
            })
            .collect()
    }
}

/// An owned, serialisable snapshot of a host program.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Compilation {
    #[serde(default)]
    pub namespaces: Vec<NamespaceSymbol>,
    #[serde(default)]
    pub types: Vec<TypeSymbol>,
    /// Methods in declaration order.
    #[serde(default)]
    pub methods: Vec<MethodSymbol>,
    #[serde(default)]
    pub entry_point: Option<MethodId>,
}

impl SemanticModel for Compilation {
    fn namespace(&self, id: NamespaceId) -> &NamespaceSymbol {
        &self.namespaces[id.0]
    }

    fn type_symbol(&self, id: TypeId) -> &TypeSymbol {
        &self.types[id.0]
    }

    fn method(&self, id: MethodId) -> &MethodSymbol {
        &self.methods[id.0]
    }

    fn method_ids(&self) -> Vec<MethodId> {
        (0..self.methods.len()).map(MethodId).collect()
    }

    fn entry_point(&self) -> Option<MethodId> {
        self.entry_point
    }
}
