//! Programmatic construction of compilations
//!
//! Builders record modifiers in the order they are applied, the way they would be written in source, so the
//! structural gate and the partial-declaration merge see realistic declaration syntax.

use zerounit_core::vocab;

use super::{
    Accessibility, Compilation, ConstructorSymbol, Container, MethodId, MethodSymbol, MethodSyntax, NamespaceId,
    NamespaceSymbol, ReturnShape, ReturnTypeSyntax, TypeId, TypeKind, TypeSymbol,
};

/// Incrementally builds a [`Compilation`] whose identifiers are always valid.
#[derive(Debug, Default)]
pub struct CompilationBuilder {
    compilation: Compilation,
    /// Declaration modifiers per type, indexed by `TypeId`.
    type_modifiers: Vec<Vec<String>>,
}

impl CompilationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or reuse) the namespace chain for a dotted name and return it as a container.
    ///
    /// An empty name is the global namespace.
    pub fn namespace(&mut self, dotted: &str) -> Container {
        let mut parent: Option<NamespaceId> = None;
        for segment in dotted.split('.').filter(|s| !s.is_empty()) {
            let existing = self
                .compilation
                .namespaces
                .iter()
                .position(|ns| ns.name == segment && ns.parent == parent)
                .map(NamespaceId);
            let id = existing.unwrap_or_else(|| {
                self.compilation.namespaces.push(NamespaceSymbol {
                    name: segment.to_string(),
                    parent,
                });
                NamespaceId(self.compilation.namespaces.len() - 1)
            });
            parent = Some(id);
        }
        parent.map_or(Container::Global, Container::Namespace)
    }

    /// Start a class declaration with an implicit public parameterless constructor.
    pub fn class(&mut self, name: &str, container: Container) -> TypeBuilder<'_> {
        TypeBuilder::new(self, name, TypeKind::Class, container)
    }

    /// Start an interface declaration.
    pub fn interface(&mut self, name: &str, container: Container) -> TypeBuilder<'_> {
        let mut builder = TypeBuilder::new(self, name, TypeKind::Interface, container);
        builder.symbol.is_abstract = true;
        builder.symbol.constructors.clear();
        builder
    }

    /// Declare `System.IDisposable` and return its id.
    pub fn disposable_interface(&mut self) -> TypeId {
        let (namespace, name) = vocab::DISPOSABLE_INTERFACE
            .rsplit_once('.')
            .unwrap_or(("", vocab::DISPOSABLE_INTERFACE));
        let system = self.namespace(namespace);
        if let Some(existing) = self
            .compilation
            .types
            .iter()
            .position(|ty| ty.name == name && ty.container == system)
        {
            return TypeId(existing);
        }
        self.interface(name, system).public().build()
    }

    /// Start a method declaration on `owner`.
    pub fn method(&mut self, owner: TypeId, name: &str) -> MethodBuilder<'_> {
        MethodBuilder::new(self, owner, name)
    }

    /// Mark `method` as the program's startup routine.
    pub fn entry_point(&mut self, method: MethodId) -> &mut Self {
        self.compilation.entry_point = Some(method);
        self
    }

    pub fn finish(self) -> Compilation {
        self.compilation
    }
}

// ============================================================================
// Types
// ============================================================================

/// Builder for a single type declaration.
pub struct TypeBuilder<'a> {
    builder: &'a mut CompilationBuilder,
    symbol: TypeSymbol,
    modifiers: Vec<String>,
}

impl<'a> TypeBuilder<'a> {
    fn new(builder: &'a mut CompilationBuilder, name: &str, kind: TypeKind, container: Container) -> Self {
        // Top-level types default to internal, nested ones to private.
        let accessibility = match container {
            Container::Type(_) => Accessibility::Private,
            Container::Global | Container::Namespace(_) => Accessibility::Internal,
        };
        Self {
            builder,
            symbol: TypeSymbol {
                name: name.to_string(),
                metadata_name: None,
                kind,
                container,
                accessibility,
                is_abstract: false,
                is_static: false,
                is_generic: false,
                is_partial: false,
                constructors: vec![ConstructorSymbol {
                    accessibility: Accessibility::Public,
                    parameter_count: 0,
                }],
                interfaces: Vec::new(),
            },
            modifiers: Vec::new(),
        }
    }

    fn modifier(mut self, keyword: &str) -> Self {
        self.modifiers.push(keyword.to_string());
        self
    }

    pub fn public(mut self) -> Self {
        self.symbol.accessibility = Accessibility::Public;
        self.modifier(vocab::PUBLIC_KEYWORD)
    }

    pub fn internal(mut self) -> Self {
        self.symbol.accessibility = Accessibility::Internal;
        self.modifier("internal")
    }

    pub fn private(mut self) -> Self {
        self.symbol.accessibility = Accessibility::Private;
        self.modifier(vocab::PRIVATE_KEYWORD)
    }

    pub fn abstract_(mut self) -> Self {
        self.symbol.is_abstract = true;
        self.modifier("abstract")
    }

    /// Static types have no instance constructors.
    pub fn static_(mut self) -> Self {
        self.symbol.is_static = true;
        self.symbol.constructors.clear();
        self.modifier(vocab::STATIC_KEYWORD)
    }

    pub fn partial(mut self) -> Self {
        self.symbol.is_partial = true;
        self.modifier("partial")
    }

    pub fn generic(mut self, arity: usize) -> Self {
        self.symbol.is_generic = true;
        self.symbol.metadata_name = Some(format!("{}`{}", self.symbol.name, arity));
        self
    }

    pub fn struct_(mut self) -> Self {
        self.symbol.kind = TypeKind::Struct;
        self
    }

    /// Replace the constructor set.
    pub fn constructors(mut self, constructors: &[(Accessibility, usize)]) -> Self {
        self.symbol.constructors = constructors
            .iter()
            .map(|&(accessibility, parameter_count)| ConstructorSymbol {
                accessibility,
                parameter_count,
            })
            .collect();
        self
    }

    pub fn implements(mut self, interface: TypeId) -> Self {
        self.symbol.interfaces.push(interface);
        self
    }

    pub fn build(self) -> TypeId {
        self.builder.compilation.types.push(self.symbol);
        self.builder.type_modifiers.push(self.modifiers);
        TypeId(self.builder.compilation.types.len() - 1)
    }
}

// ============================================================================
// Methods
// ============================================================================

/// Builder for a single method declaration. Defaults to a private `void` instance method without parameters.
pub struct MethodBuilder<'a> {
    builder: &'a mut CompilationBuilder,
    symbol: MethodSymbol,
}

impl<'a> MethodBuilder<'a> {
    fn new(builder: &'a mut CompilationBuilder, owner: TypeId, name: &str) -> Self {
        let owner_symbol = &builder.compilation.types[owner.0];
        let syntax = MethodSyntax {
            modifiers: Vec::new(),
            return_type: ReturnTypeSyntax::default(),
            parent_kind: owner_symbol.kind,
            parent_modifiers: builder.type_modifiers[owner.0].clone(),
            has_body: true,
        };
        Self {
            builder,
            symbol: MethodSymbol {
                name: name.to_string(),
                owner,
                accessibility: Accessibility::Private,
                is_static: false,
                is_generic: false,
                is_async: false,
                parameter_count: 0,
                returns: ReturnShape::Void,
                syntax,
            },
        }
    }

    fn modifier(mut self, keyword: &str) -> Self {
        self.symbol.syntax.modifiers.push(keyword.to_string());
        self
    }

    pub fn public(mut self) -> Self {
        self.symbol.accessibility = Accessibility::Public;
        self.modifier(vocab::PUBLIC_KEYWORD)
    }

    pub fn internal(mut self) -> Self {
        self.symbol.accessibility = Accessibility::Internal;
        self.modifier("internal")
    }

    pub fn private(mut self) -> Self {
        self.symbol.accessibility = Accessibility::Private;
        self.modifier(vocab::PRIVATE_KEYWORD)
    }

    pub fn protected(mut self) -> Self {
        self.symbol.accessibility = Accessibility::Protected;
        self.modifier("protected")
    }

    /// `protected internal`
    pub fn protected_internal(mut self) -> Self {
        self.symbol.accessibility = Accessibility::ProtectedOrInternal;
        self.modifier("protected").modifier("internal")
    }

    pub fn static_(mut self) -> Self {
        self.symbol.is_static = true;
        self.modifier(vocab::STATIC_KEYWORD)
    }

    pub fn async_(mut self) -> Self {
        self.symbol.is_async = true;
        self.modifier(vocab::ASYNC_KEYWORD)
    }

    /// A bodyless `partial` declaration.
    pub fn partial_declaration(mut self) -> Self {
        self.symbol.syntax.has_body = false;
        self.modifier("partial")
    }

    pub fn generic(mut self) -> Self {
        self.symbol.is_generic = true;
        self
    }

    pub fn parameters(mut self, count: usize) -> Self {
        self.symbol.parameter_count = count;
        self
    }

    /// Return `Task`.
    pub fn returns_task(mut self) -> Self {
        self.symbol.returns = ReturnShape::Awaitable;
        self.symbol.syntax.return_type = ReturnTypeSyntax::Identifier(vocab::TASK_TYPE.to_string());
        self
    }

    /// Return `System.Threading.Tasks.Task`.
    pub fn returns_qualified_task(mut self) -> Self {
        self.symbol.returns = ReturnShape::Awaitable;
        self.symbol.syntax.return_type = ReturnTypeSyntax::Qualified(vocab::QUALIFIED_TASK_TYPE.to_string());
        self
    }

    /// Return a value, spelled `type_text` (`int`, `Task<int>`, ...).
    pub fn returns_value(mut self, type_text: &str) -> Self {
        self.symbol.returns = ReturnShape::Value;
        let is_keyword = type_text.chars().all(|c| c.is_ascii_lowercase());
        self.symbol.syntax.return_type = if is_keyword {
            ReturnTypeSyntax::Predefined(type_text.to_string())
        } else {
            ReturnTypeSyntax::Other(type_text.to_string())
        };
        self
    }

    pub fn build(self) -> MethodId {
        self.builder.compilation.methods.push(self.symbol);
        MethodId(self.builder.compilation.methods.len() - 1)
    }
}
