//! Eligibility Predicate
//!
//! Two gates decide whether a declared method is a test:
//!
//! 1. The **structural gate** looks at declaration syntax only: no parameters, a `void`/`Task` return type, the
//!    `public` modifier on both the method and the class declaration it is written in. It is cheap and runs on
//!    every method.
//! 2. The **semantic gate** is authoritative: the method is not generic, is not `Dispose`, and is either static or
//!    declared on a type that can be instantiated (not abstract, not generic, public parameterless constructor).

use std::fmt;

use zerounit_core::vocab;

use crate::model::{Accessibility, MethodId, MethodSymbol, ReturnTypeSyntax, SemanticModel, TypeId, TypeKind};

use super::names::qualify_type;

/// Why a method is not a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Return type is neither `void` nor a payload-free `Task`.
    ReturnType,
    HasParameters,
    /// Declared outside a class declaration.
    NotInClass,
    MethodNotPublic,
    OwnerNotPublic,
    GenericMethod,
    DisposeMethod,
    /// Instance method on an abstract or generic type, or one without a public parameterless constructor.
    OwnerNotInstantiable,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Exclusion::ReturnType => "returns a value",
            Exclusion::HasParameters => "has parameters",
            Exclusion::NotInClass => "not declared in a class",
            Exclusion::MethodNotPublic => "method is not public",
            Exclusion::OwnerNotPublic => "declaring class is not public",
            Exclusion::GenericMethod => "method is generic",
            Exclusion::DisposeMethod => "is the disposal method",
            Exclusion::OwnerNotInstantiable => "declaring type cannot be instantiated",
        };
        f.write_str(reason)
    }
}

// ============================================================================
// Structural gate
// ============================================================================

/// Cheap syntax-only filter.
pub fn structural_gate(method: &MethodSymbol) -> Result<(), Exclusion> {
    let syntax = &method.syntax;
    if !is_void_or_task(&syntax.return_type) {
        return Err(Exclusion::ReturnType);
    }
    if method.parameter_count != 0 {
        return Err(Exclusion::HasParameters);
    }
    if syntax.parent_kind != TypeKind::Class {
        return Err(Exclusion::NotInClass);
    }
    if !has_modifier(&syntax.modifiers, vocab::PUBLIC_KEYWORD) {
        return Err(Exclusion::MethodNotPublic);
    }
    if !has_modifier(&syntax.parent_modifiers, vocab::PUBLIC_KEYWORD) {
        return Err(Exclusion::OwnerNotPublic);
    }
    Ok(())
}

fn is_void_or_task(return_type: &ReturnTypeSyntax) -> bool {
    match return_type {
        ReturnTypeSyntax::Predefined(keyword) => keyword == vocab::VOID_KEYWORD,
        ReturnTypeSyntax::Identifier(name) => name == vocab::TASK_TYPE,
        ReturnTypeSyntax::Qualified(name) => name == vocab::QUALIFIED_TASK_TYPE,
        ReturnTypeSyntax::Other(_) => false,
    }
}

fn has_modifier(modifiers: &[String], keyword: &str) -> bool {
    modifiers.iter().any(|m| m == keyword)
}

// ============================================================================
// Semantic gate
// ============================================================================

/// Authoritative filter over resolved symbols.
pub fn semantic_gate<M: SemanticModel + ?Sized>(model: &M, id: MethodId) -> Result<(), Exclusion> {
    let method = model.method(id);
    if !method.is_static && !can_instantiate(model, method.owner) {
        return Err(Exclusion::OwnerNotInstantiable);
    }
    if method.is_generic {
        return Err(Exclusion::GenericMethod);
    }
    if method.name == vocab::DISPOSE_METHOD {
        return Err(Exclusion::DisposeMethod);
    }
    Ok(())
}

/// Whether the harness can construct a fixture of this type with `new T()`.
pub fn can_instantiate<M: SemanticModel + ?Sized>(model: &M, id: TypeId) -> bool {
    let ty = model.type_symbol(id);
    !ty.is_abstract
        && !ty.is_generic
        && ty
            .constructors
            .iter()
            .any(|ctor| ctor.parameter_count == 0 && ctor.accessibility == Accessibility::Public)
}

/// Whether the type implements the disposal capability.
pub fn implements_disposal<M: SemanticModel + ?Sized>(model: &M, id: TypeId) -> bool {
    model
        .type_symbol(id)
        .interfaces
        .iter()
        .any(|interface| qualify_type(model, *interface).as_str() == vocab::DISPOSABLE_INTERFACE)
}

/// Both gates, in order.
pub fn is_test_method<M: SemanticModel + ?Sized>(model: &M, id: MethodId) -> Result<(), Exclusion> {
    structural_gate(model.method(id))?;
    semantic_gate(model, id)
}
