//! Entry-Point Resolver
//!
//! Chooses the shape of the generated program:
//!
//! | Host declares                      | Result                          |
//! |------------------------------------|---------------------------------|
//! | no startup routine                 | [`HostProgram::Synthesized`]    |
//! | startup routine in a partial type  | [`HostProgram::Reopened`]       |
//! | startup routine elsewhere          | [`HostProgram::NotPartial`]     |
//!
//! A reopened host may also forward-declare the run-all routine as a bodyless `RunTestsAsync()`; its modifiers
//! are carried into the generated definition.

use tracing::debug;
use zerounit_core::vocab;

use crate::model::{Accessibility, Container, SemanticModel, TypeId};

use super::names::{QualifiedName, qualify_namespace};

/// Result of resolving the host program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostProgram {
    /// No startup routine: the generator owns `Program` and its `Main`.
    Synthesized,
    /// The startup routine lives in a partial type that the generator reopens.
    Reopened(PartialHost),
    /// The startup routine lives in a type that cannot be extended. Generation produces nothing.
    NotPartial,
}

/// The partial type hosting the startup routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialHost {
    /// Simple name of the type.
    pub name: String,
    pub accessibility: HostAccessibility,
    pub is_static: bool,
    /// Namespace of the startup routine; `None` for the global namespace.
    pub namespace: Option<QualifiedName>,
    pub run_tests: RunTestsSignature,
}

/// Accessibility written on the reopened declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAccessibility {
    Public,
    /// Everything that is not `public`.
    Internal,
}

impl HostAccessibility {
    pub fn keyword(self) -> &'static str {
        match self {
            HostAccessibility::Public => vocab::PUBLIC_KEYWORD,
            HostAccessibility::Internal => "internal",
        }
    }
}

/// Signature of the generated run-all routine. The generator always owns the body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunTestsSignature {
    /// `private static [async] Task<int> RunTestsAsync()`
    #[default]
    Default,
    /// Modifiers of a bodyless forward declaration, in source order.
    Declared { modifiers: Vec<String> },
}

impl RunTestsSignature {
    /// Declaration line of the run-all routine. `is_async` selects the full harness over the stub.
    pub fn header(&self, is_async: bool) -> String {
        let modifiers: Vec<&str> = match self {
            RunTestsSignature::Default => vec![vocab::PRIVATE_KEYWORD, vocab::STATIC_KEYWORD],
            RunTestsSignature::Declared { modifiers } => modifiers
                .iter()
                .map(String::as_str)
                .filter(|m| *m != vocab::ASYNC_KEYWORD)
                .collect(),
        };

        let mut header = modifiers.join(" ");
        if is_async {
            if !header.is_empty() {
                header.push(' ');
            }
            header.push_str(vocab::ASYNC_KEYWORD);
        }
        if !header.is_empty() {
            header.push(' ');
        }
        header.push_str("Task<int> ");
        header.push_str(vocab::RUN_TESTS_METHOD);
        header.push_str("()");
        header
    }
}

/// Resolve the host program of `model`.
pub fn resolve_host<M: SemanticModel + ?Sized>(model: &M) -> HostProgram {
    let Some(entry) = model.entry_point() else {
        debug!("no startup routine; synthesizing program");
        return HostProgram::Synthesized;
    };

    let owner_id = model.method(entry).owner;
    let owner = model.type_symbol(owner_id);
    if !owner.is_partial {
        debug!(owner = %owner.name, "startup routine owner is not partial; nothing to generate");
        return HostProgram::NotPartial;
    }

    let host = PartialHost {
        name: owner.name.clone(),
        accessibility: match owner.accessibility {
            Accessibility::Public => HostAccessibility::Public,
            _ => HostAccessibility::Internal,
        },
        is_static: owner.is_static,
        namespace: containing_namespace(model, owner_id),
        run_tests: run_tests_signature(model, owner_id),
    };
    debug!(owner = %host.name, run_tests = ?host.run_tests, "reopening partial host");
    HostProgram::Reopened(host)
}

/// Nearest enclosing namespace of a type, skipping outer types.
fn containing_namespace<M: SemanticModel + ?Sized>(model: &M, id: TypeId) -> Option<QualifiedName> {
    let mut current = model.type_symbol(id).container;
    loop {
        match current {
            Container::Global => return None,
            Container::Namespace(ns) => return Some(qualify_namespace(model, ns)),
            Container::Type(outer) => current = model.type_symbol(outer).container,
        }
    }
}

fn run_tests_signature<M: SemanticModel + ?Sized>(model: &M, owner: TypeId) -> RunTestsSignature {
    model
        .members_named(owner, vocab::RUN_TESTS_METHOD)
        .into_iter()
        .map(|id| model.method(id))
        .find(|method| method.parameter_count == 0 && !method.syntax.has_body)
        .map_or(RunTestsSignature::Default, |method| RunTestsSignature::Declared {
            modifiers: method.syntax.modifiers.clone(),
        })
}
