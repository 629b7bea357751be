//! Test discovery
//!
//! Walks every declared method of a [`SemanticModel`], keeps the ones that pass both eligibility gates and
//! assigns each survivor a dispatch index. Indices follow declaration order and are contiguous over `[0, N)`.
//!
//! ## Modules
//!
//! - `names` - Fully qualified names and test labels
//! - `predicates` - Structural and semantic eligibility gates
//! - `entry_point` - Decides whether the harness is a new program, a reopened partial type, or nothing

pub mod entry_point;
pub mod names;
pub mod predicates;

use tracing::debug;

use crate::model::{MethodId, ReturnShape, SemanticModel, TypeId};

pub use entry_point::{HostAccessibility, HostProgram, PartialHost, RunTestsSignature, resolve_host};
pub use names::{QualifiedName, qualify_method, qualify_namespace, qualify_type};
pub use predicates::Exclusion;

/// How the harness reaches the test method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Invocation {
    /// Called on the declaring type.
    Static,
    /// Called on a fresh fixture built with the parameterless constructor.
    Instance,
}

/// Whether the harness awaits the test body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completion {
    /// Returns `void`; done when the call returns.
    FireAndForget,
    /// Returns `Task`; done when the task completes.
    Awaitable,
}

/// What happens to a fixture once its test finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureLifetime {
    /// Dropped with the unit.
    Owned,
    /// Disposed exactly once, on every exit path.
    Disposable,
}

/// A method that will run as a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMethod {
    /// Dispatch index, contiguous over `[0, N)`.
    pub index: usize,
    pub method: MethodId,
    pub owner: TypeId,
    /// Method name as declared.
    pub name: String,
    /// Qualified name of the declaring type, used as the construction/invocation target.
    pub owner_name: QualifiedName,
    /// `{owner_name}.{name}`, used in progress and failure reports.
    pub label: QualifiedName,
    pub invocation: Invocation,
    pub completion: Completion,
    /// Disposal behaviour of the declaring type. Only instance invocations build a fixture.
    pub fixture: FixtureLifetime,
}

impl CandidateMethod {
    pub fn is_static(&self) -> bool {
        self.invocation == Invocation::Static
    }

    pub fn is_awaitable(&self) -> bool {
        self.completion == Completion::Awaitable
    }

    /// Whether the harness constructs a disposable fixture for this test.
    pub fn disposes_fixture(&self) -> bool {
        self.invocation == Invocation::Instance && self.fixture == FixtureLifetime::Disposable
    }
}

/// Discover every test method of `model`, in declaration order.
pub fn discover<M: SemanticModel + ?Sized>(model: &M) -> Vec<CandidateMethod> {
    let mut candidates = Vec::new();

    for id in model.method_ids() {
        if let Err(reason) = predicates::is_test_method(model, id) {
            debug!(method = %qualify_method(model, id), %reason, "excluded");
            continue;
        }
        candidates.push(candidate(model, id, candidates.len()));
    }

    debug!(count = candidates.len(), "discovered test methods");
    candidates
}

fn candidate<M: SemanticModel + ?Sized>(model: &M, id: MethodId, index: usize) -> CandidateMethod {
    let method = model.method(id);
    let owner_name = qualify_type(model, method.owner);
    let label = qualify_method(model, id);

    CandidateMethod {
        index,
        method: id,
        owner: method.owner,
        name: method.name.clone(),
        owner_name,
        label,
        invocation: if method.is_static {
            Invocation::Static
        } else {
            Invocation::Instance
        },
        completion: match method.returns {
            ReturnShape::Void => Completion::FireAndForget,
            ReturnShape::Awaitable | ReturnShape::Value => Completion::Awaitable,
        },
        fixture: if predicates::implements_disposal(model, method.owner) {
            FixtureLifetime::Disposable
        } else {
            FixtureLifetime::Owned
        },
    }
}
