//! Per-Test Call Emitter
//!
//! Emits the statements that run one candidate inside its dispatch case:
//!
//! ```text
//! var fixture3 = new A.B.MathTests();           // instance tests only
//! await fixture3.AddAsync().ConfigureAwait(false);
//! ```
//!
//! A disposable fixture is bound with `using (...)` and the call moves into a braced block, so disposal runs on
//! every exit path. Calls on a disposable owner are braced even when static and nothing is bound.

use zerounit_core::vocab::fixture_binding;

use super::writer::CodeWriter;
use crate::discovery::{CandidateMethod, Completion, FixtureLifetime, Invocation};

/// Emit the call fragment for `candidate` at the writer's current indentation.
pub fn emit_test_call(writer: &mut CodeWriter, candidate: &CandidateMethod) {
    let fixture = fixture_binding(candidate.index);
    let scoped = candidate.fixture == FixtureLifetime::Disposable;

    let target = match candidate.invocation {
        Invocation::Static => candidate.owner_name.to_string(),
        Invocation::Instance => {
            let binding = format!("var {fixture} = new {}()", candidate.owner_name);
            if scoped {
                writer.writeln(&format!("using ({binding})"));
            } else {
                writer.writeln(&format!("{binding};"));
            }
            fixture
        }
    };
    if scoped {
        writer.open_brace();
    }

    let call = format!("{target}.{}()", candidate.name);
    match candidate.completion {
        Completion::FireAndForget => writer.writeln(&format!("{call};")),
        Completion::Awaitable => writer.writeln(&format!("await {call}.ConfigureAwait(false);")),
    }

    if scoped {
        writer.close_brace("");
    }
}
