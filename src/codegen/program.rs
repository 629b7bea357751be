//! Harness Assembler
//!
//! Wraps the run-all and dispatch routines in a complete source unit:
//!
//! ```text
//! using ...;
//!
//! namespace Host.Namespace          // reopened hosts outside the global namespace
//! {
//!     public static partial class Program
//!     {
//!         ...run-all routine...
//!
//!         ...dispatch routine...
//!     }
//! }
//! ```
//!
//! A synthesized program is `internal static class Program` with a `Main` that returns the run-all task.

use tracing::debug;
use zerounit_core::vocab;

use super::config::GeneratorConfig;
use super::run_tests::{emit_harness, emit_stub};
use super::writer::CodeWriter;
use crate::discovery::{CandidateMethod, HostProgram, PartialHost, RunTestsSignature};

const USING_DIRECTIVES: [&str; 4] = [
    "using System;",
    "using System.Collections.Concurrent;",
    "using System.Threading;",
    "using System.Threading.Tasks;",
];

/// Assemble the generated source unit. A [`HostProgram::NotPartial`] host produces the empty string.
pub fn generate_program(host: &HostProgram, candidates: &[CandidateMethod], config: &GeneratorConfig) -> String {
    let partial = match host {
        HostProgram::NotPartial => {
            debug!("host cannot be reopened; emitting nothing");
            return String::new();
        }
        HostProgram::Synthesized => None,
        HostProgram::Reopened(partial) => Some(partial),
    };

    let mut writer = CodeWriter::new(config);
    for directive in USING_DIRECTIVES {
        writer.writeln(directive);
    }
    writer.newline();

    let namespace = partial.and_then(|host| host.namespace.as_ref());
    if let Some(namespace) = namespace {
        writer.writeln(&format!("namespace {namespace}"));
        writer.open_brace();
    }

    emit_class(&mut writer, partial, candidates);

    if namespace.is_some() {
        writer.close_brace("");
    }

    writer.finish()
}

fn emit_class(writer: &mut CodeWriter, partial: Option<&PartialHost>, candidates: &[CandidateMethod]) {
    match partial {
        Some(host) => writer.writeln(&class_header(host)),
        None => writer.writeln(&format!("internal static class {}", vocab::DEFAULT_PROGRAM_CLASS)),
    }
    writer.open_brace();

    if partial.is_none() {
        emit_main(writer);
    }

    let default_signature = RunTestsSignature::Default;
    let signature = partial.map_or(&default_signature, |host| &host.run_tests);
    if candidates.is_empty() {
        emit_stub(writer, signature);
    } else {
        emit_harness(writer, signature, candidates);
    }

    writer.close_brace("");
}

/// `{public|internal} [static ]partial class {Name}`
fn class_header(host: &PartialHost) -> String {
    let mut header = format!("{} ", host.accessibility.keyword());
    if host.is_static {
        header.push_str("static ");
    }
    header.push_str("partial class ");
    header.push_str(&host.name);
    header
}

fn emit_main(writer: &mut CodeWriter) {
    writer.writeln(&format!("public static Task<int> {}()", vocab::ENTRY_POINT_METHOD));
    writer.open_brace();
    writer.writeln(&format!("return {}();", vocab::RUN_TESTS_METHOD));
    writer.close_brace("");
    writer.newline();
}
