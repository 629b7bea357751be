//! Run-all and dispatch routines
//!
//! The full harness has two parts:
//!
//! - `RunTestsAsync()`: runs every index through `Parallel.ForEachAsync` (bounded by the processor count),
//!   streams `v`/`x` progress lines from a single consumer task, prints failure details and the summary once
//!   everything has finished, and returns the failure count.
//! - `RunTestAsync(int index)`: a `switch` mapping each index to its call fragment.
//!
//! With no candidates only a stub `RunTestsAsync()` is emitted.

use zerounit_core::{EMPTY_SUMMARY, failure_line, success_line, summary_line, vocab};

use super::test_call::emit_test_call;
use super::writer::CodeWriter;
use crate::discovery::{CandidateMethod, RunTestsSignature};

/// Emit the run-all routine followed by the dispatch routine.
pub fn emit_harness(writer: &mut CodeWriter, signature: &RunTestsSignature, candidates: &[CandidateMethod]) {
    emit_run_tests(writer, signature, candidates);
    writer.newline();
    emit_dispatch(writer, candidates);
}

/// Emit the synchronous run-all routine of a harness without tests.
pub fn emit_stub(writer: &mut CodeWriter, signature: &RunTestsSignature) {
    writer.writeln(&signature.header(false));
    writer.writeln("{");
    writer.writeln_unindented("#pragma warning disable CA1303");
    writer.indent();
    writer.writeln(&format!("Console.WriteLine(\"{EMPTY_SUMMARY}\");"));
    writer.writeln("return Task.FromResult(0);");
    writer.dedent();
    writer.writeln_unindented("#pragma warning restore CA1303");
    writer.writeln("}");
}

// ============================================================================
// Run-all routine
// ============================================================================

fn emit_run_tests(writer: &mut CodeWriter, signature: &RunTestsSignature, candidates: &[CandidateMethod]) {
    writer.writeln(&signature.header(true));
    writer.open_brace();

    writer.writeln("var passedCount = 0;");
    writer.newline();

    writer.writeln("var testNames = new[]");
    writer.open_brace();
    for candidate in candidates {
        writer.writeln(&format!("\"{}\",", candidate.label));
    }
    writer.close_brace(";");
    writer.newline();

    emit_progress_consumer(writer);
    writer.newline();

    emit_parallel_loop(writer, candidates.len());
    writer.newline();

    writer.writeln("finishedTests.CompleteAdding();");
    writer.writeln("await printProgressTask.ConfigureAwait(false);");
    writer.writeln("Console.WriteLine();");
    writer.newline();

    emit_failure_details(writer);
    writer.newline();

    let summary = summary_line("{failedTests.Count}", "{passedCount}", "{failedTests.Count + passedCount}");
    writer.writeln(&format!("Console.WriteLine($\"{summary}\");"));
    writer.writeln("Console.ResetColor();");
    writer.newline();
    writer.writeln("return failedTests.Count;");
    writer.close_brace("");
}

/// Bounded progress collection, failure queue, and the task that prints progress lines as they arrive.
fn emit_progress_consumer(writer: &mut CodeWriter) {
    writer.writeln(
        "using var finishedTests = new BlockingCollection<(string Name, string FailMessage)>(Environment.ProcessorCount);",
    );
    writer.writeln("var failedTests = new ConcurrentQueue<(string Name, Exception Exception)>();");
    writer.writeln("var printProgressTask = Task.Run(() =>");
    writer.open_brace();
    writer.writeln("foreach (var (name, failMessage) in finishedTests.GetConsumingEnumerable())");
    writer.open_brace();

    writer.writeln("if (failMessage != null)");
    writer.open_brace();
    emit_colored_line(writer, "Red", &failure_line("{name}", "{failMessage}"));
    writer.close_brace("");
    writer.writeln("else");
    writer.open_brace();
    emit_colored_line(writer, "Green", &success_line("{name}"));
    writer.close_brace("");

    writer.close_brace("");
    writer.close_brace(");");
}

fn emit_colored_line(writer: &mut CodeWriter, color: &str, line: &str) {
    writer.writeln(&format!("Console.ForegroundColor = ConsoleColor.{color};"));
    writer.writeln(&format!("Console.WriteLine($\"{line}\");"));
    writer.writeln("Console.ResetColor();");
}

fn emit_parallel_loop(writer: &mut CodeWriter, count: usize) {
    writer.writeln_unindented("#pragma warning disable CA1031");
    writer.writeln("await Parallel");
    writer.indent();
    writer.writeln(&format!(
        ".ForEachAsync(Enumerable.Range(0, {count}), async (i, cancellationToken) =>"
    ));
    writer.open_brace();

    writer.writeln("try");
    writer.open_brace();
    writer.writeln(&format!("await {}(i).ConfigureAwait(false);", vocab::RUN_SINGLE_TEST_METHOD));
    writer.writeln("Interlocked.Increment(ref passedCount);");
    writer.writeln("finishedTests.Add((testNames[i], null), cancellationToken);");
    writer.close_brace("");
    writer.writeln("catch (Exception ex)");
    writer.open_brace();
    writer.writeln("finishedTests.Add((testNames[i], ex.Message), cancellationToken);");
    writer.writeln("failedTests.Enqueue((testNames[i], ex));");
    writer.close_brace("");

    writer.close_brace(")");
    writer.writeln(".ConfigureAwait(false);");
    writer.dedent();
    writer.writeln_unindented("#pragma warning restore CA1031");
}

fn emit_failure_details(writer: &mut CodeWriter) {
    writer.writeln("if (!failedTests.IsEmpty)");
    writer.open_brace();
    writer.writeln("Console.ForegroundColor = ConsoleColor.Red;");
    writer.writeln("foreach (var (name, exception) in failedTests)");
    writer.open_brace();
    writer.writeln("Console.WriteLine($\"Failed test: {name}\");");
    writer.writeln("Console.WriteLine();");
    writer.writeln("Console.WriteLine(exception.Message);");
    writer.writeln("Console.WriteLine();");
    writer.writeln("Console.WriteLine($\"Exception type: {exception.GetType()}\");");
    writer.writeln("Console.WriteLine($\"Stack trace: {exception.StackTrace}\");");
    writer.writeln("Console.WriteLine();");
    writer.close_brace("");
    writer.close_brace("");
    writer.writeln("else");
    writer.open_brace();
    writer.writeln("Console.ForegroundColor = ConsoleColor.Green;");
    writer.close_brace("");
}

// ============================================================================
// Dispatch routine
// ============================================================================

fn emit_dispatch(writer: &mut CodeWriter, candidates: &[CandidateMethod]) {
    writer.writeln_unindented("#pragma warning disable CS1998");
    writer.writeln(&format!(
        "private static async Task {}(int index)",
        vocab::RUN_SINGLE_TEST_METHOD
    ));
    writer.open_brace();
    writer.writeln("switch (index)");
    writer.open_brace();

    for candidate in candidates {
        writer.writeln(&format!("case {}:", candidate.index));
        writer.indent();
        emit_test_call(writer, candidate);
        writer.writeln("break;");
        writer.dedent();
    }
    writer.writeln("default:");
    writer.indent();
    writer.writeln("break;");
    writer.dedent();

    writer.close_brace("");
    writer.close_brace("");
    writer.writeln_unindented("#pragma warning restore CS1998");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::GeneratorConfig;
    use crate::discovery::{Completion, FixtureLifetime, Invocation, QualifiedName};
    use crate::model::{MethodId, TypeId};

    fn candidate(index: usize, owner: &str, name: &str, invocation: Invocation) -> CandidateMethod {
        CandidateMethod {
            index,
            method: MethodId(index),
            owner: TypeId(0),
            name: name.to_string(),
            owner_name: QualifiedName::from(owner),
            label: QualifiedName::from(format!("{owner}.{name}")),
            invocation,
            completion: Completion::FireAndForget,
            fixture: FixtureLifetime::Owned,
        }
    }

    fn writer() -> CodeWriter {
        CodeWriter::new(&GeneratorConfig::default())
    }

    #[test]
    fn test_stub_text() {
        let mut w = writer();
        emit_stub(&mut w, &RunTestsSignature::Default);
        assert_eq!(
            w.finish(),
            "private static Task<int> RunTestsAsync()\n\
             {\n\
             #pragma warning disable CA1303\n    \
             Console.WriteLine(\"Failed: 0, Passed: 0, Total: 0\");\n    \
             return Task.FromResult(0);\n\
             #pragma warning restore CA1303\n\
             }\n"
        );
    }

    #[test]
    fn test_stub_uses_declared_signature_without_async() {
        let mut w = writer();
        let signature = RunTestsSignature::Declared {
            modifiers: vec!["public".into(), "static".into(), "async".into(), "partial".into()],
        };
        emit_stub(&mut w, &signature);
        assert!(w.finish().starts_with("public static partial Task<int> RunTestsAsync()\n{\n"));
    }

    #[test]
    fn test_dispatch_has_one_case_per_candidate() {
        let candidates = vec![
            candidate(0, "Tests.A", "One", Invocation::Instance),
            candidate(1, "Tests.B", "Two", Invocation::Static),
        ];
        let mut w = writer();
        emit_dispatch(&mut w, &candidates);
        let code = w.finish();

        assert_eq!(
            code,
            "#pragma warning disable CS1998\n\
             private static async Task RunTestAsync(int index)\n\
             {\n    \
             switch (index)\n    \
             {\n        \
             case 0:\n            \
             var fixture0 = new Tests.A();\n            \
             fixture0.One();\n            \
             break;\n        \
             case 1:\n            \
             Tests.B.Two();\n            \
             break;\n        \
             default:\n            \
             break;\n    \
             }\n\
             }\n\
             #pragma warning restore CS1998\n"
        );
    }

    #[test]
    fn test_run_tests_lists_labels_in_index_order() {
        let candidates = vec![
            candidate(0, "Tests.A", "One", Invocation::Instance),
            candidate(1, "Tests.A+Nested", "Two", Invocation::Static),
        ];
        let mut w = writer();
        emit_run_tests(&mut w, &RunTestsSignature::Default, &candidates);
        let code = w.finish();

        assert!(code.starts_with("private static async Task<int> RunTestsAsync()\n{\n"));
        assert!(code.contains(
            "    var testNames = new[]\n    {\n        \"Tests.A.One\",\n        \"Tests.A+Nested.Two\",\n    };\n"
        ));
        assert!(code.contains(".ForEachAsync(Enumerable.Range(0, 2), async (i, cancellationToken) =>"));
        assert!(code.contains(
            "Console.WriteLine($\"Failed: {failedTests.Count}, Passed: {passedCount}, Total: {failedTests.Count + passedCount}\");"
        ));
        assert!(code.ends_with("    return failedTests.Count;\n}\n"));
    }

    #[test]
    fn test_progress_lines_use_report_markers() {
        let mut w = writer();
        emit_progress_consumer(&mut w);
        let code = w.finish();

        assert!(code.contains("Console.WriteLine($\"x {name}: {failMessage}\");"));
        assert!(code.contains("Console.WriteLine($\"v {name}\");"));
        assert!(code.contains("(Environment.ProcessorCount)"));
    }

    #[test]
    fn test_pragmas_are_never_indented() {
        let candidates = vec![candidate(0, "Tests.A", "One", Invocation::Static)];
        let mut w = writer();
        w.indent();
        emit_harness(&mut w, &RunTestsSignature::Default, &candidates);
        let code = w.finish();

        let pragmas: Vec<_> = code.lines().filter(|line| line.contains("#pragma")).collect();
        assert_eq!(pragmas.len(), 4);
        assert!(pragmas.iter().all(|line| line.starts_with("#pragma")));
    }
}
