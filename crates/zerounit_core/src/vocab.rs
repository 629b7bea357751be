//! Reserved member and type names of the harness target.
//!
//! Every name the generator either recognises in host code or emits into the harness lives here.

/// Method name that marks the disposal capability; never a test.
pub const DISPOSE_METHOD: &str = "Dispose";

/// Fully qualified name of the disposal capability interface.
pub const DISPOSABLE_INTERFACE: &str = "System.IDisposable";

/// Return type spellings accepted for awaitable tests.
pub const TASK_TYPE: &str = "Task";
pub const QUALIFIED_TASK_TYPE: &str = "System.Threading.Tasks.Task";

/// Return type spelling for fire-and-forget tests.
pub const VOID_KEYWORD: &str = "void";

/// Modifier keywords inspected by the structural gate.
pub const PUBLIC_KEYWORD: &str = "public";
pub const ASYNC_KEYWORD: &str = "async";

/// Modifiers of the generator-owned run-all routine.
pub const PRIVATE_KEYWORD: &str = "private";
pub const STATIC_KEYWORD: &str = "static";

/// The run-all routine, either generator-owned or forward-declared by the host.
pub const RUN_TESTS_METHOD: &str = "RunTestsAsync";

/// The per-index dispatch routine.
pub const RUN_SINGLE_TEST_METHOD: &str = "RunTestAsync";

/// Class and startup routine used when the host declares no entry point.
pub const DEFAULT_PROGRAM_CLASS: &str = "Program";
pub const ENTRY_POINT_METHOD: &str = "Main";

/// Prefix of the per-index fixture binding (`fixture0`, `fixture1`, ...).
pub const FIXTURE_PREFIX: &str = "fixture";

/// Name of the generated source unit.
pub const DEFAULT_HINT_NAME: &str = "Program.g.cs";

/// Build the fixture binding name for a dispatch index.
pub fn fixture_binding(index: usize) -> String {
    format!("{FIXTURE_PREFIX}{index}")
}
