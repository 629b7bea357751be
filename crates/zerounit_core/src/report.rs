//! Report lines printed by a running harness.
//!
//! The generator passes interpolation holes (`{passedCount}`) as arguments, the runtime passes numbers, and both
//! end up with the same text.

use std::fmt::Display;

/// Progress marker for a passed test.
pub const PASS_MARKER: &str = "v";

/// Progress marker for a failed test.
pub const FAIL_MARKER: &str = "x";

/// Summary printed by a harness with no tests.
pub const EMPTY_SUMMARY: &str = "Failed: 0, Passed: 0, Total: 0";

/// Final summary line: `Failed: {F}, Passed: {P}, Total: {T}`.
pub fn summary_line(failed: impl Display, passed: impl Display, total: impl Display) -> String {
    format!("Failed: {failed}, Passed: {passed}, Total: {total}")
}

/// Progress line for a passed test: `v {name}`.
pub fn success_line(name: impl Display) -> String {
    format!("{PASS_MARKER} {name}")
}

/// Progress line for a failed test: `x {name}: {message}`.
pub fn failure_line(name: impl Display, message: impl Display) -> String {
    format!("{FAIL_MARKER} {name}: {message}")
}
