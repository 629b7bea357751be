//! Provide the canonical vocabulary shared by the ZeroUnit generator and runtime.
//!
//! The generator emits these names and strings into harness source text, and the in-process runtime prints the same
//! strings when it runs Rust tests. Keeping them in one place is what keeps the two report formats identical.
//!
//! ## Notes
//!
//! - This is a "semantic core" crate: **no IO**, no global state, no dependencies.

pub mod report;
pub mod vocab;

pub use report::{EMPTY_SUMMARY, FAIL_MARKER, PASS_MARKER, failure_line, success_line, summary_line};
