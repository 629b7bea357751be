//! In-process concurrent test harness for ZeroUnit.
//!
//! This crate runs Rust test bodies under the same contract as a generated harness: bounded concurrency, one
//! progress line per finished test, a failure-details block, a single summary line, and an exit code equal to the
//! number of failed tests. The lines themselves come from `zerounit_core`, so both report formats stay identical.
//!
//! ```no_run
//! use zerounit_runtime::{Fault, Harness, HarnessConfig, TestCase};
//!
//! let harness = Harness::new(HarnessConfig::default())
//!     .with_case(TestCase::new("MathTests.Add", || assert_eq!(1 + 1, 2)))
//!     .with_case(TestCase::fallible("MathTests.Parse", || {
//!         let _: u32 = "42".parse()?;
//!         Ok::<(), Fault>(())
//!     }));
//! let code = harness.run_to_stdout().unwrap_or(1);
//! std::process::exit(code);
//! ```
//!
//! ## Modules
//!
//! - [`fault`]: captured failures and panic capture
//! - [`fixture`]: fixture construction and disposal
//! - [`harness`]: test cases and the concurrent runner
//! - [`report`]: progress events, summaries and the console reporter

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod fault;
pub mod fixture;
pub mod harness;
pub mod report;

pub use fault::{Fault, PANIC_KIND};
pub use fixture::{Dispose, Fixture, Scoped};
pub use harness::{Harness, HarnessConfig, HarnessError, RunOutcome, TestCase};
pub use report::{ConsoleReporter, Failure, Progress, Reporter, RunSummary};
