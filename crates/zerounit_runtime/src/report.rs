//! Progress and summary reporting
//!
//! ## Reporter Trait
//!
//! The harness separates reporting from execution through the [`Reporter`] trait. Progress events arrive in
//! completion order from a single consumer task; the summary arrives once, after every unit has finished and the
//! progress channel has drained.
//!
//! [`ConsoleReporter`] prints the same lines as a generated harness:
//!
//! ```text
//! v Tests.MathTests.Add
//! x Tests.MathTests.Divide: attempt to divide by zero
//!
//! Failed test: Tests.MathTests.Divide
//! ...
//! Failed: 1, Passed: 1, Total: 2
//! ```

use std::io::{self, Write};

use tracing::warn;
use zerounit_core::{EMPTY_SUMMARY, failure_line, success_line, summary_line};

use crate::fault::Fault;

// ============================================================================
// Events
// ============================================================================

/// One finished unit, as streamed to the reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Passed { name: String },
    Failed { name: String, message: String },
}

impl Progress {
    pub fn name(&self) -> &str {
        match self {
            Progress::Passed { name } | Progress::Failed { name, .. } => name,
        }
    }
}

/// A failed test and what it failed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub name: String,
    pub fault: Fault,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: usize,
    /// Failures in completion order.
    pub failures: Vec<Failure>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.failed() + self.passed
    }

    /// Process exit code: the number of failed tests.
    pub fn exit_code(&self) -> i32 {
        i32::try_from(self.failed()).unwrap_or(i32::MAX)
    }

    /// `Failed: {F}, Passed: {P}, Total: {F+P}`
    pub fn summary_line(&self) -> String {
        summary_line(self.failed(), self.passed, self.total())
    }
}

// ============================================================================
// Reporter Trait
// ============================================================================

/// Receives harness events.
///
/// Implement this trait to customize output (JSON, TAP, etc.)
pub trait Reporter {
    /// Called as each unit finishes
    fn on_progress(&mut self, progress: &Progress);

    /// Called once, after all units finished
    fn on_summary(&mut self, summary: &RunSummary);
}

// ============================================================================
// Console reporter
// ============================================================================

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Writes the colour sequence on creation and the reset sequence when dropped.
struct Styled<'a, W: Write> {
    out: &'a mut W,
    enabled: bool,
}

impl<'a, W: Write> Styled<'a, W> {
    fn new(out: &'a mut W, color: &str, enabled: bool) -> io::Result<Self> {
        if enabled {
            out.write_all(color.as_bytes())?;
        }
        Ok(Self { out, enabled })
    }
}

impl<W: Write> Write for Styled<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> Drop for Styled<'_, W> {
    fn drop(&mut self) {
        if self.enabled {
            let _ = self.out.write_all(RESET.as_bytes());
        }
    }
}

/// Plain-text reporter with optional ANSI colours.
pub struct ConsoleReporter<W: Write> {
    out: W,
    color: bool,
}

impl ConsoleReporter<io::Stdout> {
    /// Coloured output on stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), true)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_progress(&mut self, progress: &Progress) -> io::Result<()> {
        let (color, line) = match progress {
            Progress::Passed { name } => (GREEN, success_line(name)),
            Progress::Failed { name, message } => (RED, failure_line(name, message)),
        };
        let mut styled = Styled::new(&mut self.out, color, self.color)?;
        writeln!(styled, "{line}")?;
        drop(styled);
        self.out.flush()
    }

    fn write_summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        if summary.total() == 0 {
            writeln!(self.out, "{EMPTY_SUMMARY}")?;
            return self.out.flush();
        }

        writeln!(self.out)?;
        let color = if summary.failures.is_empty() { GREEN } else { RED };
        let mut styled = Styled::new(&mut self.out, color, self.color)?;
        for failure in &summary.failures {
            let fault = &failure.fault;
            let trace = fault
                .stack_trace
                .as_deref()
                .or(fault.location.as_deref())
                .unwrap_or_default();
            writeln!(styled, "Failed test: {}", failure.name)?;
            writeln!(styled)?;
            writeln!(styled, "{}", fault.message)?;
            writeln!(styled)?;
            writeln!(styled, "Exception type: {}", fault.kind)?;
            writeln!(styled, "Stack trace: {trace}")?;
            writeln!(styled)?;
        }
        writeln!(styled, "{}", summary.summary_line())?;
        drop(styled);
        self.out.flush()
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_progress(&mut self, progress: &Progress) {
        if let Err(err) = self.write_progress(progress) {
            warn!(test = progress.name(), %err, "failed to write progress");
        }
    }

    fn on_summary(&mut self, summary: &RunSummary) {
        if let Err(err) = self.write_summary(summary) {
            warn!(%err, "failed to write summary");
        }
    }
}
