//! Concurrent test harness
//!
//! Runs `N` independent units with at most `parallelism` in flight:
//!
//! - units are dispatched in registration order; each one holds a semaphore permit for its whole execution;
//! - every finished unit sends one [`Progress`] record into a bounded channel drained by a single consumer task
//!   that owns the [`Reporter`];
//! - the passed counter is atomic and failures are appended in completion order;
//! - after all units have finished the channel is closed and drained, then the summary is reported once.
//!
//! A run with no test cases skips all of that and only reports the empty summary.

use std::future::Future;
use std::io;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

use crate::fault::{CatchUnwind, Fault, UnitFuture, install_panic_hook};
use crate::fixture::{Dispose, Fixture, Scoped};
use crate::report::{ConsoleReporter, Failure, Progress, Reporter, RunSummary};

/// Errors raised by the harness itself, never by a test.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("reporter task failed: {0}")]
    Reporter(#[from] tokio::task::JoinError),
}

// ============================================================================
// Configuration
// ============================================================================

/// Harness settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Maximum number of units in flight
    pub parallelism: usize,
    /// Capacity of the progress channel
    pub channel_capacity: usize,
    /// Whether the default console reporter uses ANSI colours
    pub color: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        let parallelism = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self {
            parallelism,
            channel_capacity: parallelism,
            color: true,
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero is treated as one.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Zero is treated as one.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

// ============================================================================
// Test cases
// ============================================================================

type Body = Box<dyn FnOnce() -> UnitFuture + Send>;

/// A named test body.
///
/// The constructors mirror the shapes a test can take: plain or fallible, synchronous or awaitable, with or without
/// a fixture, and with or without disposal.
pub struct TestCase {
    name: String,
    body: Body,
}

impl TestCase {
    fn from_body(name: impl Into<String>, body: Body) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A synchronous test that fails only by panicking.
    pub fn new<B>(name: impl Into<String>, body: B) -> Self
    where
        B: FnOnce() + Send + 'static,
    {
        Self::fallible(name, move || {
            body();
            Ok(())
        })
    }

    /// A synchronous test that can return a [`Fault`].
    pub fn fallible<B>(name: impl Into<String>, body: B) -> Self
    where
        B: FnOnce() -> Result<(), Fault> + Send + 'static,
    {
        Self::from_body(name, Box::new(move || -> UnitFuture { Box::pin(async move { body() }) }))
    }

    /// An awaitable test.
    pub fn awaitable<B, Fut>(name: impl Into<String>, body: B) -> Self
    where
        B: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), Fault>> + Send + 'static,
    {
        Self::from_body(name, Box::new(move || -> UnitFuture { Box::pin(body()) }))
    }

    /// A synchronous test on a fresh fixture.
    pub fn with_fixture<F, B>(name: impl Into<String>, body: B) -> Self
    where
        F: Fixture,
        B: FnOnce(&mut F) -> Result<(), Fault> + Send + 'static,
    {
        Self::fallible(name, move || {
            let mut fixture = F::create();
            body(&mut fixture)
        })
    }

    /// A synchronous test on a fresh fixture that is disposed afterwards.
    pub fn with_disposable_fixture<F, B>(name: impl Into<String>, body: B) -> Self
    where
        F: Fixture + Dispose,
        B: FnOnce(&mut F) -> Result<(), Fault> + Send + 'static,
    {
        Self::fallible(name, move || {
            let mut fixture = Scoped::<F>::create();
            body(&mut fixture)
        })
    }

    /// An awaitable test that owns a fresh fixture.
    pub fn awaitable_with_fixture<F, B, Fut>(name: impl Into<String>, body: B) -> Self
    where
        F: Fixture,
        B: FnOnce(F) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), Fault>> + Send + 'static,
    {
        Self::from_body(name, Box::new(move || -> UnitFuture { Box::pin(body(F::create())) }))
    }

    /// An awaitable test that owns a fresh fixture, disposed when the test's future completes or is dropped.
    pub fn awaitable_with_disposable_fixture<F, B, Fut>(name: impl Into<String>, body: B) -> Self
    where
        F: Fixture + Dispose,
        B: FnOnce(Scoped<F>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), Fault>> + Send + 'static,
    {
        Self::from_body(name, Box::new(move || -> UnitFuture { Box::pin(body(Scoped::create())) }))
    }
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase").field("name", &self.name).finish_non_exhaustive()
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Result of [`Harness::run`]: the summary and the reporter handed back.
#[derive(Debug)]
pub struct RunOutcome<R> {
    pub summary: RunSummary,
    pub reporter: R,
}

impl<R> RunOutcome<R> {
    pub fn exit_code(&self) -> i32 {
        self.summary.exit_code()
    }
}

/// A set of test cases and the settings to run them with.
#[derive(Debug, Default)]
pub struct Harness {
    config: HarnessConfig,
    cases: Vec<TestCase>,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            cases: Vec::new(),
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Register a case. Dispatch order is registration order.
    pub fn add(&mut self, case: TestCase) -> &mut Self {
        self.cases.push(case);
        self
    }

    pub fn with_case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Run every case on the current tokio runtime.
    pub async fn run<R>(self, reporter: R) -> Result<RunOutcome<R>, HarnessError>
    where
        R: Reporter + Send + 'static,
    {
        let mut reporter = reporter;
        if self.cases.is_empty() {
            let summary = RunSummary::default();
            reporter.on_summary(&summary);
            return Ok(RunOutcome { summary, reporter });
        }

        install_panic_hook();
        let total = self.cases.len();
        debug!(
            tests = total,
            parallelism = self.config.parallelism,
            "starting test run"
        );

        let (progress_tx, mut progress_rx) = mpsc::channel::<Progress>(self.config.channel_capacity.max(1));
        let consumer = tokio::spawn(async move {
            while let Some(progress) = progress_rx.recv().await {
                reporter.on_progress(&progress);
            }
            reporter
        });

        let limiter = Arc::new(Semaphore::new(self.config.parallelism.max(1)));
        let passed = Arc::new(AtomicUsize::new(0));
        let failures = Arc::new(Mutex::new(Vec::new()));
        let mut units = JoinSet::new();

        for (index, case) in self.cases.into_iter().enumerate() {
            let Ok(permit) = Arc::clone(&limiter).acquire_owned().await else {
                warn!(index, "limiter closed; remaining tests not dispatched");
                break;
            };
            let progress_tx = progress_tx.clone();
            let passed = Arc::clone(&passed);
            let failures = Arc::clone(&failures);

            units.spawn(async move {
                let _permit = permit;
                let TestCase { name, body } = case;
                trace!(index, test = %name, "unit started");

                // The body is built inside the unit so construction panics are caught too.
                let outcome = CatchUnwind::new(Box::pin(async move { body().await })).await;
                match outcome {
                    Ok(()) => {
                        passed.fetch_add(1, Ordering::SeqCst);
                        trace!(index, test = %name, "unit passed");
                        let _ = progress_tx.send(Progress::Passed { name }).await;
                    }
                    Err(fault) => {
                        trace!(index, test = %name, kind = %fault.kind, "unit failed");
                        let _ = progress_tx
                            .send(Progress::Failed {
                                name: name.clone(),
                                message: fault.message.clone(),
                            })
                            .await;
                        failures
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(Failure { name, fault });
                    }
                }
            });
        }

        while let Some(joined) = units.join_next().await {
            if let Err(err) = joined {
                warn!(%err, "test unit aborted");
            }
        }

        drop(progress_tx);
        let mut reporter = consumer.await?;

        let failures = std::mem::take(&mut *failures.lock().unwrap_or_else(PoisonError::into_inner));
        let summary = RunSummary {
            passed: passed.load(Ordering::SeqCst),
            failures,
        };
        debug!(
            failed = summary.failed(),
            passed = summary.passed,
            "test run finished"
        );
        reporter.on_summary(&summary);
        Ok(RunOutcome { summary, reporter })
    }

    /// Run every case on a fresh multi-threaded runtime sized to the configured parallelism.
    pub fn run_blocking<R>(self, reporter: R) -> Result<RunOutcome<R>, HarnessError>
    where
        R: Reporter + Send + 'static,
    {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.parallelism.max(1))
            .enable_all()
            .build()?;
        runtime.block_on(self.run(reporter))
    }

    /// Run with a console reporter on stdout and return the process exit code.
    pub fn run_to_stdout(self) -> Result<i32, HarnessError> {
        let reporter = ConsoleReporter::new(io::stdout(), self.config.color);
        Ok(self.run_blocking(reporter)?.exit_code())
    }
}
