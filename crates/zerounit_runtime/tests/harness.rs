//! End-to-end runs of the in-process harness.
//!
//! Each test builds a small harness, runs it against a buffered console reporter and checks the printed report, the
//! summary and the exit code.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use zerounit_runtime::{
    ConsoleReporter, Dispose, Fault, Harness, HarnessConfig, Progress, Reporter, RunSummary, Scoped, TestCase,
};

fn config(parallelism: usize) -> HarnessConfig {
    HarnessConfig::new().with_parallelism(parallelism).with_color(false)
}

async fn run_plain(harness: Harness) -> (String, RunSummary) {
    let outcome = harness
        .run(ConsoleReporter::new(Vec::new(), false))
        .await
        .unwrap();
    let text = String::from_utf8(outcome.reporter.into_inner()).unwrap();
    (text, outcome.summary)
}

/// Records every event for order checks.
#[derive(Default)]
struct Recording {
    progress: Vec<Progress>,
    summaries: usize,
}

impl Reporter for Recording {
    fn on_progress(&mut self, progress: &Progress) {
        self.progress.push(progress.clone());
    }

    fn on_summary(&mut self, _summary: &RunSummary) {
        self.summaries += 1;
    }
}

/// Counts disposals through a shared counter.
struct Tracked {
    disposed: Arc<AtomicUsize>,
}

impl Dispose for Tracked {
    fn dispose(&mut self) {
        self.disposed.fetch_add(1, Ordering::SeqCst);
    }
}

// ========================================
// Outcomes and exit codes
// ========================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_run_reports_failures_and_exit_code() {
    let harness = Harness::new(config(2))
        .with_case(TestCase::new("Calc.Adds", || assert_eq!(2 + 2, 4)))
        .with_case(TestCase::fallible("Calc.Parses", || {
            let value: u32 = "17".parse()?;
            assert_eq!(value, 17);
            Ok(())
        }))
        .with_case(TestCase::fallible("Calc.RejectsInput", || Err(Fault::msg("bad input"))))
        .with_case(TestCase::awaitable("Calc.Waits", || async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<(), Fault>(())
        }))
        .with_case(TestCase::new("Calc.Divides", || {
            let divisor = std::hint::black_box(0_u32);
            let _ = 10 / divisor;
        }));

    let (text, summary) = run_plain(harness).await;

    assert_eq!(summary.passed, 3);
    assert_eq!(summary.failed(), 2);
    assert_eq!(summary.exit_code(), 2);
    assert!(text.contains("v Calc.Adds\n"));
    assert!(text.contains("v Calc.Parses\n"));
    assert!(text.contains("v Calc.Waits\n"));
    assert!(text.contains("x Calc.RejectsInput: bad input\n"));
    assert!(text.contains("x Calc.Divides: attempt to divide by zero\n"));
    assert!(text.contains("Failed test: Calc.Divides\n"));
    assert!(text.contains("Exception type: panic\n"));
    assert!(text.ends_with("Failed: 2, Passed: 3, Total: 5\n"));
}

#[tokio::test]
async fn test_empty_harness_prints_only_summary() {
    let (text, summary) = run_plain(Harness::new(config(4))).await;
    assert_eq!(text, "Failed: 0, Passed: 0, Total: 0\n");
    assert_eq!(summary.exit_code(), 0);
}

#[tokio::test]
async fn test_all_passing_run_exits_zero() {
    let harness = Harness::new(config(1))
        .with_case(TestCase::new("Suite.One", || {}))
        .with_case(TestCase::new("Suite.Two", || {}));
    let (text, summary) = run_plain(harness).await;
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(text, "v Suite.One\nv Suite.Two\n\nFailed: 0, Passed: 2, Total: 2\n");
}

#[tokio::test]
async fn test_error_kind_is_reported() {
    let harness = Harness::new(config(1)).with_case(TestCase::fallible("Parse.Fails", || {
        let _: u32 = "x".parse()?;
        Ok(())
    }));
    let (text, summary) = run_plain(harness).await;
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].fault.kind.ends_with("ParseIntError"));
    assert!(text.contains("x Parse.Fails: invalid digit found in string\n"));
}

// ========================================
// Reporter contract
// ========================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_one_progress_event_per_test_and_one_summary() {
    let mut harness = Harness::new(HarnessConfig::new().with_parallelism(3).with_channel_capacity(1));
    for i in 0..20 {
        let name = format!("Many.Case{i}");
        if i % 4 == 0 {
            harness.add(TestCase::fallible(name, || Err(Fault::msg("nope"))));
        } else {
            harness.add(TestCase::new(name, || {}));
        }
    }

    let outcome = harness.run(Recording::default()).await.unwrap();
    let reporter = outcome.reporter;

    assert_eq!(reporter.progress.len(), 20);
    assert_eq!(reporter.summaries, 1);
    assert_eq!(outcome.summary.failed(), 5);
    assert_eq!(outcome.summary.passed, 15);

    let mut names: Vec<_> = reporter.progress.iter().map(|p| p.name().to_string()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallelism_bound_is_respected() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let mut harness = Harness::new(config(2));

    for i in 0..8 {
        let in_flight = Arc::clone(&in_flight);
        let peak = Arc::clone(&peak);
        harness.add(TestCase::awaitable(format!("Bounded.Case{i}"), move || async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok::<(), Fault>(())
        }));
    }

    let (_, summary) = run_plain(harness).await;
    assert_eq!(summary.passed, 8);
    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert!(peak.load(Ordering::SeqCst) >= 1);
}

// ========================================
// Fixtures
// ========================================

#[tokio::test]
async fn test_disposable_fixture_disposed_once_per_outcome() {
    let disposed = Arc::new(AtomicUsize::new(0));
    let make = |disposed: &Arc<AtomicUsize>| {
        let disposed = Arc::clone(disposed);
        move || Scoped::new(Tracked { disposed })
    };

    let passing = make(&disposed);
    let failing = make(&disposed);
    let panicking = make(&disposed);

    let harness = Harness::new(config(1))
        .with_case(TestCase::fallible("Disposal.Passes", move || {
            let _fixture = passing();
            Ok(())
        }))
        .with_case(TestCase::fallible("Disposal.Fails", move || {
            let _fixture = failing();
            Err(Fault::msg("failed"))
        }))
        .with_case(TestCase::fallible("Disposal.Panics", move || {
            let _fixture = panicking();
            if true {
                panic!("exploded");
            }
            Ok(())
        }));

    let (_, summary) = run_plain(harness).await;
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed(), 2);
    assert_eq!(disposed.load(Ordering::SeqCst), 3);
}

#[derive(Default)]
struct Account {
    balance: i64,
    closed: bool,
}

impl Dispose for Account {
    fn dispose(&mut self) {
        self.closed = true;
    }
}

#[tokio::test]
async fn test_fixture_constructors() {
    let harness = Harness::new(config(2))
        .with_case(TestCase::with_fixture("Account.Deposits", |account: &mut Account| {
            account.balance += 10;
            assert_eq!(account.balance, 10);
            Ok(())
        }))
        .with_case(TestCase::with_disposable_fixture("Account.StartsOpen", |account: &mut Account| {
            assert!(!account.closed);
            Ok(())
        }))
        .with_case(TestCase::awaitable_with_fixture("Account.Awaits", |mut account: Account| async move {
            tokio::task::yield_now().await;
            account.balance -= 5;
            assert_eq!(account.balance, -5);
            Ok::<(), Fault>(())
        }))
        .with_case(TestCase::awaitable_with_disposable_fixture(
            "Account.AwaitsDisposable",
            |account: Scoped<Account>| async move {
                tokio::task::yield_now().await;
                assert_eq!(account.balance, 0);
                Ok::<(), Fault>(())
            },
        ));

    let (_, summary) = run_plain(harness).await;
    assert_eq!(summary.passed, 4);
    assert_eq!(summary.failed(), 0);
}

#[derive(Debug)]
struct Explosive;

impl Default for Explosive {
    fn default() -> Self {
        panic!("constructor failed")
    }
}

#[tokio::test]
async fn test_fixture_construction_panic_is_a_failure() {
    let harness = Harness::new(config(1))
        .with_case(TestCase::with_fixture("Explosive.Never", |_: &mut Explosive| Ok(())))
        .with_case(TestCase::new("Explosive.Neighbour", || {}));

    let (text, summary) = run_plain(harness).await;
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].name, "Explosive.Never");
    assert!(summary.failures[0].fault.is_panic());
    assert!(text.contains("x Explosive.Never: constructor failed\n"));
}

static BRITTLE_DISPOSALS: AtomicUsize = AtomicUsize::new(0);

/// Disposal that always panics.
#[derive(Default)]
struct Brittle;

impl Dispose for Brittle {
    fn dispose(&mut self) {
        BRITTLE_DISPOSALS.fetch_add(1, Ordering::SeqCst);
        panic!("dispose failed");
    }
}

#[test]
fn test_panicking_dispose_after_panicking_body_is_not_fatal() {
    let harness = Harness::new(config(1))
        .with_case(TestCase::with_disposable_fixture("Brittle.Panics", |_: &mut Brittle| {
            if true {
                panic!("body failed");
            }
            Ok(())
        }))
        .with_case(TestCase::new("Brittle.Neighbour", || {}));

    let outcome = harness
        .run_blocking(ConsoleReporter::new(Vec::new(), false))
        .unwrap();
    let text = String::from_utf8(outcome.reporter.into_inner()).unwrap();

    assert_eq!(BRITTLE_DISPOSALS.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.summary.exit_code(), 1);
    assert_eq!(outcome.summary.failures.len(), 1);
    assert_eq!(outcome.summary.failures[0].name, "Brittle.Panics");
    assert_eq!(outcome.summary.failures[0].fault.message, "body failed");
    assert!(text.contains("v Brittle.Neighbour\n"));
    assert!(text.contains("x Brittle.Panics: body failed\n"));
    assert!(text.ends_with("Failed: 1, Passed: 1, Total: 2\n"));
}

// ========================================
// Blocking entry point
// ========================================

#[test]
fn test_run_blocking_builds_its_own_runtime() {
    let harness = Harness::new(config(2))
        .with_case(TestCase::new("Blocking.Ok", || {}))
        .with_case(TestCase::fallible("Blocking.Fails", || Err(Fault::msg("no"))));
    let outcome = harness
        .run_blocking(ConsoleReporter::new(Vec::new(), false))
        .unwrap();
    assert_eq!(outcome.exit_code(), 1);
}
