//! Captured test failures
//!
//! A test fails by returning `Err(Fault)` or by panicking. Both end up as a [`Fault`] in the run summary.
//!
//! Panics are caught at the unit boundary. While a unit is being polled, a process-wide panic hook records the
//! panic location and a backtrace for the current thread instead of printing them; panics anywhere else go to the
//! hook that was installed before.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Once;
use std::task::{Context, Poll};

/// Kind reported for a panicking test.
pub const PANIC_KIND: &str = "panic";

/// A captured test failure.
///
/// Not an error type itself: any `std::error::Error` converts into a `Fault` with `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub message: String,
    /// Error type name, or [`PANIC_KIND`].
    pub kind: String,
    /// `file:line:column` of a panic.
    pub location: Option<String>,
    pub stack_trace: Option<String>,
}

impl Fault {
    /// A failure with a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: "fault".to_string(),
            location: None,
            stack_trace: None,
        }
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>, capture: Option<PanicCapture>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "test panicked".to_string()
        };
        let (location, stack_trace) = match capture {
            Some(capture) => (capture.location, Some(capture.backtrace)),
            None => (None, None),
        };
        Self {
            message,
            kind: PANIC_KIND.to_string(),
            location,
            stack_trace,
        }
    }

    pub fn is_panic(&self) -> bool {
        self.kind == PANIC_KIND
    }
}

impl<E: std::error::Error + 'static> From<E> for Fault {
    fn from(err: E) -> Self {
        Self {
            message: err.to_string(),
            kind: std::any::type_name::<E>().to_string(),
            location: None,
            stack_trace: None,
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// ============================================================================
// Panic capture
// ============================================================================

#[derive(Debug)]
pub(crate) struct PanicCapture {
    location: Option<String>,
    backtrace: String,
}

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST_PANIC: RefCell<Option<PanicCapture>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

/// Install the capturing panic hook once per process, chaining to the previous hook.
pub(crate) fn install_panic_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                let capture = PanicCapture {
                    location: info.location().map(ToString::to_string),
                    backtrace: Backtrace::force_capture().to_string(),
                };
                LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(capture));
            } else {
                previous(info);
            }
        }));
    });
}

fn take_capture() -> Option<PanicCapture> {
    LAST_PANIC.with(|slot| slot.borrow_mut().take())
}

/// Run `f` without letting its panics replace the capture of the panic already in flight.
pub(crate) fn preserving_capture<R>(f: impl FnOnce() -> R) -> R {
    let saved = take_capture();
    let result = f();
    LAST_PANIC.with(|slot| *slot.borrow_mut() = saved);
    result
}

/// Marks the current thread as capturing for the guard's lifetime.
struct CaptureScope {
    previous: bool,
}

impl CaptureScope {
    fn enter() -> Self {
        Self {
            previous: CAPTURING.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for CaptureScope {
    fn drop(&mut self) {
        CAPTURING.with(|flag| flag.set(self.previous));
    }
}

/// Boxed body of a unit.
pub(crate) type UnitFuture = Pin<Box<dyn Future<Output = Result<(), Fault>> + Send>>;

/// Converts panics raised while polling `inner` into a [`Fault`].
///
/// After a panic the inner future is dropped immediately, so fixtures it owns are released before the failure is
/// reported.
pub(crate) struct CatchUnwind {
    inner: Option<UnitFuture>,
}

impl CatchUnwind {
    pub(crate) fn new(inner: UnitFuture) -> Self {
        Self { inner: Some(inner) }
    }
}

impl Future for CatchUnwind {
    type Output = Result<(), Fault>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Some(inner) = self.inner.as_mut() else {
            return Poll::Ready(Err(Fault::msg("unit polled after completion")));
        };

        let scope = CaptureScope::enter();
        let result = panic::catch_unwind(AssertUnwindSafe(|| inner.as_mut().poll(cx)));
        let outcome = match result {
            Ok(Poll::Pending) => return Poll::Pending,
            Ok(Poll::Ready(outcome)) => outcome,
            Err(payload) => {
                let fault = Fault::from_panic(payload, take_capture());
                if let Some(inner) = self.inner.take() {
                    // A panicking destructor must not escape the unit either.
                    let _ = panic::catch_unwind(AssertUnwindSafe(move || drop(inner)));
                    let _ = take_capture();
                }
                Err(fault)
            }
        };
        drop(scope);
        self.inner = None;
        Poll::Ready(outcome)
    }
}
