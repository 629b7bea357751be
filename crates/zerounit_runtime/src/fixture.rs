//! Test fixtures
//!
//! Every instance test gets a fresh fixture built with a zero-argument constructor and owned by the unit that runs
//! it. Fixtures with a disposal capability are wrapped in [`Scoped`], which disposes them exactly once however the
//! test ends.

use std::ops::{Deref, DerefMut};
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crate::fault;

/// A type the harness can construct without arguments.
pub trait Fixture: Sized + Send + 'static {
    fn create() -> Self;
}

impl<T: Default + Send + 'static> Fixture for T {
    fn create() -> Self {
        T::default()
    }
}

/// Explicit disposal capability.
///
/// `dispose` runs once per fixture, after the test body, on success, failure and panic alike. A panic in `dispose`
/// fails the test; if the body already panicked, the body's panic is the one reported.
pub trait Dispose {
    fn dispose(&mut self);
}

/// Owns a disposable fixture and disposes it when dropped.
pub struct Scoped<F: Dispose> {
    fixture: F,
}

impl<F: Dispose> Scoped<F> {
    pub fn new(fixture: F) -> Self {
        Self { fixture }
    }
}

impl<F: Fixture + Dispose> Scoped<F> {
    /// Construct a fresh fixture.
    pub fn create() -> Self {
        Self::new(F::create())
    }
}

impl<F: Dispose> Deref for Scoped<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.fixture
    }
}

impl<F: Dispose> DerefMut for Scoped<F> {
    fn deref_mut(&mut self) -> &mut F {
        &mut self.fixture
    }
}

impl<F: Dispose> Drop for Scoped<F> {
    fn drop(&mut self) {
        if thread::panicking() {
            // A second panic while unwinding would abort the process.
            let fixture = &mut self.fixture;
            fault::preserving_capture(|| {
                let _ = panic::catch_unwind(AssertUnwindSafe(|| fixture.dispose()));
            });
        } else {
            self.fixture.dispose();
        }
    }
}
