use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;
use crate::api::types::Millis;

/// Monotonic time source, in milliseconds.
///
/// Units must stay consistent for the lifetime of every engine using the clock.
pub trait Clock {
    fn now(&self) -> Millis;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Millis {
        (**self).now()
    }
}

/// Wall clock backed by [`Instant`], counting from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Millis>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the clock at `now` instead of zero.
    pub fn starting_at(now: Millis) -> Self {
        Self { now: Rc::new(Cell::new(now)) }
    }

    /// Move time forward by `dt` milliseconds.
    pub fn advance(&self, dt: Millis) {
        self.now.set(self.now.get() + dt);
    }

    /// Jump to an absolute time. Allowed to go backwards, to exercise
    /// regression handling.
    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        self.now.get()
    }
}
