use std::cell::Cell;
use std::time::Instant;

/// Absolute point in time, in seconds since the owning clock's epoch.
///
/// Spawn schedules are stamped with these values, so every timestamp a game sees must
/// come from a single [`Clock`].
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Timestamp(f64);

impl Timestamp {
    pub const ZERO: Self = Self(0.0);

    pub const fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(self) -> f64 {
        self.0
    }

    /// Timestamp `secs` seconds after this one.
    pub fn after(self, secs: f64) -> Self {
        Self(self.0 + secs)
    }

    /// Seconds elapsed since `earlier`. Negative if `earlier` is in the future.
    pub fn secs_since(self, earlier: Timestamp) -> f64 {
        self.0 - earlier.0
    }
}

pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Clock that only moves when told to. Used for fast-forward runs and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start.as_secs()),
        }
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }

    pub fn set(&self, at: Timestamp) {
        self.now.set(at.as_secs());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.get())
    }
}

/// Wall clock backed by [`std::time::Instant`], with its epoch at construction.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.epoch.elapsed().as_secs_f64())
    }
}
