#[cfg(test)]
use std::cell::Cell;
use std::time::Instant;

/// Monotonic time in seconds since an arbitrary epoch.
pub trait MonotonicClock {
    fn now(&self) -> f64;
}

pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> SystemClock {
        SystemClock {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
pub struct ManualClock {
    now: Cell<f64>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: f64) -> ManualClock {
        ManualClock {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: f64) {
        assert!(now >= self.now.get(), "time must not run backwards");
        self.now.set(now);
    }

    pub fn advance(&self, secs: f64) {
        self.set(self.now.get() + secs);
    }
}

#[cfg(test)]
impl MonotonicClock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}
