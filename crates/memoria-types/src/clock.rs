//! Clocks that drive the session's virtual time.
//!
//! The session only sees the microsecond timestamps handed to its
//! `update`; a clock decides where those come from.

use std::cell::Cell;
use std::time::{Duration, Instant};

pub trait GameClock {
    /// Microseconds since the clock was started.
    fn elapsed_us(&self) -> i64;
}

/// Follows real time from the moment it is started.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    started: Instant,
}

impl WallClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Real time left until `due_us`; zero once it has passed.
    pub fn until_us(&self, due_us: i64) -> Duration {
        let left = due_us.saturating_sub(self.elapsed_us());
        Duration::from_micros(u64::try_from(left).unwrap_or(0))
    }
}

impl GameClock for WallClock {
    fn elapsed_us(&self) -> i64 {
        i64::try_from(self.started.elapsed().as_micros()).unwrap_or(i64::MAX)
    }
}

/// Moves only when stepped, so a whole game can be scripted against
/// exact note intervals and round delays.
#[derive(Debug, Default)]
pub struct SteppedClock {
    elapsed_us: Cell<i64>,
}

impl SteppedClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves forward and returns the new reading.
    pub fn step_us(&self, delta_us: i64) -> i64 {
        let now = self.elapsed_us.get().saturating_add(delta_us.max(0));
        self.elapsed_us.set(now);
        now
    }

    pub fn step_ms(&self, delta_ms: i64) -> i64 {
        self.step_us(delta_ms.saturating_mul(1000))
    }
}

impl GameClock for SteppedClock {
    fn elapsed_us(&self) -> i64 {
        self.elapsed_us.get()
    }
}
