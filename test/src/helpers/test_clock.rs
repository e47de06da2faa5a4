use std::time::Duration;

use orbit_shared::Instant;

/// One presentation frame at 60 Hz, rounded up so every step is worth at
/// least one tick
pub const FRAME: Duration = Duration::from_micros(16_667);

/// Synthetic clock advanced by hand so runs don't depend on wall time
pub struct TestClock {
    now: Instant,
    step: Duration,
}

impl TestClock {
    pub fn new(step: Duration) -> Self {
        Self {
            now: Instant::now(),
            step,
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Moves time forward one step and returns the new time and the step
    pub fn advance(&mut self) -> (Instant, Duration) {
        self.advance_by(self.step)
    }

    pub fn advance_by(&mut self, elapsed: Duration) -> (Instant, Duration) {
        self.now += elapsed;
        (self.now, elapsed)
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new(FRAME)
    }
}
