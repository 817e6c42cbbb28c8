use std::{
    cell::Cell,
    time::{Duration, Instant},
};

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since the clock's origin. Never decreases.
    fn now(&self) -> Duration;
}

/// [`Clock`] backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// [`Clock`] that only moves when told to.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Accumulator that turns wall time into a whole number of fixed-length ticks.
///
/// Elapsed time is added to an accumulator and released one step at a time,
/// so the game logic runs at a constant rate however often frames are drawn.
/// After a long frame every missed tick is released at once; there is no cap.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::{FixedTimestep, ManualClock};
///
/// let clock = ManualClock::new();
/// let mut timestep = FixedTimestep::from_rate(60);
/// assert_eq!(timestep.advance(&clock), 0);
///
/// clock.advance(Duration::from_millis(50));
/// assert_eq!(timestep.advance(&clock), 3);
/// assert_eq!(timestep.total_ticks(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: Duration,
    accumulator: Duration,
    last: Option<Duration>,
    total_ticks: u64,
}

impl FixedTimestep {
    /// Creates a timestep releasing `rate` ticks per second.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is zero.
    #[must_use]
    pub fn from_rate(rate: u32) -> Self {
        assert!(rate > 0, "tick rate must be positive");
        Self::new(Duration::from_secs(1) / rate)
    }

    /// # Panics
    ///
    /// Panics if `step` is zero.
    #[must_use]
    pub fn new(step: Duration) -> Self {
        assert!(!step.is_zero(), "tick step must be positive");
        Self {
            step,
            accumulator: Duration::ZERO,
            last: None,
            total_ticks: 0,
        }
    }

    /// Samples `clock` and returns how many ticks are due.
    ///
    /// The first call only records the starting time.
    pub fn advance<C>(&mut self, clock: &C) -> u64
    where
        C: Clock + ?Sized,
    {
        let now = clock.now();
        let elapsed = self
            .last
            .map_or(Duration::ZERO, |last| now.saturating_sub(last));
        self.last = Some(now);
        self.accumulate(elapsed)
    }

    /// Adds `elapsed` to the accumulator and returns how many ticks it releases.
    pub fn accumulate(&mut self, elapsed: Duration) -> u64 {
        self.accumulator += elapsed;
        let mut ticks = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            ticks += 1;
        }
        self.total_ticks += ticks;
        ticks
    }

    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Wall time left until the next tick is due, as of the last sample.
    #[must_use]
    pub fn time_until_next_tick(&self) -> Duration {
        self.step.saturating_sub(self.accumulator)
    }

}
