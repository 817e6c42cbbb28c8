/// Points awarded for each cleared line.
pub const LINE_CLEAR_SCORE: u64 = 100;

/// Gravity curve: how the auto-descend interval shrinks as lines are cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GravityCurve {
    /// Ticks between auto-descends at the start of a game.
    pub initial_interval: u32,
    /// Floor the interval never drops below.
    pub min_interval: u32,
    /// Ticks removed from the interval at each speed-up.
    pub step: u32,
    /// Cleared lines between speed-ups.
    pub lines_per_speedup: u64,
}

impl Default for GravityCurve {
    fn default() -> Self {
        Self {
            initial_interval: 60,
            min_interval: 10,
            step: 10,
            lines_per_speedup: 10,
        }
    }
}

/// Score, cleared lines and current gravity of a game.
///
/// Scoring follows the classic arcade rules of this engine:
///
/// - **Soft drop / hard drop**: one point per row the piece descends
/// - **Line clear**: [`LINE_CLEAR_SCORE`] per cleared line, no multi-line bonus
///
/// Every `lines_per_speedup` lines the gravity interval shrinks by `step`
/// ticks, as long as the interval is still above the floor.
///
/// # Example
///
/// ```
/// use blockfall_engine::{GameStats, GravityCurve};
///
/// let mut stats = GameStats::new(GravityCurve::default());
/// for _ in 0..10 {
///     stats.record_cleared_line();
/// }
///
/// assert_eq!(stats.score(), 1000);
/// assert_eq!(stats.lines(), 10);
/// assert_eq!(stats.gravity_interval(), 50);
/// ```
#[derive(Debug, Clone)]
pub struct GameStats {
    curve: GravityCurve,
    score: u64,
    lines: u64,
    gravity_interval: u32,
    settled_pieces: u64,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new(GravityCurve::default())
    }
}

impl GameStats {
    #[must_use]
    pub const fn new(curve: GravityCurve) -> Self {
        Self {
            curve,
            score: 0,
            lines: 0,
            gravity_interval: curve.initial_interval,
            settled_pieces: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub const fn lines(&self) -> u64 {
        self.lines
    }

    /// Ticks between auto-descends.
    #[must_use]
    pub const fn gravity_interval(&self) -> u32 {
        self.gravity_interval
    }

    #[must_use]
    pub const fn settled_pieces(&self) -> u64 {
        self.settled_pieces
    }

    #[must_use]
    pub const fn curve(&self) -> &GravityCurve {
        &self.curve
    }

    /// Counter passed to piece drops so each descended row scores a point.
    pub const fn score_counter_mut(&mut self) -> &mut u64 {
        &mut self.score
    }

    pub const fn record_settled_piece(&mut self) {
        self.settled_pieces += 1;
    }

    /// Scores one cleared line.
    ///
    /// Returns `true` if this line triggered a speed-up.
    pub fn record_cleared_line(&mut self) -> bool {
        self.score += LINE_CLEAR_SCORE;
        self.lines += 1;
        if self.lines % self.curve.lines_per_speedup == 0
            && self.gravity_interval > self.curve.min_interval
        {
            self.gravity_interval = self
                .gravity_interval
                .saturating_sub(self.curve.step)
                .max(self.curve.min_interval);
            log::info!(
                "speed up after {} lines: gravity interval {} ticks",
                self.lines,
                self.gravity_interval
            );
            return true;
        }
        false
    }

    /// Zeroes the counters and restores the initial gravity.
    pub fn reset(&mut self) {
        *self = Self::new(self.curve);
    }
}
