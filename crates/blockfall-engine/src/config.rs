use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, GravityCurve, PieceSeed,
    engine::{DEFAULT_LOW_WATER, DEFAULT_PERMUTATIONS_PER_BATCH},
};

/// Narrowest board on which a 4×4 box can be centered by the spawn rule.
pub const MIN_BOARD_WIDTH: usize = 6;

/// Shortest board that fits a 4×4 spawn box.
pub const MIN_BOARD_HEIGHT: usize = 4;

/// Upper bound of the lookahead preview.
pub const MAX_PREVIEW_LEN: usize = 3;

/// Tunable parameters of a [`GameSession`](crate::GameSession).
///
/// Missing fields take their defaults when deserializing, so a config file
/// only needs to mention what it changes:
///
/// ```
/// use blockfall_engine::SessionConfig;
///
/// let config: SessionConfig = serde_json::from_str(r#"{ "board_width": 12 }"#).unwrap();
/// assert_eq!(config.board_width, 12);
/// assert_eq!(config.board_height, 20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub board_width: usize,
    pub board_height: usize,
    /// Ticks between auto-descends at the start of a game.
    pub initial_gravity_interval: u32,
    pub min_gravity_interval: u32,
    pub gravity_step: u32,
    pub lines_per_speedup: u64,
    /// Ticks between repeated lateral moves or soft drops while a key is held.
    pub repeat_interval: u32,
    /// Fixed logic ticks per second.
    pub tick_rate: u32,
    /// Number of upcoming pieces shown next to the board.
    pub preview_len: usize,
    pub queue_low_water: usize,
    pub permutations_per_batch: usize,
    /// Piece sequence seed; a random one is drawn when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<PieceSeed>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let curve = GravityCurve::default();
        Self {
            board_width: 10,
            board_height: 20,
            initial_gravity_interval: curve.initial_interval,
            min_gravity_interval: curve.min_interval,
            gravity_step: curve.step,
            lines_per_speedup: curve.lines_per_speedup,
            repeat_interval: 5,
            tick_rate: 60,
            preview_len: MAX_PREVIEW_LEN,
            queue_low_water: DEFAULT_LOW_WATER,
            permutations_per_batch: DEFAULT_PERMUTATIONS_PER_BATCH,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Checks that a session can be built from this config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_width < MIN_BOARD_WIDTH {
            return Err(ConfigError::BoardTooNarrow {
                width: self.board_width,
                min: MIN_BOARD_WIDTH,
            });
        }
        if self.board_height < MIN_BOARD_HEIGHT {
            return Err(ConfigError::BoardTooShort {
                height: self.board_height,
                min: MIN_BOARD_HEIGHT,
            });
        }
        if self.min_gravity_interval == 0
            || self.min_gravity_interval > self.initial_gravity_interval
            || self.lines_per_speedup == 0
        {
            return Err(ConfigError::InvalidGravity {
                initial: self.initial_gravity_interval,
                min: self.min_gravity_interval,
                lines_per_speedup: self.lines_per_speedup,
            });
        }
        if self.repeat_interval == 0 {
            return Err(ConfigError::InvalidRepeatInterval);
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::InvalidTickRate);
        }
        if !(1..=MAX_PREVIEW_LEN).contains(&self.preview_len) {
            return Err(ConfigError::InvalidPreviewLength {
                len: self.preview_len,
                max: MAX_PREVIEW_LEN,
            });
        }
        if self.permutations_per_batch == 0 {
            return Err(ConfigError::EmptyBatch);
        }
        if self.queue_low_water < self.preview_len {
            return Err(ConfigError::LowWaterBelowPreview {
                low_water: self.queue_low_water,
                preview_len: self.preview_len,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn gravity_curve(&self) -> GravityCurve {
        GravityCurve {
            initial_interval: self.initial_gravity_interval,
            min_interval: self.min_gravity_interval,
            step: self.gravity_step,
            lines_per_speedup: self.lines_per_speedup,
        }
    }
}
