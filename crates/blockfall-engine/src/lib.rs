pub use self::{config::*, core::*, engine::*, render::*};

pub mod config;
pub mod core;
pub mod engine;
pub mod render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum HoldError {
    #[display("hold already used for this piece")]
    AlreadyUsed,
    #[display("cannot hold after game over")]
    GameOver,
}

#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum ConfigError {
    #[display("board width {width} is below the minimum of {min}")]
    BoardTooNarrow { width: usize, min: usize },
    #[display("board height {height} is below the minimum of {min}")]
    BoardTooShort { height: usize, min: usize },
    #[display(
        "invalid gravity: initial interval {initial}, minimum interval {min}, {lines_per_speedup} lines per speed-up"
    )]
    InvalidGravity {
        initial: u32,
        min: u32,
        lines_per_speedup: u64,
    },
    #[display("repeat interval must be at least one tick")]
    InvalidRepeatInterval,
    #[display("tick rate must be positive")]
    InvalidTickRate,
    #[display("preview length {len} is outside 1..={max}")]
    InvalidPreviewLength { len: usize, max: usize },
    #[display("a piece batch must hold at least one permutation")]
    EmptyBatch,
    #[display("queue low-water mark {low_water} is below the preview length {preview_len}")]
    LowWaterBelowPreview { low_water: usize, preview_len: usize },
}
