//! Game rules and state management on top of the core data structures.
//!
//! - [`GameSession`] - A running game: falling piece, stash, preview, intents and ticks
//! - [`GameStats`] - Score, cleared lines and the gravity speed-up curve
//! - [`PieceQueue`] - Lookahead queue fed by shuffled 7-piece permutations
//! - [`PieceSeed`] - Seed for deterministic piece generation
//! - [`FixedTimestep`] - Turns wall time into fixed-rate ticks
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`] from a [`SessionConfig`](crate::SessionConfig)
//! 2. Each frame, feed player [`Intent`]s and run one [`GameSession::tick`] per
//!    tick released by the [`FixedTimestep`]
//! 3. Gravity and held keys move the piece; a piece that cannot descend settles
//! 4. Filled lines clear, the rows above collapse, and the next piece spawns
//! 5. The game is over when a spawned piece's top row overlaps the stack;
//!    [`Intent::Reset`] starts over

pub use self::{game_session::*, game_stats::*, piece_queue::*, timestep::*};

mod game_session;
mod game_stats;
mod piece_queue;
mod timestep;
