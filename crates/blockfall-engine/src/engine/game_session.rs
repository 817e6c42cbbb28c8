use std::time::Duration;

use arrayvec::ArrayVec;

use crate::{
    ConfigError, HoldError, SessionConfig, TextChanges,
    config::MAX_PREVIEW_LEN,
    core::{
        board::Board,
        piece::{Direction, Piece, PieceKind},
    },
};

use super::{GameStats, PieceQueue};

/// Width of the preview board and side length of each preview slot.
pub const PREVIEW_SLOT_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Running,
    GameOver,
}

/// Whether a held key went down or came back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Player input, sampled by the front-end once per frame.
///
/// Lateral moves and soft drop are level-triggered: a press sets a held flag
/// that [`GameSession::tick`] acts on every `repeat_interval` ticks, and a
/// release clears it. The rest are edge-triggered and act immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Rotate,
    MoveLeft(KeyState),
    MoveRight(KeyState),
    SoftDrop(KeyState),
    HardDrop,
    Hold,
    /// Starts a new game; ignored unless the game is over.
    Reset,
}

/// Movement keys currently held down.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeldKeys {
    pub left: bool,
    pub right: bool,
    pub down: bool,
}

impl HeldKeys {
    #[must_use]
    pub const fn any(self) -> bool {
        self.left || self.right || self.down
    }
}

/// The set-aside piece together with the small board it is drawn on.
#[derive(Debug, Clone)]
pub struct Stash {
    board: Board,
    piece: Piece,
}

impl Stash {
    fn new(kind: PieceKind) -> Self {
        let dimension = kind.box_dimension();
        let mut board = Board::new(dimension, dimension);
        let piece = Piece::new(&mut board, 0..kind.box_size(), kind);
        Self { board, piece }
    }

    /// Re-creates the stash board for `kind` and moves the piece onto it.
    fn replace(&mut self, kind: PieceKind) -> PieceKind {
        let previous = self.piece.kind();
        let dimension = kind.box_dimension();
        self.board.initialize(dimension, dimension);
        self.piece
            .initialize(&mut self.board, 0..kind.box_size(), kind);
        previous
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.piece.kind()
    }
}

/// Label values last handed to the front-end.
#[derive(Debug, Clone, Copy)]
struct ReportedText {
    score: u64,
    lines: u64,
    game_over: bool,
    stale: bool,
}

/// A running game: board, falling piece, stash, preview, queue and counters.
///
/// The session is driven by two entry points. [`Self::apply`] feeds player
/// intents, and [`Self::tick`] advances the fixed-rate game logic by one step
/// (gravity, key repeat, settling). Everything else is read access for the
/// presentation pass.
///
/// # Example
///
/// ```
/// use blockfall_engine::{GameSession, Intent, KeyState, SessionConfig};
///
/// let mut session = GameSession::new(SessionConfig::default())?;
///
/// session.apply(Intent::MoveLeft(KeyState::Pressed));
/// session.tick();
/// session.apply(Intent::MoveLeft(KeyState::Released));
///
/// session.apply(Intent::HardDrop);
/// assert_eq!(session.stats().settled_pieces(), 1);
/// assert!(session.state().is_running());
/// # Ok::<(), blockfall_engine::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    config: SessionConfig,
    board: Board,
    falling: Piece,
    stash: Option<Stash>,
    unstash_possible: bool,
    preview_board: Board,
    preview: ArrayVec<Piece, MAX_PREVIEW_LEN>,
    queue: PieceQueue,
    stats: GameStats,
    state: SessionState,
    ticks: u64,
    moving_ticks: u32,
    held: HeldKeys,
    reported: ReportedText,
}

/// Board indices of a `kind` box centered on the top rows of a `width`-wide board.
fn spawn_box(width: usize, kind: PieceKind) -> impl Iterator<Item = usize> {
    let dimension = kind.box_dimension();
    let left = width / 2 - dimension / 2 - 1;
    (0..kind.box_size()).map(move |i| (i / dimension) * width + left + i % dimension)
}

/// Board indices of preview slot `slot`; 3×3 boxes skip the slot's last column.
fn preview_slot_box(slot: usize, kind: PieceKind) -> impl Iterator<Item = usize> {
    let dimension = kind.box_dimension();
    let start = slot * PREVIEW_SLOT_SIZE * PREVIEW_SLOT_SIZE;
    (0..kind.box_size()).map(move |i| start + (i / dimension) * PREVIEW_SLOT_SIZE + i % dimension)
}

impl GameSession {
    /// Starts a game with the first piece already falling.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut queue = match config.seed {
            Some(seed) => {
                PieceQueue::with_seed(seed, config.queue_low_water, config.permutations_per_batch)
            }
            None => PieceQueue::new(config.queue_low_water, config.permutations_per_batch),
        };
        let mut board = Board::new(config.board_width, config.board_height);
        let kind = queue.pop_front();
        queue.refill_if_low();
        let width = board.width();
        let falling = Piece::new(&mut board, spawn_box(width, kind), kind);
        log::debug!("spawned {kind:?}");

        let preview_board = Board::new(PREVIEW_SLOT_SIZE, PREVIEW_SLOT_SIZE * config.preview_len);

        let mut this = Self {
            stats: GameStats::new(config.gravity_curve()),
            config,
            board,
            falling,
            stash: None,
            unstash_possible: false,
            preview_board,
            preview: ArrayVec::new(),
            queue,
            state: SessionState::Running,
            ticks: 0,
            moving_ticks: 0,
            held: HeldKeys::default(),
            reported: ReportedText {
                score: 0,
                lines: 0,
                game_over: false,
                stale: true,
            },
        };
        this.refresh_preview();
        Ok(this)
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> &Piece {
        &self.falling
    }

    #[must_use]
    pub fn stash(&self) -> Option<&Stash> {
        self.stash.as_ref()
    }

    /// Whether hold would swap the stashed piece back in.
    #[must_use]
    pub fn can_unstash(&self) -> bool {
        self.unstash_possible
    }

    #[must_use]
    pub fn preview_board(&self) -> &Board {
        &self.preview_board
    }

    /// Upcoming pieces, bound to [`Self::preview_board`].
    #[must_use]
    pub fn preview(&self) -> &[Piece] {
        &self.preview
    }

    #[must_use]
    pub fn queue(&self) -> &PieceQueue {
        &self.queue
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of ticks processed since the game started.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn held_keys(&self) -> HeldKeys {
        self.held
    }

    /// Play time implied by the tick count and the configured tick rate.
    #[must_use]
    pub fn duration(&self) -> Duration {
        let rate = u64::from(self.config.tick_rate);
        let secs = self.ticks / rate;
        let nanos = (self.ticks % rate) * 1_000_000_000 / rate;
        Duration::new(secs, u32::try_from(nanos).unwrap_or(0))
    }

    /// Reports which labels changed since the previous call.
    pub fn take_text_changes(&mut self) -> TextChanges {
        let game_over = self.state.is_game_over();
        let changes = if self.reported.stale {
            TextChanges::ALL
        } else {
            TextChanges {
                score: self.stats.score() != self.reported.score,
                lines: self.stats.lines() != self.reported.lines,
                game_over: game_over != self.reported.game_over,
            }
        };
        self.reported = ReportedText {
            score: self.stats.score(),
            lines: self.stats.lines(),
            game_over,
            stale: false,
        };
        changes
    }

    /// Applies one player intent.
    ///
    /// While the game is over only [`Intent::Reset`] has an effect.
    pub fn apply(&mut self, intent: Intent) {
        if self.state.is_game_over() {
            if intent == Intent::Reset {
                self.reset();
            }
            return;
        }

        match intent {
            Intent::Rotate => {
                self.falling.rotate(&self.board, 90);
            }
            Intent::MoveLeft(key) => self.set_held(key, |held| &mut held.left),
            Intent::MoveRight(key) => self.set_held(key, |held| &mut held.right),
            Intent::SoftDrop(key) => self.set_held(key, |held| &mut held.down),
            Intent::HardDrop => self.settle_sequence(true),
            Intent::Hold => {
                _ = self.try_hold();
            }
            Intent::Reset => {}
        }
    }

    fn set_held(&mut self, key: KeyState, flag: impl FnOnce(&mut HeldKeys) -> &mut bool) {
        *flag(&mut self.held) = key.is_pressed();
        if key.is_released() {
            self.moving_ticks = 0;
        }
    }

    /// Advances the game logic by one fixed step.
    pub fn tick(&mut self) {
        if self.state.is_game_over() {
            return;
        }
        self.ticks += 1;

        let gravity = u64::from(self.stats.gravity_interval());
        if self.ticks.is_multiple_of(gravity)
            && !self.held.down
            && self.falling.descend(&mut self.board, None).is_settled()
        {
            self.settle_sequence(false);
        }

        if self.state.is_running() && self.held.any() {
            if self.moving_ticks.is_multiple_of(self.config.repeat_interval) {
                if self.held.left {
                    self.falling.move_sideways(&mut self.board, Direction::Left);
                } else if self.held.right {
                    self.falling.move_sideways(&mut self.board, Direction::Right);
                }
                if self.held.down
                    && self
                        .falling
                        .descend(&mut self.board, Some(self.stats.score_counter_mut()))
                        .is_settled()
                {
                    self.settle_sequence(false);
                }
            }
            self.moving_ticks = self.moving_ticks.wrapping_add(1);
        }
    }

    /// Holds the falling piece, swapping in the stashed one if there is one.
    ///
    /// The first hold stashes the falling piece and spawns the next queued one.
    /// Later holds swap the falling and stashed pieces without touching the
    /// queue. Only one hold is allowed per falling piece: after a hold, the
    /// next one becomes possible once the falling piece settles.
    pub fn try_hold(&mut self) -> Result<(), HoldError> {
        if self.state.is_game_over() {
            return Err(HoldError::GameOver);
        }
        if self.stash.is_some() && !self.unstash_possible {
            return Err(HoldError::AlreadyUsed);
        }

        let falling_kind = self.falling.kind();
        self.falling.erase(&mut self.board);
        self.unstash_possible = false;
        if let Some(stash) = &mut self.stash {
            let stashed_kind = stash.replace(falling_kind);
            log::debug!("unstashed {stashed_kind:?}, stashed {falling_kind:?}");
            self.spawn(stashed_kind);
        } else {
            self.stash = Some(Stash::new(falling_kind));
            log::debug!("stashed {falling_kind:?}");
            self.spawn_next();
            self.refresh_preview();
        }
        Ok(())
    }

    /// Settles the falling piece and moves the game on to the next one.
    ///
    /// Clears filled lines, collapses the rows above, spawns the next queued
    /// piece, re-enables unstashing and refreshes the preview. With
    /// `score_drop`, every row the piece falls while settling scores a point.
    fn settle_sequence(&mut self, score_drop: bool) {
        let score = if score_drop {
            Some(self.stats.score_counter_mut())
        } else {
            None
        };
        self.falling.settle(&mut self.board, score);
        self.stats.record_settled_piece();

        let cleared = self.board.clear_filled_lines();
        if cleared > 0 {
            for _ in 0..cleared {
                self.stats.record_cleared_line();
            }
            log::info!(
                "cleared {cleared} line(s), total {} lines, score {}",
                self.stats.lines(),
                self.stats.score()
            );
        }
        self.board.collapse_unfilled_lines();

        self.spawn_next();
        self.unstash_possible = self.stash.is_some();
        self.refresh_preview();
    }

    fn spawn_next(&mut self) {
        let kind = self.queue.pop_front();
        self.queue.refill_if_low();
        self.spawn(kind);
    }

    /// Binds the falling piece to a fresh spawn box and checks for top-out.
    fn spawn(&mut self, kind: PieceKind) {
        let width = self.board.width();
        self.falling
            .initialize(&mut self.board, spawn_box(width, kind), kind);
        log::debug!("spawned {kind:?}");

        let top_row = &self.falling.bounding_box()[..kind.box_dimension()];
        if top_row.iter().any(|&index| self.board.is_occupied(index)) {
            self.state = SessionState::GameOver;
            self.held = HeldKeys::default();
            log::info!(
                "game over: score {}, lines {}, pieces {}",
                self.stats.score(),
                self.stats.lines(),
                self.stats.settled_pieces()
            );
        }
    }

    /// Re-binds the preview pieces to the front of the queue.
    ///
    /// Slots beyond the queue's length are dropped.
    fn refresh_preview(&mut self) {
        self.preview_board.clear();
        let kinds = self.queue.upcoming().take(self.config.preview_len);
        let mut bound = 0;
        for (slot, kind) in kinds.enumerate() {
            let bounding_box = preview_slot_box(slot, kind);
            if let Some(piece) = self.preview.get_mut(slot) {
                piece.initialize(&mut self.preview_board, bounding_box, kind);
            } else {
                self.preview
                    .push(Piece::new(&mut self.preview_board, bounding_box, kind));
            }
            bound = slot + 1;
        }
        self.preview.truncate(bound);
    }

    /// Starts a new game in place, keeping the configuration.
    fn reset(&mut self) {
        self.board.initialize(self.config.board_width, self.config.board_height);
        self.stash = None;
        self.unstash_possible = false;
        self.queue.reset();
        self.stats.reset();
        self.state = SessionState::Running;
        self.ticks = 0;
        self.moving_ticks = 0;
        self.held = HeldKeys::default();
        self.reported.stale = true;

        self.spawn_next();
        self.refresh_preview();
        log::info!("session reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, PieceSeed};

    fn config() -> SessionConfig {
        SessionConfig {
            seed: Some(PieceSeed::from_bytes([
                0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55,
                0x66, 0x77, 0x88,
            ])),
            ..SessionConfig::default()
        }
    }

    fn session() -> GameSession {
        GameSession::new(config()).unwrap()
    }

    /// Replaces the falling piece with a fresh `kind` at the spawn position.
    fn force_falling(session: &mut GameSession, kind: PieceKind) {
        session.falling.erase(&mut session.board);
        let width = session.board.width();
        session
            .falling
            .initialize(&mut session.board, spawn_box(width, kind), kind);
    }

    fn rows_of(blocks: [usize; 4], width: usize) -> Vec<usize> {
        blocks.iter().map(|index| index / width).collect()
    }

    #[test]
    fn test_spawn_box_is_centered() {
        let t: Vec<usize> = spawn_box(10, PieceKind::T).collect();
        assert_eq!(t, [3, 4, 5, 13, 14, 15, 23, 24, 25]);

        let i: Vec<usize> = spawn_box(10, PieceKind::I).collect();
        assert_eq!(&i[..4], &[2, 3, 4, 5]);
        assert_eq!(i[15], 35);

        let narrow: Vec<usize> = spawn_box(6, PieceKind::O).collect();
        assert_eq!(narrow[0], 0);
    }

    #[test]
    fn test_preview_slot_skips_fourth_column_for_small_boxes() {
        let t: Vec<usize> = preview_slot_box(1, PieceKind::T).collect();
        assert_eq!(t, [16, 17, 18, 20, 21, 22, 24, 25, 26]);

        let i: Vec<usize> = preview_slot_box(2, PieceKind::I).collect();
        assert_eq!(i, (32..48).collect::<Vec<_>>());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SessionConfig {
            board_width: 4,
            ..config()
        };
        assert!(GameSession::new(config).unwrap_err().is_board_too_narrow());
    }

    #[test]
    fn test_new_session_state() {
        let session = session();

        assert!(session.state().is_running());
        assert_eq!(session.board().occupied_count(), 0);
        assert!(session.stash().is_none());
        assert_eq!(session.preview().len(), 3);

        let upcoming: Vec<PieceKind> = session.queue().upcoming().take(3).collect();
        let previewed: Vec<PieceKind> = session.preview().iter().map(Piece::kind).collect();
        assert_eq!(previewed, upcoming);
    }

    #[test]
    fn test_gravity_descends_every_interval() {
        let mut session = session();
        let before = session.falling_piece().blocks();

        for _ in 0..59 {
            session.tick();
        }
        assert_eq!(session.falling_piece().blocks(), before);

        session.tick();
        assert_eq!(session.falling_piece().blocks(), before.map(|i| i + 10));
        assert_eq!(session.stats().score(), 0);
    }

    #[test]
    fn test_soft_drop_repeats_and_suppresses_gravity() {
        let mut session = session();
        force_falling(&mut session, PieceKind::T);
        let before = session.falling_piece().blocks();

        session.apply(Intent::SoftDrop(KeyState::Pressed));
        for _ in 0..60 {
            session.tick();
        }

        // Repeat fires on moving ticks 0, 5, ..., 55; gravity at tick 60 is skipped.
        assert_eq!(session.falling_piece().blocks(), before.map(|i| i + 120));
        assert_eq!(session.stats().score(), 12);
    }

    #[test]
    fn test_lateral_move_repeat_and_release() {
        let mut session = session();
        force_falling(&mut session, PieceKind::O);
        let before = session.falling_piece().blocks();

        session.apply(Intent::MoveLeft(KeyState::Pressed));
        session.tick();
        assert_eq!(session.falling_piece().blocks(), before.map(|i| i - 1));

        for _ in 0..4 {
            session.tick();
        }
        assert_eq!(session.falling_piece().blocks(), before.map(|i| i - 1));

        session.tick();
        assert_eq!(session.falling_piece().blocks(), before.map(|i| i - 2));

        session.apply(Intent::MoveLeft(KeyState::Released));
        assert!(!session.held_keys().any());
        session.tick();
        assert_eq!(session.falling_piece().blocks(), before.map(|i| i - 2));

        // Repeat counter restarts from zero on the next press.
        session.apply(Intent::MoveRight(KeyState::Pressed));
        session.tick();
        assert_eq!(session.falling_piece().blocks(), before.map(|i| i - 1));
    }

    #[test]
    fn test_left_wins_over_right() {
        let mut session = session();
        force_falling(&mut session, PieceKind::O);
        let before = session.falling_piece().blocks();

        session.apply(Intent::MoveRight(KeyState::Pressed));
        session.apply(Intent::MoveLeft(KeyState::Pressed));
        session.tick();

        assert_eq!(session.falling_piece().blocks(), before.map(|i| i - 1));
    }

    #[test]
    fn test_rotate_intent() {
        let mut session = session();
        force_falling(&mut session, PieceKind::T);

        session.apply(Intent::Rotate);

        assert_eq!(session.falling_piece().rotation().degrees(), 90);
    }

    #[test]
    fn test_hard_drop_scores_rows_and_spawns_next() {
        let mut session = session();
        force_falling(&mut session, PieceKind::O);
        let next = session.queue().front();

        session.apply(Intent::HardDrop);

        // O occupies rows 0-1 of its box and lands on rows 18-19.
        assert_eq!(session.stats().score(), 18);
        assert_eq!(session.board().occupied_count(), 4);
        assert_eq!(Some(session.falling_piece().kind()), next);
        assert!(!session.falling_piece().is_settled());
        assert_eq!(session.stats().settled_pieces(), 1);
    }

    #[test]
    fn test_gravity_settle_runs_settle_sequence() {
        let mut session = session();
        force_falling(&mut session, PieceKind::O);
        let next = session.queue().front();

        // 18 descents reach the floor, the 19th settles.
        for _ in 0..19 * 60 {
            session.tick();
        }

        assert_eq!(session.board().occupied_count(), 4);
        assert_eq!(Some(session.falling_piece().kind()), next);
        assert_eq!(session.stats().score(), 0);
        let rows = rows_of(session.falling_piece().blocks(), 10);
        assert!(rows.iter().all(|&row| row <= 1), "{rows:?}");
    }

    #[test]
    fn test_line_clear_scores_and_collapses() {
        let mut session = session();
        for col in [0, 1, 6, 7, 8, 9] {
            let index = session.board.cell_index(19, col);
            session.board.occupy(index, Color::WHITE);
        }
        let index = session.board.cell_index(18, 0);
        session.board.occupy(index, Color::WHITE);
        force_falling(&mut session, PieceKind::I);

        session.apply(Intent::HardDrop);

        assert_eq!(session.stats().lines(), 1);
        assert_eq!(session.stats().score(), 19 + 100);
        assert_eq!(session.board().occupied_count(), 1);
        assert!(session.board().is_occupied(session.board().cell_index(19, 0)));

        let changes = session.take_text_changes();
        assert!(changes.score && changes.lines && changes.game_over);
        let changes = session.take_text_changes();
        assert!(!changes.any());
    }

    #[test]
    fn test_hold_with_empty_stash_then_again() {
        let mut session = session();
        let falling = session.falling_piece().kind();
        let next = session.queue().front();

        assert_eq!(session.try_hold(), Ok(()));

        assert_eq!(session.stash().map(Stash::kind), Some(falling));
        assert_eq!(Some(session.falling_piece().kind()), next);
        assert!(!session.can_unstash());

        let snapshot_kind = session.falling_piece().kind();
        let snapshot_front = session.queue().front();
        assert_eq!(session.try_hold(), Err(HoldError::AlreadyUsed));
        assert_eq!(session.falling_piece().kind(), snapshot_kind);
        assert_eq!(session.queue().front(), snapshot_front);
        assert_eq!(session.stash().map(Stash::kind), Some(falling));
    }

    #[test]
    fn test_unstash_after_settle_swaps_without_queue() {
        let mut session = session();
        let first = session.falling_piece().kind();
        session.try_hold().unwrap();
        session.apply(Intent::HardDrop);
        assert!(session.can_unstash());

        let falling = session.falling_piece().kind();
        let front = session.queue().front();
        let queue_len = session.queue().len();
        session.try_hold().unwrap();

        assert_eq!(session.falling_piece().kind(), first);
        assert_eq!(session.stash().map(Stash::kind), Some(falling));
        assert_eq!(session.queue().front(), front);
        assert_eq!(session.queue().len(), queue_len);
        assert!(!session.can_unstash());

        let stash = session.stash().unwrap();
        let dimension = falling.box_dimension();
        assert_eq!(stash.board().width(), dimension);
        assert_eq!(stash.board().height(), dimension);
    }

    #[test]
    fn test_hold_erases_old_paint() {
        let mut session = session();
        force_falling(&mut session, PieceKind::Z);
        let old_blocks = session.falling_piece().blocks();

        session.try_hold().unwrap();

        let new_blocks = session.falling_piece().blocks();
        for index in old_blocks {
            if !new_blocks.contains(&index) {
                assert_eq!(session.board().cell(index).color(), Color::BLACK);
            }
        }
    }

    fn play_until_game_over(session: &mut GameSession) {
        // Every piece spawns inside columns 2-5, so no line can ever clear.
        for _ in 0..100 {
            if session.state().is_game_over() {
                return;
            }
            session.apply(Intent::HardDrop);
        }
        panic!("stack never reached the top");
    }

    #[test]
    fn test_game_over_ignores_input_until_reset() {
        let mut session = session();
        session.take_text_changes();
        play_until_game_over(&mut session);

        assert!(session.take_text_changes().game_over);
        let board = session.board().clone();
        let ticks = session.ticks();

        session.apply(Intent::HardDrop);
        session.apply(Intent::MoveLeft(KeyState::Pressed));
        session.tick();
        assert_eq!(session.try_hold(), Err(HoldError::GameOver));
        assert_eq!(session.board(), &board);
        assert_eq!(session.ticks(), ticks);
        assert!(!session.held_keys().any());

        session.apply(Intent::Reset);

        assert!(session.state().is_running());
        assert_eq!(session.board().occupied_count(), 0);
        assert_eq!(session.stats().score(), 0);
        assert_eq!(session.stats().lines(), 0);
        assert_eq!(session.stats().gravity_interval(), 60);
        assert!(session.stash().is_none());
        assert_eq!(session.take_text_changes(), TextChanges::ALL);
    }

    #[test]
    fn test_reset_is_ignored_while_running() {
        let mut session = session();
        session.apply(Intent::HardDrop);
        let score = session.stats().score();

        session.apply(Intent::Reset);

        assert_eq!(session.stats().score(), score);
        assert_eq!(session.board().occupied_count(), 4);
    }

    #[test]
    fn test_preview_follows_queue_after_settle() {
        let mut session = session();
        session.apply(Intent::HardDrop);

        let upcoming: Vec<PieceKind> = session.queue().upcoming().take(3).collect();
        let previewed: Vec<PieceKind> = session.preview().iter().map(Piece::kind).collect();
        assert_eq!(previewed, upcoming);
        for (slot, piece) in session.preview().iter().enumerate() {
            let first = piece.bounding_box()[0];
            assert_eq!(first, slot * 16);
        }
    }

    #[test]
    fn test_new_rejects_low_water_below_preview() {
        let config = SessionConfig {
            queue_low_water: 0,
            permutations_per_batch: 1,
            ..config()
        };
        assert!(GameSession::new(config).unwrap_err().is_low_water_below_preview());
    }

    #[test]
    fn test_preview_shrinks_with_short_queue() {
        let mut session = session();
        let seed = PieceSeed::from_bytes([7; 16]);
        session.queue = PieceQueue::with_seed(seed, 0, 1);
        session.refresh_preview();

        for _ in 0..7 {
            session.apply(Intent::HardDrop);
            if session.state().is_game_over() {
                break;
            }
            let upcoming: Vec<PieceKind> = session
                .queue()
                .upcoming()
                .take(session.config().preview_len)
                .collect();
            let previewed: Vec<PieceKind> = session.preview().iter().map(Piece::kind).collect();
            assert_eq!(previewed, upcoming);
            let painted = session
                .preview_board()
                .cells()
                .iter()
                .filter(|cell| cell.color() != Color::BLACK)
                .count();
            assert_eq!(painted, 4 * previewed.len());
        }
    }

    #[test]
    fn test_duration_from_ticks() {
        let mut session = session();
        for _ in 0..90 {
            session.tick();
        }
        assert_eq!(session.duration(), Duration::from_millis(1500));
    }
}
