//! Presentation contracts between the engine and a front-end.
//!
//! The engine never draws pixels or owns a window. It describes a frame through
//! the [`Renderer`] trait in board-cell coordinates, one [`Panel`] viewport at a
//! time, so each panel is drawn from its own origin without translation in the
//! engine. Labels go through [`TextFactory`]; the session reports which labels
//! went stale via [`TextChanges`].
//!
//! [`render_session`] is the read-only pass that turns a
//! [`GameSession`](crate::GameSession) into renderer calls.

use crate::{Board, Color, GameSession};

/// Independent drawing areas of the game screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum Panel {
    /// Side panel with the stash box and the score/lines labels.
    Stash,
    /// The main playfield.
    Board,
    /// Lookahead preview of the upcoming pieces.
    Queue,
}

/// A cell corner, in cell units relative to the current viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPoint {
    pub x: usize,
    pub y: usize,
}

impl CellPoint {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A rectangle of whole cells, relative to the current viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl CellRect {
    /// The single cell at (`x`, `y`).
    #[must_use]
    pub const fn unit(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            width: 1,
            height: 1,
        }
    }
}

/// Drawing primitives a front-end provides.
pub trait Renderer {
    /// Selects the panel subsequent calls draw into.
    fn set_viewport(&mut self, panel: Panel);

    fn fill_rect(&mut self, rect: CellRect, color: Color);

    /// Draws the outline of `rect`, inset so it stays inside the cells.
    fn draw_rect_outline(&mut self, rect: CellRect, color: Color);

    /// Draws a line along cell borders from `from` to `to`.
    fn draw_line(&mut self, from: CellPoint, to: CellPoint, color: Color);
}

/// Size of a piece of rendered text, in the front-end's units.
pub trait TextSize {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
}

/// Turns text into something drawable.
pub trait TextFactory {
    type Text: TextSize;

    fn create_text(&mut self, text: &str, color: Color) -> Self::Text;
}

/// Which labels changed since the front-end last regenerated them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TextChanges {
    pub score: bool,
    pub lines: bool,
    pub game_over: bool,
}

impl TextChanges {
    /// Every label stale; used for the first frame and after a reset.
    pub const ALL: Self = Self {
        score: true,
        lines: true,
        game_over: true,
    };

    #[must_use]
    pub const fn any(self) -> bool {
        self.score || self.lines || self.game_over
    }
}

pub const LABEL_COLOR: Color = Color::WHITE;
pub const GAME_OVER_COLOR: Color = Color::rgb(0xff, 0x00, 0x00);
pub const GAME_OVER_TEXT: &str = "Game Over! Press 'r' to reset.";
pub const STASH_TITLE: &str = "Stash";
pub const QUEUE_TITLE: &str = "Next";

#[must_use]
pub fn score_text(score: u64) -> String {
    format!("Score: {score}")
}

#[must_use]
pub fn lines_text(lines: u64) -> String {
    format!("Lines: {lines}")
}

/// Fills every occupied cell of `board` with its color.
pub fn render_board_cells<R>(board: &Board, renderer: &mut R)
where
    R: Renderer + ?Sized,
{
    for (index, cell) in board.cells().iter().enumerate() {
        if cell.is_occupied() {
            let (row, col) = board.row_col(index);
            renderer.fill_rect(CellRect::unit(col, row), cell.color());
        }
    }
}

/// Draws the interior grid lines of a `width` × `height` cell area.
pub fn render_grid_lines<R>(width: usize, height: usize, renderer: &mut R)
where
    R: Renderer + ?Sized,
{
    for x in 1..width {
        renderer.draw_line(CellPoint::new(x, 0), CellPoint::new(x, height), Color::GRID);
    }
    for y in 1..height {
        renderer.draw_line(CellPoint::new(0, y), CellPoint::new(width, y), Color::GRID);
    }
}

/// Draws the whole session: the three panels with their cells, pieces and grids.
///
/// The falling piece is drawn with its ghost outline. Stashed and previewed
/// pieces are drawn without one.
pub fn render_session<R>(session: &GameSession, renderer: &mut R)
where
    R: Renderer + ?Sized,
{
    renderer.set_viewport(Panel::Board);
    let board = session.board();
    render_board_cells(board, renderer);
    if session.state().is_running() {
        session.falling_piece().render(board, renderer);
    }
    render_grid_lines(board.width(), board.height(), renderer);

    renderer.set_viewport(Panel::Stash);
    if let Some(stash) = session.stash() {
        render_board_cells(stash.board(), renderer);
        stash.piece().render_blocks(stash.board(), renderer);
        render_grid_lines(stash.board().width(), stash.board().height(), renderer);
    }

    renderer.set_viewport(Panel::Queue);
    let preview_board = session.preview_board();
    render_board_cells(preview_board, renderer);
    for piece in session.preview() {
        piece.render_blocks(preview_board, renderer);
    }
    render_grid_lines(preview_board.width(), preview_board.height(), renderer);
}
