use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::board::{Board, Color};
use crate::render::{CellRect, Renderer};

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// J-piece.
    J = 1,
    /// L-piece.
    L = 2,
    /// O-piece.
    O = 3,
    /// S-piece.
    S = 4,
    /// Z-piece.
    Z = 5,
    /// T-piece.
    T = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::T,
    ];

    /// Side length of the square bounding box: 4 for I and O, 3 otherwise.
    #[must_use]
    pub const fn box_dimension(self) -> usize {
        match self {
            PieceKind::I | PieceKind::O => 4,
            _ => 3,
        }
    }

    /// Number of cells in the bounding box.
    #[must_use]
    pub const fn box_size(self) -> usize {
        self.box_dimension() * self.box_dimension()
    }

    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            PieceKind::I => Color::rgb(0x00, 0xff, 0xff),
            PieceKind::J => Color::rgb(0x00, 0x00, 0xff),
            PieceKind::L => Color::rgb(0xff, 0xaa, 0x00),
            PieceKind::O => Color::rgb(0xff, 0xff, 0x00),
            PieceKind::S => Color::rgb(0x00, 0xff, 0x00),
            PieceKind::Z => Color::rgb(0xff, 0x00, 0x00),
            PieceKind::T => Color::rgb(0x99, 0x00, 0xff),
        }
    }

    /// Spawn orientation as indices into the row-major bounding box.
    ///
    /// The I-piece is listed on the box's second row; [`RotationTable`] lifts its
    /// 0° orientation to the first row.
    const fn spawn_indices(self) -> [usize; 4] {
        match self {
            PieceKind::I => [4, 5, 6, 7],
            PieceKind::J => [0, 3, 4, 5],
            PieceKind::L => [2, 3, 4, 5],
            PieceKind::O => [1, 2, 5, 6],
            PieceKind::S => [1, 2, 3, 4],
            PieceKind::Z => [0, 1, 4, 5],
            PieceKind::T => [1, 3, 4, 5],
        }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::T => 'T',
        }
    }
}

/// Rotates a square occupancy matrix 90° clockwise in place.
///
/// Works layer by layer from the outside in, cycling the four rotational
/// images of every element of the layer's top edge.
fn rotate_clockwise(matrix: &mut [bool], dimension: usize) {
    assert_eq!(matrix.len(), dimension * dimension);
    for layer in 0..dimension / 2 {
        let first = layer;
        let last = dimension - 1 - layer;
        for i in first..last {
            let offset = i - first;
            let top = matrix[first * dimension + i];
            matrix[first * dimension + i] = matrix[(last - offset) * dimension + first];
            matrix[(last - offset) * dimension + first] =
                matrix[last * dimension + (last - offset)];
            matrix[last * dimension + (last - offset)] = matrix[i * dimension + last];
            matrix[i * dimension + last] = top;
        }
    }
}

/// Bounding-box indices of a piece in each of its four orientations.
///
/// Slot `n` holds the four indices occupied after `n` clockwise quarter turns
/// from the spawn orientation, giving 16 entries in total.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceKind, RotationTable};
///
/// let table = RotationTable::new(PieceKind::T);
/// assert_eq!(table.orientation(0), [1, 3, 4, 5]);
/// assert_eq!(table.orientation(1), [1, 4, 5, 7]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationTable {
    indices: [usize; 16],
}

impl RotationTable {
    pub const ORIENTATIONS: usize = 4;

    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        let dimension = kind.box_dimension();
        let mut matrix: ArrayVec<bool, 16> = (0..kind.box_size()).map(|_| false).collect();
        for index in kind.spawn_indices() {
            matrix[index] = true;
        }

        let mut indices = [0; 16];
        for slot in 0..Self::ORIENTATIONS {
            if slot > 0 {
                rotate_clockwise(&mut matrix, dimension);
            }
            let occupied = matrix
                .iter()
                .enumerate()
                .filter_map(|(index, &set)| set.then_some(index));
            let mut count = 0;
            for (entry, index) in indices[slot * 4..][..4].iter_mut().zip(occupied) {
                *entry = index;
                count += 1;
            }
            assert_eq!(count, 4, "a piece always occupies four cells");
        }

        if kind == PieceKind::I {
            for index in &mut indices[..4] {
                *index -= dimension;
            }
        }

        Self { indices }
    }

    /// Returns the bounding-box indices of orientation `slot` (taken mod 4).
    #[must_use]
    pub fn orientation(&self, slot: usize) -> [usize; 4] {
        let start = (slot % Self::ORIENTATIONS) * 4;
        let mut out = [0; 4];
        out.copy_from_slice(&self.indices[start..start + 4]);
        out
    }

    #[must_use]
    pub fn entries(&self) -> &[usize; 16] {
        &self.indices
    }
}

/// Lateral movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Outcome of [`Piece::descend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Descend {
    /// The piece moved one row down.
    Moved,
    /// The piece was already at its settle position and is now locked.
    Settled,
}

/// Rotation state of a piece: number of clockwise quarter turns from spawn (0-3).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    pub const fn quarter_turns(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn degrees(self) -> u16 {
        self.0 as u16 * 90
    }

    #[expect(clippy::cast_possible_truncation)]
    const fn from_slot(slot: usize) -> Self {
        Self((slot % 4) as u8)
    }
}

/// A falling (or previewed) tetromino bound to the cells of one board.
///
/// The piece never owns cells. It records the indices of its bounding box and
/// of its four blocks within whichever [`Board`] it was initialized against,
/// and every operation takes that board explicitly.
///
/// A piece is re-initialized in place each time a new shape spawns into a box.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Descend, Direction, Piece, PieceKind};
///
/// let mut board = Board::new(10, 20);
/// let bounding_box = (0..3).flat_map(|row| (3..6).map(move |col| row * 10 + col));
/// let mut piece = Piece::new(&mut board, bounding_box, PieceKind::T);
///
/// assert!(piece.move_sideways(&mut board, Direction::Left));
/// assert!(piece.rotate(&board, 90));
/// assert_eq!(piece.descend(&mut board, None), Descend::Moved);
///
/// piece.settle(&mut board, None);
/// assert_eq!(board.occupied_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    rotation: PieceRotation,
    table: RotationTable,
    bounding_box: ArrayVec<usize, 16>,
    blocks: [usize; 4],
    settled: bool,
}

impl Piece {
    /// Creates a piece and binds it to `bounding_box` on `board`.
    #[must_use]
    pub fn new<I>(board: &mut Board, bounding_box: I, kind: PieceKind) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut piece = Self {
            kind,
            rotation: PieceRotation::default(),
            table: RotationTable::new(kind),
            bounding_box: ArrayVec::new(),
            blocks: [0; 4],
            settled: false,
        };
        piece.initialize(board, bounding_box, kind);
        piece
    }

    /// Rebinds the piece to a new bounding box in spawn orientation.
    ///
    /// The block cells are painted with the piece color.
    ///
    /// # Panics
    ///
    /// Panics if the box size does not match `kind` or an index is off the board.
    pub fn initialize<I>(&mut self, board: &mut Board, bounding_box: I, kind: PieceKind)
    where
        I: IntoIterator<Item = usize>,
    {
        self.bounding_box.clear();
        for index in bounding_box {
            assert!(index < board.cell_count(), "bounding box index {index} is off the board");
            assert!(!self.bounding_box.is_full(), "bounding box larger than 4x4");
            self.bounding_box.push(index);
        }
        assert_eq!(
            self.bounding_box.len(),
            kind.box_size(),
            "bounding box size does not match {kind:?}"
        );

        if self.kind != kind {
            self.table = RotationTable::new(kind);
        }
        self.kind = kind;
        self.rotation = PieceRotation::default();
        self.settled = false;
        self.blocks = self.table.orientation(0).map(|i| self.bounding_box[i]);
        self.paint(board, kind.color());
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.kind.color()
    }

    /// Board indices of the bounding box, row-major.
    #[must_use]
    pub fn bounding_box(&self) -> &[usize] {
        &self.bounding_box
    }

    /// Board indices of the four cells the piece currently covers.
    #[must_use]
    pub fn blocks(&self) -> [usize; 4] {
        self.blocks
    }

    /// Whether the piece has been locked into the board.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Resets the paint of the block cells to black. Occupied cells keep their color.
    pub fn erase(&self, board: &mut Board) {
        self.paint(board, Color::BLACK);
    }

    fn paint(&self, board: &mut Board, color: Color) {
        for index in self.blocks {
            board.paint(index, color);
        }
    }

    /// Whether `blocks` cannot move further down on `board`.
    #[must_use]
    pub fn at_settle_position(board: &Board, blocks: &[usize; 4]) -> bool {
        blocks
            .iter()
            .any(|&index| board.is_last_row(index) || board.is_occupied(index + board.width()))
    }

    fn bounding_box_at_bottom(&self, board: &Board) -> bool {
        self.bounding_box
            .last()
            .is_some_and(|&index| board.is_last_row(index))
    }

    /// Moves the piece one row down, or settles it if it cannot move.
    ///
    /// Each row moved adds one to `score`. Once the piece has settled, further
    /// calls return [`Descend::Settled`] without touching the board or score.
    pub fn descend(&mut self, board: &mut Board, score: Option<&mut u64>) -> Descend {
        if self.settled {
            return Descend::Settled;
        }
        if Self::at_settle_position(board, &self.blocks) {
            self.settle(board, None);
            return Descend::Settled;
        }

        if let Some(score) = score {
            *score += 1;
        }
        let width = board.width();
        for index in &mut self.blocks {
            *index += width;
        }
        if !self.bounding_box_at_bottom(board) {
            for index in &mut self.bounding_box {
                *index += width;
            }
        }
        Descend::Moved
    }

    /// Shifts the piece one column, returning `false` if a wall or block is in the way.
    pub fn move_sideways(&mut self, board: &mut Board, direction: Direction) -> bool {
        if self.settled {
            return false;
        }
        let blocked = self.blocks.iter().any(|&index| match direction {
            Direction::Left => board.is_left_edge(index) || board.is_occupied(index - 1),
            Direction::Right => board.is_right_edge(index) || board.is_occupied(index + 1),
        });
        if blocked {
            return false;
        }

        self.paint(board, Color::BLACK);
        for index in &mut self.blocks {
            *index = shift(*index, direction);
        }
        self.paint(board, self.kind.color());

        let box_at_edge = match direction {
            Direction::Left => board.is_left_edge(self.bounding_box[0]),
            Direction::Right => board.is_right_edge(self.bounding_box[self.bounding_box.len() - 1]),
        };
        if !box_at_edge {
            for index in &mut self.bounding_box {
                *index = shift(*index, direction);
            }
        }
        true
    }

    /// Drops the piece to its settle position and occupies its four cells.
    ///
    /// Each row dropped adds one to `score`. Returns `false` if the piece had
    /// already settled.
    pub fn settle(&mut self, board: &mut Board, mut score: Option<&mut u64>) -> bool {
        if self.settled {
            return false;
        }
        let width = board.width();
        while !Self::at_settle_position(board, &self.blocks) {
            for index in &mut self.blocks {
                *index += width;
            }
            if let Some(score) = score.as_deref_mut() {
                *score += 1;
            }
        }
        let color = self.kind.color();
        for index in self.blocks {
            board.occupy(index, color);
        }
        self.settled = true;
        true
    }

    /// Rotates clockwise by `degrees` (a multiple of 90, may be negative).
    ///
    /// If the target orientation is blocked, the following orientations of the
    /// table are tried in turn, up to four attempts. There are no lateral kicks.
    /// Returns `false` and leaves the piece unchanged when every attempt is blocked.
    /// The O-piece never rotates.
    pub fn rotate(&mut self, board: &Board, degrees: i32) -> bool {
        assert!(degrees % 90 == 0, "rotation must be a multiple of 90 degrees");
        if self.kind == PieceKind::O || self.settled {
            return false;
        }

        let turns = (degrees / 90).rem_euclid(4).unsigned_abs() as usize;
        let start = self.rotation.quarter_turns() + turns;
        for attempt in 0..RotationTable::ORIENTATIONS {
            let slot = (start + attempt) % RotationTable::ORIENTATIONS;
            let cells = self.table.orientation(slot).map(|i| self.bounding_box[i]);
            if cells.iter().all(|&index| !board.is_occupied(index)) {
                self.blocks = cells;
                self.rotation = PieceRotation::from_slot(slot);
                return true;
            }
            log::trace!("{:?} orientation {slot} blocked", self.kind);
        }
        false
    }

    /// Where the blocks would settle if dropped straight down.
    #[must_use]
    pub fn ghost_blocks(&self, board: &Board) -> [usize; 4] {
        let mut blocks = self.blocks;
        while !Self::at_settle_position(board, &blocks) {
            for index in &mut blocks {
                *index += board.width();
            }
        }
        blocks
    }

    /// Draws the four blocks filled with the piece color.
    pub fn render_blocks<R>(&self, board: &Board, renderer: &mut R)
    where
        R: Renderer + ?Sized,
    {
        for index in self.blocks {
            let (row, col) = board.row_col(index);
            renderer.fill_rect(CellRect::unit(col, row), self.kind.color());
        }
    }

    /// Draws the blocks and an outline at the position the piece would settle.
    pub fn render<R>(&self, board: &Board, renderer: &mut R)
    where
        R: Renderer + ?Sized,
    {
        self.render_blocks(board, renderer);
        for index in self.ghost_blocks(board) {
            let (row, col) = board.row_col(index);
            renderer.draw_rect_outline(CellRect::unit(col, row), self.kind.color());
        }
    }
}

fn shift(index: usize, direction: Direction) -> usize {
    match direction {
        Direction::Left => index - 1,
        Direction::Right => index + 1,
    }
}
