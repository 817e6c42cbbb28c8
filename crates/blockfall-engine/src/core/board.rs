use serde::{Deserialize, Serialize};

/// RGBA color of a cell or piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
    /// Color of the interior grid lines drawn over every board.
    pub const GRID: Self = Self::rgb(0x15, 0x16, 0x17);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// A single board cell.
///
/// The cell's position is implied by its index in the owning [`Board`].
/// An empty cell may still carry a color: a falling piece paints the cells it
/// passes through without occupying them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    occupied: bool,
    color: Color,
}

impl Cell {
    pub const EMPTY: Self = Self {
        occupied: false,
        color: Color::BLACK,
    };

    #[must_use]
    pub const fn is_occupied(self) -> bool {
        self.occupied
    }

    #[must_use]
    pub const fn color(self) -> Color {
        self.color
    }
}

/// Row-major grid of cells with a fixed `width × height`.
///
/// The board owns every cell; pieces refer to cells by index only. All
/// mutation goes through the session and the pieces bound to the board.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Color};
///
/// let mut board = Board::new(10, 20);
/// let index = board.cell_index(19, 0);
/// board.occupy(index, Color::WHITE);
///
/// assert!(board.is_occupied(index));
/// assert_eq!(board.row_col(index), (19, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an empty board.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let mut board = Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
        };
        board.initialize(width, height);
        board
    }

    /// Resizes the board and resets every cell to empty black.
    pub fn initialize(&mut self, width: usize, height: usize) {
        assert!(width > 0 && height > 0, "board must have at least one cell");
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(width * height, Cell::EMPTY);
    }

    /// Resets every cell to empty black, keeping the dimensions.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells (`width * height`).
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.width)
    }

    #[must_use]
    pub fn cell_index(&self, row: usize, col: usize) -> usize {
        assert!(row < self.height && col < self.width);
        row * self.width + col
    }

    /// Inverse of [`Self::cell_index`].
    #[must_use]
    pub fn row_col(&self, index: usize) -> (usize, usize) {
        assert!(index < self.cells.len());
        (index / self.width, index % self.width)
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Cell {
        self.cells[index]
    }

    #[must_use]
    pub fn is_occupied(&self, index: usize) -> bool {
        self.cells[index].occupied
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.occupied).count()
    }

    #[must_use]
    pub fn is_last_row(&self, index: usize) -> bool {
        index >= self.cells.len() - self.width
    }

    #[must_use]
    pub fn is_left_edge(&self, index: usize) -> bool {
        index % self.width == 0
    }

    #[must_use]
    pub fn is_right_edge(&self, index: usize) -> bool {
        (index + 1) % self.width == 0
    }

    /// Colors an empty cell without occupying it. Occupied cells keep their color.
    pub fn paint(&mut self, index: usize, color: Color) {
        let cell = &mut self.cells[index];
        if !cell.occupied {
            cell.color = color;
        }
    }

    pub fn occupy(&mut self, index: usize, color: Color) {
        self.cells[index] = Cell {
            occupied: true,
            color,
        };
    }

    fn row(&self, row: usize) -> &[Cell] {
        &self.cells[row * self.width..][..self.width]
    }

    fn row_mut(&mut self, row: usize) -> &mut [Cell] {
        &mut self.cells[row * self.width..][..self.width]
    }

    #[must_use]
    pub fn is_row_filled(&self, row: usize) -> bool {
        self.row(row).iter().all(|cell| cell.occupied)
    }

    #[must_use]
    pub fn is_row_empty(&self, row: usize) -> bool {
        self.row(row).iter().all(|cell| !cell.occupied)
    }

    /// Empties every completely occupied row and returns how many were cleared.
    ///
    /// Rows above a cleared row are left in place; call
    /// [`Self::collapse_unfilled_lines`] afterwards to let them fall.
    pub fn clear_filled_lines(&mut self) -> usize {
        let mut cleared = 0;
        for row in 0..self.height {
            if self.is_row_filled(row) {
                self.row_mut(row).fill(Cell::EMPTY);
                cleared += 1;
            }
        }
        cleared
    }

    /// Drops every row containing blocks onto the nearest non-empty row below it.
    ///
    /// Rows are processed bottom-to-top so a lower row always lands before a
    /// higher row can fall into the space it vacated. Completely empty rows are
    /// never moved. Returns the number of rows that moved.
    pub fn collapse_unfilled_lines(&mut self) -> usize {
        let mut moved = 0;
        for row in (0..self.height.saturating_sub(1)).rev() {
            if self.is_row_empty(row) {
                continue;
            }

            let fall = (row + 1..self.height)
                .take_while(|&below| self.is_row_empty(below))
                .count();
            if fall == 0 {
                continue;
            }

            let width = self.width;
            let (upper, lower) = self.cells.split_at_mut((row + fall) * width);
            let source = &mut upper[row * width..][..width];
            lower[..width].copy_from_slice(source);
            source.fill(Cell::EMPTY);
            moved += 1;
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const RED: Color = Color::rgb(0xff, 0, 0);

    fn fill_row(board: &mut Board, row: usize) {
        for col in 0..board.width() {
            let index = board.cell_index(row, col);
            board.occupy(index, RED);
        }
    }

    fn board_from_rows(rows: &[&str]) -> Board {
        let mut board = Board::new(rows[0].len(), rows.len());
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch == '#' {
                    let index = board.cell_index(row, col);
                    board.occupy(index, RED);
                }
            }
        }
        board
    }

    fn rows_of(board: &Board) -> Vec<String> {
        board
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| if cell.is_occupied() { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_initialize_resets_cells() {
        let mut board = Board::new(4, 3);
        board.occupy(5, RED);
        board.paint(6, RED);

        board.initialize(5, 2);

        assert_eq!(board.cell_count(), 10);
        assert!(board.cells().iter().all(|cell| *cell == Cell::EMPTY));
    }

    #[test]
    fn test_cell_index_is_row_major() {
        let board = Board::new(10, 20);
        assert_eq!(board.cell_index(0, 0), 0);
        assert_eq!(board.cell_index(1, 0), 10);
        assert_eq!(board.cell_index(19, 9), 199);
        assert_eq!(board.row_col(123), (12, 3));
    }

    #[test]
    fn test_edges() {
        let board = Board::new(10, 3);
        assert!(board.is_left_edge(10));
        assert!(!board.is_left_edge(11));
        assert!(board.is_right_edge(19));
        assert!(!board.is_right_edge(18));
        assert!(board.is_last_row(20));
        assert!(!board.is_last_row(19));
    }

    #[test]
    fn test_paint_does_not_recolor_occupied_cell() {
        let mut board = Board::new(3, 3);
        board.occupy(4, RED);
        board.paint(4, Color::WHITE);
        board.paint(5, Color::WHITE);

        assert_eq!(board.cell(4).color(), RED);
        assert_eq!(board.cell(5).color(), Color::WHITE);
        assert!(!board.is_occupied(5));
    }

    #[test]
    fn test_single_row_board_clears_only_when_full() {
        let mut board = Board::new(10, 1);
        for col in 0..9 {
            board.occupy(col, RED);
        }

        assert_eq!(board.clear_filled_lines(), 0);
        assert_eq!(board.occupied_count(), 9);

        board.occupy(9, RED);
        assert_eq!(board.clear_filled_lines(), 1);
        assert_eq!(board.occupied_count(), 0);
        assert_eq!(board.cell(3).color(), Color::BLACK);
    }

    #[test]
    fn test_clear_filled_lines_counts_every_full_row() {
        let mut board = Board::new(4, 5);
        fill_row(&mut board, 1);
        fill_row(&mut board, 3);
        fill_row(&mut board, 4);
        board.occupy(board.cell_index(2, 0), RED);

        assert_eq!(board.clear_filled_lines(), 3);
        assert_eq!(board.occupied_count(), 1);
    }

    #[test]
    fn test_collapse_drops_rows_onto_stack() {
        let mut board = board_from_rows(&["#...", "....", ".#..", "....", "..##"]);

        board.collapse_unfilled_lines();

        assert_eq!(rows_of(&board), ["....", "....", "#...", ".#..", "..##"]);
    }

    #[test]
    fn test_clear_then_collapse_removes_filled_rows() {
        let mut board = board_from_rows(&["....", "#...", "####", ".##.", "####"]);

        assert_eq!(board.clear_filled_lines(), 2);
        board.collapse_unfilled_lines();

        assert_eq!(rows_of(&board), ["....", "....", "....", "#...", ".##."]);
    }

    #[test]
    fn test_collapse_moves_colors_with_rows() {
        let mut board = Board::new(3, 3);
        let blue = Color::rgb(0, 0, 0xff);
        board.occupy(board.cell_index(0, 1), blue);

        board.collapse_unfilled_lines();

        let landed = board.cell(board.cell_index(2, 1));
        assert!(landed.is_occupied());
        assert_eq!(landed.color(), blue);
        assert_eq!(board.cell(board.cell_index(0, 1)), Cell::EMPTY);
    }

    proptest! {
        #[test]
        fn clear_removes_exactly_the_filled_rows(
            cells in proptest::collection::vec(any::<bool>(), 6 * 8),
        ) {
            let mut board = Board::new(6, 8);
            for (index, occupied) in cells.iter().enumerate() {
                if *occupied {
                    board.occupy(index, RED);
                }
            }
            let filled: Vec<usize> = (0..8).filter(|&row| board.is_row_filled(row)).collect();
            let before = board.clone();

            prop_assert_eq!(board.clear_filled_lines(), filled.len());
            for row in 0..8 {
                if filled.contains(&row) {
                    prop_assert!(board.is_row_empty(row));
                } else {
                    for col in 0..6 {
                        let index = board.cell_index(row, col);
                        prop_assert_eq!(board.cell(index), before.cell(index));
                    }
                }
            }
        }

        #[test]
        fn collapse_keeps_row_order_and_leaves_no_gaps(
            cells in proptest::collection::vec(any::<bool>(), 5 * 10),
        ) {
            let mut board = Board::new(5, 10);
            for (index, occupied) in cells.iter().enumerate() {
                if *occupied {
                    board.occupy(index, RED);
                }
            }
            board.clear_filled_lines();
            let rows_before: Vec<Vec<bool>> = board
                .rows()
                .filter(|row| row.iter().any(|cell| cell.is_occupied()))
                .map(|row| row.iter().map(|cell| cell.is_occupied()).collect())
                .collect();
            let count_before = board.occupied_count();

            board.collapse_unfilled_lines();

            // Non-empty rows keep their relative order and sit contiguously at the bottom.
            let rows_after: Vec<Vec<bool>> = board
                .rows()
                .filter(|row| row.iter().any(|cell| cell.is_occupied()))
                .map(|row| row.iter().map(|cell| cell.is_occupied()).collect())
                .collect();
            prop_assert_eq!(&rows_after, &rows_before);
            let first_non_empty = board.height() - rows_after.len();
            for row in first_non_empty..board.height() {
                prop_assert!(!board.is_row_empty(row));
            }
            prop_assert_eq!(board.occupied_count(), count_before);
        }
    }
}
