use blockfall_engine::{CellPoint, CellRect, Color, Panel, Renderer};
use ratatui::{buffer::Buffer, layout::Rect};

use crate::view::style;

/// Terminal columns per board cell; a single column would look half as wide as tall.
pub const CELL_WIDTH: u16 = 2;

const VERTICAL_GRID: &str = "▕";
const HORIZONTAL_GRID: &str = "▁";

/// Screen areas the panels are drawn into, inside their borders.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PanelAreas {
    pub stash: Rect,
    pub board: Rect,
    pub queue: Rect,
}

impl PanelAreas {
    #[must_use]
    pub fn get(&self, panel: Panel) -> Rect {
        match panel {
            Panel::Stash => self.stash,
            Panel::Board => self.board,
            Panel::Queue => self.queue,
        }
    }
}

/// [`Renderer`] drawing board cells onto a ratatui [`Buffer`].
///
/// Each cell is [`CELL_WIDTH`] columns wide and one row tall. Filled cells use
/// the background color, outlines are drawn as `[]`. Grid lines only show
/// through cells nothing else was drawn on, as one-eighth block glyphs along
/// the cell edge. Drawing outside the current viewport is clipped.
#[derive(Debug)]
pub struct TerminalCanvas<'a> {
    buf: &'a mut Buffer,
    areas: PanelAreas,
    viewport: Rect,
}

impl<'a> TerminalCanvas<'a> {
    pub fn new(buf: &'a mut Buffer, areas: PanelAreas) -> Self {
        Self {
            buf,
            areas,
            viewport: areas.board,
        }
    }

    /// Buffer cell for column half `half` of board cell (`col`, `row`).
    fn cell_mut(&mut self, col: usize, row: usize, half: u16) -> Option<&mut ratatui::buffer::Cell> {
        let x = u16::try_from(col)
            .ok()?
            .checked_mul(CELL_WIDTH)?
            .checked_add(half)?;
        let y = u16::try_from(row).ok()?;
        if x >= self.viewport.width || y >= self.viewport.height {
            return None;
        }
        self.buf.cell_mut((self.viewport.x + x, self.viewport.y + y))
    }

    /// Draws `symbol` unless something already covers the cell.
    fn draw_grid(&mut self, col: usize, row: usize, half: u16, symbol: &str, color: Color) {
        if let Some(cell) = self.cell_mut(col, row, half)
            && cell.symbol() == " "
            && cell.bg == style::BACKGROUND
        {
            cell.set_symbol(symbol).set_fg(style::color(color));
        }
    }
}

impl Renderer for TerminalCanvas<'_> {
    fn set_viewport(&mut self, panel: Panel) {
        self.viewport = self.areas.get(panel);
    }

    fn fill_rect(&mut self, rect: CellRect, color: Color) {
        for row in rect.y..rect.y + rect.height {
            for col in rect.x..rect.x + rect.width {
                for half in 0..CELL_WIDTH {
                    if let Some(cell) = self.cell_mut(col, row, half) {
                        cell.set_symbol(" ").set_bg(style::color(color));
                    }
                }
            }
        }
    }

    fn draw_rect_outline(&mut self, rect: CellRect, color: Color) {
        if rect.width == 0 {
            return;
        }
        let right = rect.x + rect.width - 1;
        for row in rect.y..rect.y + rect.height {
            for (col, half, symbol) in [(rect.x, 0, "["), (right, CELL_WIDTH - 1, "]")] {
                if let Some(cell) = self.cell_mut(col, row, half) {
                    cell.set_symbol(symbol).set_fg(style::color(color));
                }
            }
        }
    }

    fn draw_line(&mut self, from: CellPoint, to: CellPoint, color: Color) {
        if from.x == to.x && from.x > 0 {
            let col = from.x - 1;
            for row in from.y.min(to.y)..from.y.max(to.y) {
                self.draw_grid(col, row, CELL_WIDTH - 1, VERTICAL_GRID, color);
            }
        } else if from.y == to.y && from.y > 0 {
            let row = from.y - 1;
            for col in from.x.min(to.x)..from.x.max(to.x) {
                for half in 0..CELL_WIDTH {
                    self.draw_grid(col, row, half, HORIZONTAL_GRID, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::style::Style;

    use super::*;

    fn buffer() -> Buffer {
        let area = Rect::new(0, 0, 20, 8);
        let mut buf = Buffer::empty(area);
        buf.set_style(area, Style::new().bg(style::BACKGROUND));
        buf
    }

    fn areas() -> PanelAreas {
        PanelAreas {
            stash: Rect::new(0, 0, 8, 4),
            board: Rect::new(10, 0, 8, 8),
            queue: Rect::new(0, 5, 8, 3),
        }
    }

    #[test]
    fn test_fill_covers_both_columns() {
        let mut buf = buffer();
        let red = Color::rgb(200, 0, 0);
        TerminalCanvas::new(&mut buf, areas()).fill_rect(CellRect::unit(1, 2), red);

        assert_eq!(buf[(12, 2)].bg, style::color(red));
        assert_eq!(buf[(13, 2)].bg, style::color(red));
        assert_eq!(buf[(11, 2)].bg, style::BACKGROUND);
        assert_eq!(buf[(14, 2)].bg, style::BACKGROUND);
    }

    #[test]
    fn test_viewport_offsets_and_clips() {
        let mut buf = buffer();
        let mut canvas = TerminalCanvas::new(&mut buf, areas());
        canvas.set_viewport(Panel::Queue);
        canvas.fill_rect(
            CellRect {
                x: 3,
                y: 2,
                width: 4,
                height: 4,
            },
            Color::WHITE,
        );

        assert_eq!(buf[(6, 7)].bg, style::color(Color::WHITE));
        assert_eq!(buf[(7, 7)].bg, style::color(Color::WHITE));
        assert_eq!(buf[(8, 7)].bg, style::BACKGROUND);
    }

    #[test]
    fn test_outline_brackets() {
        let mut buf = buffer();
        let color = Color::rgb(0, 200, 0);
        TerminalCanvas::new(&mut buf, areas()).draw_rect_outline(CellRect::unit(0, 7), color);

        assert_eq!(buf[(10, 7)].symbol(), "[");
        assert_eq!(buf[(11, 7)].symbol(), "]");
        assert_eq!(buf[(11, 7)].fg, style::color(color));
        assert_eq!(buf[(11, 7)].bg, style::BACKGROUND);
    }

    #[test]
    fn test_grid_lines_skip_drawn_cells() {
        let mut buf = buffer();
        let mut canvas = TerminalCanvas::new(&mut buf, areas());
        canvas.fill_rect(CellRect::unit(0, 1), Color::WHITE);
        canvas.draw_line(CellPoint::new(1, 0), CellPoint::new(1, 8), Color::GRID);
        canvas.draw_line(CellPoint::new(0, 1), CellPoint::new(4, 1), Color::GRID);

        assert_eq!(buf[(11, 0)].symbol(), VERTICAL_GRID);
        assert_eq!(buf[(11, 0)].fg, style::color(Color::GRID));
        assert_eq!(buf[(11, 1)].symbol(), " ");
        assert_eq!(buf[(12, 0)].symbol(), HORIZONTAL_GRID);
        assert_eq!(buf[(10, 0)].symbol(), HORIZONTAL_GRID);
        assert_eq!(buf[(10, 1)].symbol(), " ");
    }
}
