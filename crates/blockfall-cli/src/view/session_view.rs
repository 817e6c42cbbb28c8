use blockfall_engine::{GameSession, QUEUE_TITLE, STASH_TITLE, TextSize, render_session};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::view::{CELL_WIDTH, Label, PanelAreas, SessionLabels, TerminalCanvas, style};

/// Cells on each side of the stash box; fits the largest piece.
const STASH_CELLS: u16 = 4;
/// Minimum width of the left column, so growing numbers don't shift the board.
const MIN_STATS_WIDTH: u16 = 14;

const KEY_BINDINGS: &[(&str, &str)] = &[
    ("← →", "Move"),
    ("↓", "Soft Drop"),
    ("↑", "Rotate"),
    ("Space", "Hard Drop"),
    ("C", "Hold"),
    ("R", "Reset"),
    ("Q", "Quit"),
];

fn saturating_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Outer size of a bordered panel showing `width` × `height` cells.
fn panel_size(block: &Block<'_>, width: u16, height: u16) -> (u16, u16) {
    let dummy = Rect::new(0, 0, 100, 100);
    let inner = block.inner(dummy);
    (
        width * CELL_WIDTH + dummy.width - inner.width,
        height + dummy.height - inner.height,
    )
}

/// The whole game screen: stash and stats on the left, board in the middle,
/// upcoming pieces on the right, key bindings below.
#[derive(Debug)]
pub struct SessionView<'a> {
    session: &'a GameSession,
    labels: &'a SessionLabels<Label>,
}

impl<'a> SessionView<'a> {
    pub fn new(session: &'a GameSession, labels: &'a SessionLabels<Label>) -> Self {
        Self { session, labels }
    }

    fn panel_block(title: &'static str, border_style: Style) -> Block<'static> {
        Block::bordered()
            .title(Line::from(title).centered())
            .padding(Padding::symmetric(1, 0))
            .border_style(border_style)
            .style(style::DEFAULT)
    }

    fn help_line() -> Line<'static> {
        let mut spans = vec![];
        for (i, (key, description)) in KEY_BINDINGS.iter().copied().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" | ", style::HELP));
            }
            spans.push(Span::styled(key, style::HELP_KEY));
            spans.push(Span::styled(format!(" {description}"), style::HELP));
        }
        Line::from(spans).centered()
    }
}

impl Widget for SessionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &SessionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let game_over = self.session.state().is_game_over();
        let border_style = Style::new().fg(if game_over {
            style::GAME_OVER
        } else {
            style::FOREGROUND
        });

        let board = self.session.board();
        let board_block = Block::bordered()
            .border_style(border_style)
            .style(style::DEFAULT);
        let (board_width, board_height) = panel_size(
            &board_block,
            saturating_u16(board.width()),
            saturating_u16(board.height()),
        );

        let stash_block = SessionView::panel_block(STASH_TITLE, border_style);
        let (stash_width, stash_height) = panel_size(&stash_block, STASH_CELLS, STASH_CELLS);

        let preview = self.session.preview_board();
        let queue_block = SessionView::panel_block(QUEUE_TITLE, border_style);
        let (queue_width, queue_height) = panel_size(
            &queue_block,
            saturating_u16(preview.width()),
            saturating_u16(preview.height()),
        );

        let left_width = stash_width
            .max(MIN_STATS_WIDTH)
            .max(saturating_u16(self.labels.stats_width()));

        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(board_height), Constraint::Length(1)])
                .areas(area);
        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(left_width),
            Constraint::Length(board_width),
            Constraint::Length(queue_width),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(main_area);

        let [stash_area, score_area, lines_area] = Layout::vertical([
            Constraint::Length(stash_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(left_column);
        let stash_area = stash_area.layout::<1>(
            &Layout::horizontal([Constraint::Length(stash_width)]).flex(Flex::End),
        )[0];
        let [board_area] = Layout::vertical([Constraint::Length(board_height)]).areas(center_column);
        let [queue_area] = Layout::vertical([Constraint::Length(queue_height)]).areas(right_column);

        let areas = PanelAreas {
            stash: stash_block.inner(stash_area),
            board: board_block.inner(board_area),
            queue: queue_block.inner(queue_area),
        };
        stash_block.render(stash_area, buf);
        board_block.render(board_area, buf);
        queue_block.render(queue_area, buf);
        render_session(self.session, &mut TerminalCanvas::new(buf, areas));

        self.labels.score.line().clone().right_aligned().render(score_area, buf);
        self.labels.lines.line().clone().right_aligned().render(lines_area, buf);
        SessionView::help_line().render(help_area, buf);

        if game_over {
            let label = &self.labels.game_over;
            let width = saturating_u16(label.width() + 4)
                .max(board_width)
                .min(area.width);
            let x = (board_area.x + board_area.width / 2)
                .saturating_sub(width / 2)
                .clamp(area.x, area.right() - width);
            let y = (board_area.y + board_area.height / 2).saturating_sub(1);
            let popup = Rect::new(x, y, width, 3).intersection(area);
            let block = Block::bordered()
                .border_style(border_style)
                .style(style::DEFAULT);
            let inner = block.inner(popup);
            Clear.render(popup, buf);
            block.render(popup, buf);
            label.line().clone().centered().render(inner, buf);
        }
    }
}
