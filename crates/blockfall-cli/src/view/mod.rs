pub use self::{canvas::*, labels::*, session_view::*};

mod canvas;
mod labels;
mod session_view;

pub mod style {
    use ratatui::style::{Color, Style};

    pub const BACKGROUND: Color = color(blockfall_engine::Color::BLACK);
    pub const FOREGROUND: Color = color(blockfall_engine::LABEL_COLOR);
    pub const GAME_OVER: Color = color(blockfall_engine::GAME_OVER_COLOR);

    pub const DEFAULT: Style = Style::new().fg(FOREGROUND).bg(BACKGROUND);
    pub const HELP: Style = Style::new().fg(Color::DarkGray);
    pub const HELP_KEY: Style = Style::new().fg(Color::Cyan);

    /// Terminal color of an engine color; alpha is dropped.
    #[must_use]
    pub const fn color(color: blockfall_engine::Color) -> Color {
        Color::Rgb(color.r, color.g, color.b)
    }
}
