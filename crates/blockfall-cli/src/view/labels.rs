use blockfall_engine::{
    Color, GAME_OVER_COLOR, GAME_OVER_TEXT, GameSession, LABEL_COLOR, TextChanges, TextFactory,
    TextSize, lines_text, score_text,
};
use ratatui::{style::Style, text::Line};

use crate::view::style;

/// A single styled line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    line: Line<'static>,
}

impl Label {
    pub fn line(&self) -> &Line<'static> {
        &self.line
    }
}

impl TextSize for Label {
    fn width(&self) -> usize {
        self.line.width()
    }

    fn height(&self) -> usize {
        1
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LabelFactory;

impl TextFactory for LabelFactory {
    type Text = Label;

    fn create_text(&mut self, text: &str, color: Color) -> Label {
        Label {
            line: Line::styled(text.to_owned(), Style::new().fg(style::color(color))),
        }
    }
}

/// The session's text, regenerated only when it changes.
#[derive(Debug, Clone)]
pub struct SessionLabels<T> {
    pub score: T,
    pub lines: T,
    pub game_over: T,
}

impl<T> SessionLabels<T>
where
    T: TextSize,
{
    pub fn new<F>(session: &GameSession, factory: &mut F) -> Self
    where
        F: TextFactory<Text = T>,
    {
        let stats = session.stats();
        Self {
            score: factory.create_text(&score_text(stats.score()), LABEL_COLOR),
            lines: factory.create_text(&lines_text(stats.lines()), LABEL_COLOR),
            game_over: factory.create_text(GAME_OVER_TEXT, GAME_OVER_COLOR),
        }
    }

    /// Rebuilds the labels flagged in `changes`.
    pub fn refresh<F>(&mut self, session: &GameSession, changes: TextChanges, factory: &mut F)
    where
        F: TextFactory<Text = T>,
    {
        let stats = session.stats();
        if changes.score {
            self.score = factory.create_text(&score_text(stats.score()), LABEL_COLOR);
        }
        if changes.lines {
            self.lines = factory.create_text(&lines_text(stats.lines()), LABEL_COLOR);
        }
        if changes.game_over {
            self.game_over = factory.create_text(GAME_OVER_TEXT, GAME_OVER_COLOR);
        }
    }

    /// Width of the widest of the score and lines labels.
    pub fn stats_width(&self) -> usize {
        self.score.width().max(self.lines.width())
    }
}

#[cfg(test)]
mod tests {
    use blockfall_engine::{Intent, PieceSeed, SessionConfig};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct FakeText(String);

    impl TextSize for FakeText {
        fn width(&self) -> usize {
            self.0.len()
        }

        fn height(&self) -> usize {
            1
        }
    }

    #[derive(Debug, Default)]
    struct CountingFactory {
        created: Vec<String>,
    }

    impl TextFactory for CountingFactory {
        type Text = FakeText;

        fn create_text(&mut self, text: &str, _color: Color) -> FakeText {
            self.created.push(text.to_owned());
            FakeText(text.to_owned())
        }
    }

    fn session() -> GameSession {
        GameSession::new(SessionConfig {
            seed: Some(PieceSeed::from_bytes([3; 16])),
            ..SessionConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_label_size() {
        let label = LabelFactory.create_text("Score: 42", LABEL_COLOR);
        assert_eq!(label.width(), 9);
        assert_eq!(label.height(), 1);
        assert_eq!(label.line().style.fg, Some(style::FOREGROUND));
    }

    #[test]
    fn test_only_changed_labels_are_rebuilt() {
        let mut session = session();
        let mut factory = CountingFactory::default();
        let mut labels = SessionLabels::new(&session, &mut factory);
        assert_eq!(labels.score, FakeText("Score: 0".into()));
        assert_eq!(labels.stats_width(), "Score: 0".len());

        let changes = session.take_text_changes();
        assert_eq!(changes, TextChanges::ALL);
        assert_eq!(session.take_text_changes(), TextChanges::default());

        factory.created.clear();
        session.apply(Intent::HardDrop);
        let changes = session.take_text_changes();
        labels.refresh(&session, changes, &mut factory);

        assert_eq!(factory.created.len(), 1);
        assert_eq!(
            labels.score,
            FakeText(score_text(session.stats().score()))
        );
        assert_ne!(session.stats().score(), 0);
    }
}
