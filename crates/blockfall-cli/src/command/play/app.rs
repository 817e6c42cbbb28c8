use blockfall_engine::{Clock as _, GameSession, Intent, SystemClock};
use crossterm::event::Event;
use ratatui::Frame;

use crate::{
    input::{Command, KeyTracker},
    tui::{App, RenderMode, Tui},
    view::{Label, LabelFactory, SessionLabels, SessionView},
};

const FPS: u32 = 60;

#[derive(Debug)]
pub struct PlayApp {
    session: GameSession,
    labels: SessionLabels<Label>,
    factory: LabelFactory,
    keys: KeyTracker,
    clock: SystemClock,
    is_exiting: bool,
}

impl PlayApp {
    pub fn new(session: GameSession) -> Self {
        let mut factory = LabelFactory;
        let labels = SessionLabels::new(&session, &mut factory);
        Self {
            session,
            labels,
            factory,
            keys: KeyTracker::default(),
            clock: SystemClock::new(),
            is_exiting: false,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    fn apply(&mut self, intent: Intent) {
        let was_game_over = self.session.state().is_game_over();
        self.session.apply(intent);
        if was_game_over && self.session.state().is_running() {
            log::info!("new game started");
            for held in self.keys.held_intents() {
                self.session.apply(held);
            }
        }
    }

    fn refresh_labels(&mut self) {
        let changes = self.session.take_text_changes();
        if changes.any() {
            self.labels
                .refresh(&self.session, changes, &mut self.factory);
        }
    }
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_tick_rate(Some(self.session.config().tick_rate));
        tui.set_render_mode(RenderMode::throttled_from_rate(FPS));
        self.keys = KeyTracker::new(tui.reports_key_releases());
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: Event) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        match self.keys.handle(key, self.clock.now()) {
            Some(Command::Game(intent)) => {
                self.apply(intent);
                self.refresh_labels();
            }
            Some(Command::Quit) => self.is_exiting = true,
            None => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        frame.render_widget(SessionView::new(&self.session, &self.labels), frame.area());
    }

    fn update(&mut self, _tui: &mut Tui) {
        for released in self.keys.expire(self.clock.now()) {
            self.session.apply(released);
        }
        self.session.tick();
        self.refresh_labels();
    }
}
