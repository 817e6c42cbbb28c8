use std::io;

use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, terminal,
};
use ratatui::DefaultTerminal;

use crate::tui::{
    App,
    event::TuiEvent,
    event_loop::{EventLoop, RenderMode},
};

/// TUI application runtime.
///
/// Manages the event loop and executes applications that implement the `App` trait.
#[derive(Default, Debug)]
pub struct Tui {
    events: EventLoop,
    key_releases: bool,
}

impl Tui {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tick rate (ticks per second); `None` disables ticks.
    pub fn set_tick_rate(&mut self, rate: Option<u32>) {
        self.events.set_tick_rate(rate);
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.events.set_render_mode(mode);
    }

    /// Whether the terminal reports key release events.
    ///
    /// Known once `App::init` is called.
    pub fn reports_key_releases(&self) -> bool {
        self.key_releases
    }

    /// Runs the application.
    ///
    /// 1. Enables key release reporting if the terminal supports it
    /// 2. Calls `app.init()` for initialization
    /// 3. Runs the event loop until `app.should_exit()` returns true
    ///    - `TuiEvent::Tick(n)`: calls `app.update()` `n` times
    ///    - `TuiEvent::Render`: calls `app.draw()`
    ///    - `TuiEvent::Crossterm`: calls `app.handle_event()`
    pub fn run<A>(mut self, app: &mut A) -> anyhow::Result<()>
    where
        A: App,
    {
        ratatui::run(|terminal| {
            self.key_releases = terminal::supports_keyboard_enhancement().unwrap_or(false);
            log::debug!("key release events supported: {}", self.key_releases);
            if self.key_releases {
                execute!(
                    io::stdout(),
                    PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
                )?;
            }

            app.init(&mut self);
            let result = self.event_loop(terminal, app);

            if self.key_releases {
                execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
            }
            result
        })
    }

    fn event_loop<A>(&mut self, terminal: &mut DefaultTerminal, app: &mut A) -> anyhow::Result<()>
    where
        A: App,
    {
        while !app.should_exit() {
            match self.events.next()? {
                TuiEvent::Tick(ticks) => {
                    for _ in 0..ticks {
                        app.update(self);
                    }
                }
                TuiEvent::Render => {
                    terminal.draw(|f| app.draw(f))?;
                }
                TuiEvent::Crossterm(event) => {
                    app.handle_event(self, event);
                }
            }
        }
        Ok(())
    }
}
