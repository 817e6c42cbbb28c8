//! Key bindings and held-key tracking.
//!
//! The session needs to know when a movement key goes down and when it comes
//! back up. Terminals that support the kitty keyboard protocol report both.
//! Elsewhere only presses and auto-repeats arrive, so a held key is considered
//! released once no press or repeat has been seen for [`RELEASE_TIMEOUT`].

use std::time::Duration;

use arrayvec::ArrayVec;
use blockfall_engine::{Intent, KeyState};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Time without a repeat after which a held key counts as released.
pub const RELEASE_TIMEOUT: Duration = Duration::from_millis(150);

/// Result of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Command {
    Game(Intent),
    Quit,
}

/// Keys whose held state drives the session's repeat logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeldKey {
    Left,
    Right,
    Down,
}

impl HeldKey {
    const ALL: [Self; 3] = [Self::Left, Self::Right, Self::Down];

    fn from_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Left => Some(Self::Left),
            KeyCode::Right => Some(Self::Right),
            KeyCode::Down => Some(Self::Down),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }

    const fn intent(self, state: KeyState) -> Intent {
        match self {
            Self::Left => Intent::MoveLeft(state),
            Self::Right => Intent::MoveRight(state),
            Self::Down => Intent::SoftDrop(state),
        }
    }
}

/// Turns terminal key events into session intents.
#[derive(Debug, Default, Clone)]
pub struct KeyTracker {
    reports_releases: bool,
    /// When each held key was last pressed or repeated.
    last_seen: [Option<Duration>; 3],
}

impl KeyTracker {
    pub fn new(reports_releases: bool) -> Self {
        Self {
            reports_releases,
            last_seen: [None; 3],
        }
    }

    /// Maps one key event at time `now` to a command.
    pub fn handle(&mut self, event: KeyEvent, now: Duration) -> Option<Command> {
        if let Some(key) = HeldKey::from_code(event.code) {
            return self.handle_held(key, event.kind, now);
        }
        if event.kind == KeyEventKind::Release {
            return None;
        }

        let command = match event.code {
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
            KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
            KeyCode::Up => Command::Game(Intent::Rotate),
            KeyCode::Char(' ') => Command::Game(Intent::HardDrop),
            KeyCode::Char('c') => Command::Game(Intent::Hold),
            KeyCode::Char('r') => Command::Game(Intent::Reset),
            _ => return None,
        };
        Some(command)
    }

    fn handle_held(&mut self, key: HeldKey, kind: KeyEventKind, now: Duration) -> Option<Command> {
        let slot = &mut self.last_seen[key.index()];
        if kind == KeyEventKind::Release {
            return slot
                .take()
                .map(|_| Command::Game(key.intent(KeyState::Released)));
        }
        let was_held = slot.replace(now).is_some();
        (!was_held).then_some(Command::Game(key.intent(KeyState::Pressed)))
    }

    /// Releases keys that have not repeated within [`RELEASE_TIMEOUT`].
    ///
    /// Does nothing when the terminal reports releases itself.
    pub fn expire(&mut self, now: Duration) -> ArrayVec<Intent, 3> {
        let mut released = ArrayVec::new();
        if !self.reports_releases {
            for key in HeldKey::ALL {
                let slot = &mut self.last_seen[key.index()];
                if slot.is_some_and(|seen| now.saturating_sub(seen) >= RELEASE_TIMEOUT) {
                    *slot = None;
                    released.push(key.intent(KeyState::Released));
                }
            }
        }
        released
    }

    /// Press intents for every key currently held.
    pub fn held_intents(&self) -> ArrayVec<Intent, 3> {
        HeldKey::ALL
            .into_iter()
            .filter(|key| self.last_seen[key.index()].is_some())
            .map(|key| key.intent(KeyState::Pressed))
            .collect()
    }
}
