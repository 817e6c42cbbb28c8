use std::{io, time::Duration};

use blockfall_engine::{Clock, FixedTimestep, SystemClock};
use crossterm::event;

use crate::tui::event::TuiEvent;

/// Rendering trigger mode.
#[derive(Debug, Clone, Copy, Default)]
pub enum RenderMode {
    /// Render after state changes (tick or crossterm event).
    #[default]
    OnDirty,
    /// Render after state changes, but with minimum interval between renders.
    ///
    /// If events occur faster than the interval, they are batched into one render.
    Throttled(Duration),
}

impl RenderMode {
    /// Creates `Throttled` mode from frame rate (FPS).
    #[must_use]
    pub fn throttled_from_rate(rate: u32) -> Self {
        Self::Throttled(Duration::from_secs(1) / rate.max(1))
    }
}

/// Event loop state management.
///
/// Game time advances through a [`FixedTimestep`]: every wake-up samples the
/// clock and all ticks that became due are reported together in one
/// [`TuiEvent::Tick`]. Without a tick rate no tick events are generated.
#[derive(Debug)]
pub(super) struct EventLoop<C = SystemClock> {
    clock: C,
    timestep: Option<FixedTimestep>,
    render_mode: RenderMode,
    last_render: Option<Duration>,
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl<C> EventLoop<C>
where
    C: Clock,
{
    /// Tick rate is unset, and render mode defaults to `OnDirty`.
    pub(super) fn with_clock(clock: C) -> Self {
        Self {
            clock,
            timestep: None,
            render_mode: RenderMode::default(),
            last_render: None,
            dirty: true, // Initial render is required on startup
        }
    }

    /// Sets the tick rate in ticks per second.
    ///
    /// Pass `None` to disable tick events.
    pub(super) fn set_tick_rate(&mut self, rate: Option<u32>) {
        self.timestep = rate.filter(|&rate| rate > 0).map(|rate| {
            let mut timestep = FixedTimestep::from_rate(rate);
            timestep.advance(&self.clock);
            timestep
        });
    }

    pub(super) fn set_render_mode(&mut self, render_mode: RenderMode) {
        self.render_mode = render_mode;
    }

    /// Returns the next event.
    ///
    /// Blocks until ticks are due, a render is due, or a crossterm event occurs.
    pub(super) fn next(&mut self) -> io::Result<TuiEvent> {
        loop {
            if let Some(event) = self.due_event() {
                return Ok(event);
            }

            if let Some(timeout) = self.compute_timeout()
                && !event::poll(timeout)?
            {
                continue;
            }

            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }

    /// Returns a tick or render event if one is due now.
    fn due_event(&mut self) -> Option<TuiEvent> {
        if let Some(timestep) = &mut self.timestep {
            let ticks = timestep.advance(&self.clock);
            if ticks > 0 {
                self.dirty = true;
                return Some(TuiEvent::Tick(ticks));
            }
        }

        let now = self.clock.now();
        let since_render = self
            .last_render
            .map_or(Duration::MAX, |last| now.saturating_sub(last));
        let do_render = match self.render_mode {
            RenderMode::OnDirty => self.dirty,
            RenderMode::Throttled(interval) => self.dirty && since_render >= interval,
        };
        if do_render {
            self.last_render = Some(now);
            self.dirty = false;
            return Some(TuiEvent::Render);
        }
        None
    }

    fn compute_timeout(&self) -> Option<Duration> {
        let now = self.clock.now();
        let until_tick = self
            .timestep
            .as_ref()
            .map(FixedTimestep::time_until_next_tick);
        let until_render = |interval: Duration| {
            self.last_render
                .map_or(Duration::ZERO, |last| (last + interval).saturating_sub(now))
        };
        let until_render = match self.render_mode {
            RenderMode::OnDirty => self.dirty.then_some(Duration::ZERO),
            RenderMode::Throttled(interval) => self.dirty.then(|| until_render(interval)),
        };
        [until_tick, until_render].into_iter().flatten().min()
    }
}
