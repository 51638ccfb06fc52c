//! Application state for the TUI.

use crate::features::breathing::{Phase, ProgressReporter, SessionController, SessionEvent};

/// Key help shown in the status bar.
pub const HELP: &str = "space:pause/resume | s:start | r:reset | q:leave";

/// Application state.
pub struct App<'a, R> {
    /// The session being shown.
    controller: &'a mut SessionController<R>,
    /// Cycles for each session started from this screen.
    pub cycles: u32,
    /// Status message to display.
    pub status: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl<'a, R: ProgressReporter> App<'a, R> {
    /// Create a new app instance.
    pub fn new(controller: &'a mut SessionController<R>, cycles: u32) -> Self {
        Self {
            controller,
            cycles,
            status: Some("Press s to start".to_string()),
            should_quit: false,
        }
    }

    /// Read-only view of the controller.
    pub fn controller(&self) -> &SessionController<R> {
        self.controller
    }

    /// Start a new session. Errors end up in the status bar.
    pub fn start(&mut self) {
        match self.controller.start(self.cycles) {
            Ok(events) => {
                self.status = None;
                self.apply(&events);
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    /// Pause a running session, or resume a paused one.
    pub fn toggle_pause(&mut self) {
        if self.controller.is_paused() {
            self.controller.resume();
            self.status = None;
        } else if self.controller.current_phase().is_timed() {
            self.controller.pause();
            self.status = Some("Paused - space to resume".to_string());
        }
    }

    /// Abandon the current session.
    pub fn reset(&mut self) {
        let events = self.controller.reset();
        if !events.is_empty() {
            self.status = Some("Session reset - press s to start again".to_string());
        }
    }

    /// Deliver one clock tick to the session.
    pub fn on_tick(&mut self) {
        let events = self.controller.tick();
        self.apply(&events);
    }

    /// Show key help.
    pub fn show_help(&mut self) {
        self.status = Some(HELP.to_string());
    }

    fn apply(&mut self, events: &[SessionEvent]) {
        for event in events {
            if let SessionEvent::SessionFinished { completed_sessions } = event {
                self.status = Some(format!(
                    "Session {completed_sessions} complete - s: again, q: leave"
                ));
            }
        }
    }

    /// Title line for the current phase.
    pub fn phase_title(&self) -> String {
        match self.controller.current_phase() {
            Phase::Countdown => format!("{}  {}", Phase::Countdown, self.controller.time_left_in_phase()),
            phase => phase.display_name().to_string(),
        }
    }
}
