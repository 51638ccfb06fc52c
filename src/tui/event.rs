//! Event handling for the TUI.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::error::BreatheError;

/// Action to take after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave the exercise.
    Quit,
    /// Start a session.
    Start,
    /// Pause or resume.
    TogglePause,
    /// Abandon the current session.
    Reset,
    /// Show key help.
    Help,
}

/// Wait up to `timeout` for a key press.
///
/// Returns an action to take, or None if no action is needed.
///
/// # Errors
///
/// Returns an error if event polling fails.
pub fn handle_events(timeout: Duration) -> Result<Option<Action>, BreatheError> {
    if !event::poll(timeout).map_err(|e| BreatheError::Config(format!("Event poll failed: {e}")))? {
        return Ok(None);
    }

    match event::read().map_err(|e| BreatheError::Config(format!("Event read failed: {e}")))? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(key_action(key)),
        _ => Ok(None),
    }
}

/// Map a key press to an action.
fn key_action(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('s') | KeyCode::Enter => Some(Action::Start),
        KeyCode::Char(' ') | KeyCode::Char('p') => Some(Action::TogglePause),
        KeyCode::Char('r') => Some(Action::Reset),
        KeyCode::Char('?') => Some(Action::Help),
        _ => None,
    }
}
