//! Terminal User Interface (TUI) for breathing sessions.
//!
//! The event loop doubles as the session clock: it delivers one tick per
//! `tick_rate` to the controller and redraws in between.
//! Built with ratatui and crossterm.

mod app;
mod event;
mod ui;

pub use app::App;

use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::error::BreatheError;
use crate::features::breathing::{ProgressReporter, SessionController};

/// Run a breathing session full-screen until the user leaves.
///
/// With `auto_start` the countdown begins immediately; otherwise the intro
/// screen waits for `s`.
///
/// # Errors
///
/// Returns an error if the terminal fails to initialize or draw.
pub fn run<R: ProgressReporter>(
    controller: &mut SessionController<R>,
    cycles: u32,
    auto_start: bool,
    tick_rate: Duration,
) -> Result<(), BreatheError> {
    enable_raw_mode()
        .map_err(|e| BreatheError::Config(format!("Failed to enable raw mode: {e}")))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| BreatheError::Config(format!("Failed to setup terminal: {e}")))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)
        .map_err(|e| BreatheError::Config(format!("Failed to create terminal: {e}")))?;

    let mut app = App::new(controller, cycles);
    if auto_start {
        app.start();
    }
    let result = run_app(&mut terminal, &mut app, tick_rate);

    // Restore terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

/// Draw, handle keys, and tick until the user quits.
fn run_app<B: Backend, R: ProgressReporter>(
    terminal: &mut Terminal<B>,
    app: &mut App<'_, R>,
    tick_rate: Duration,
) -> Result<(), BreatheError> {
    let mut last_tick = Instant::now();

    while !app.should_quit {
        terminal
            .draw(|frame| ui::render(frame, app))
            .map_err(|e| BreatheError::Config(format!("Failed to draw: {e}")))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if let Some(action) = event::handle_events(timeout)? {
            match action {
                event::Action::Quit => app.should_quit = true,
                event::Action::Start => {
                    app.start();
                    last_tick = Instant::now();
                }
                event::Action::TogglePause => {
                    app.toggle_pause();
                    // A resumed phase gets a full second before its next tick
                    last_tick = Instant::now();
                }
                event::Action::Reset => app.reset(),
                event::Action::Help => app.show_help(),
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
