//! UI rendering for the TUI.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::features::breathing::{format_mmss, Phase, ProgressReporter};
use crate::tui::app::{App, HELP};

/// Render the application UI.
pub fn render<R: ProgressReporter>(frame: &mut Frame<'_>, app: &App<'_, R>) {
    // Create layout: header, phase, gauge, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Phase
            Constraint::Length(3), // Gauge
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_phase(frame, app, chunks[1]);
    render_gauge(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);
}

const fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Idle => Color::White,
        Phase::Countdown => Color::Magenta,
        Phase::Inhale => Color::Cyan,
        Phase::Hold => Color::Yellow,
        Phase::Exhale => Color::Green,
        Phase::CyclePause => Color::DarkGray,
        Phase::Finished => Color::LightGreen,
    }
}

/// Render the header.
fn render_header<R: ProgressReporter>(frame: &mut Frame<'_>, app: &App<'_, R>, area: Rect) {
    let controller = app.controller();
    let title = format!(
        " {} - {} session{} done ",
        controller.challenge_id(),
        controller.completed_sessions_count(),
        if controller.completed_sessions_count() == 1 { "" } else { "s" }
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

    frame.render_widget(header, area);
}

/// Render the phase name, time left, and cycle.
fn render_phase<R: ProgressReporter>(frame: &mut Frame<'_>, app: &App<'_, R>, area: Rect) {
    let controller = app.controller();
    let phase = controller.current_phase();
    let color = phase_color(phase);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            app.phase_title(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ];

    if phase.is_timed() && phase != Phase::Countdown {
        lines.push(Line::from(format_mmss(controller.time_left_in_phase())));
        lines.push(Line::from(Span::styled(
            format!(
                "Cycle {}/{}",
                controller.current_cycle(),
                controller.target_cycles()
            ),
            Style::default().fg(Color::DarkGray),
        )));
    } else if phase == Phase::Finished {
        lines.push(Line::from(format!(
            "{} breaths completed",
            controller.breaths_completed()
        )));
    }

    if controller.is_paused() {
        lines.push(Line::from(Span::styled(
            "PAUSED",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(body, area);
}

/// Render the phase progress gauge.
fn render_gauge<R: ProgressReporter>(frame: &mut Frame<'_>, app: &App<'_, R>, area: Rect) {
    let controller = app.controller();
    let percent = controller.progress();

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(phase_color(controller.current_phase())))
        .ratio((percent / 100.0).clamp(0.0, 1.0))
        .label(format!("{percent:.0}%"));

    frame.render_widget(gauge, area);
}

/// Render the status bar.
fn render_status_bar<R: ProgressReporter>(frame: &mut Frame<'_>, app: &App<'_, R>, area: Rect) {
    let status_text = app.status.as_deref().unwrap_or(HELP);
    let status = Paragraph::new(status_text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, area);
}
