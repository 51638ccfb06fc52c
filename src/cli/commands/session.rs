//! `breathe start` implementation.

use std::io::Write;
use std::time::Duration;

use colored::Colorize;

use crate::cli::args::{OutputFormat, StartArgs};
use crate::config::Config;
use crate::error::BreatheError;
use crate::features::breathing::{
    ChallengeStore, ExitReport, Phase, ProgressReporter, SessionController, SessionEvent,
};
use crate::output::format_exit;
use crate::tui;

/// Run a breathing session and record it on the way out.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, the session cannot start,
/// the terminal fails, or progress cannot be recorded.
pub fn start(config: &Config, args: StartArgs, format: OutputFormat) -> Result<String, BreatheError> {
    let store = ChallengeStore::new()?;
    let challenge_id = args
        .challenge
        .unwrap_or_else(|| config.breathing.challenge_id.clone());
    let cycles = args.cycles.unwrap_or(config.breathing.target_cycles);
    let tick = Duration::from_millis(args.tick_ms);

    let mut controller = SessionController::new(store, challenge_id, config.breathing.phases);

    let run = if args.plain {
        let mut stdout = std::io::stdout();
        let sink: Option<&mut dyn Write> = match format {
            OutputFormat::Pretty => Some(&mut stdout),
            OutputFormat::Json => None,
        };
        run_plain(&mut controller, cycles, tick, sink)
    } else {
        tui::run(&mut controller, cycles, !args.intro, tick)
    };

    let report = finish_visit(&mut controller, run)?;
    format_exit(report.as_ref(), controller.completed_sessions_count(), format)
}

/// Report the visit whether or not the session view ended cleanly.
///
/// # Errors
///
/// Returns the session view's error first, otherwise the reporting error.
pub fn finish_visit<R: ProgressReporter>(
    controller: &mut SessionController<R>,
    run: Result<(), BreatheError>,
) -> Result<Option<ExitReport>, BreatheError> {
    let report = controller.exit();
    match run {
        Ok(()) => report,
        Err(e) => {
            if let Err(exit_err) = &report {
                tracing::error!(error = %exit_err, "Could not record progress");
            } else {
                tracing::warn!(error = %e, "Session view failed, progress recorded");
            }
            Err(e)
        }
    }
}

/// Run one session to completion, writing a line per step to `out`.
///
/// # Errors
///
/// Returns an error if the session cannot start or `out` cannot be written.
pub fn run_plain<R: ProgressReporter>(
    controller: &mut SessionController<R>,
    cycles: u32,
    tick: Duration,
    mut out: Option<&mut dyn Write>,
) -> Result<(), BreatheError> {
    let mut emit = |events: Vec<SessionEvent>, target: u32| -> Result<(), BreatheError> {
        if let Some(out) = out.as_deref_mut() {
            for event in &events {
                if let Some(line) = describe_event(event, target) {
                    writeln!(out, "{line}")?;
                }
            }
            out.flush()?;
        }
        Ok(())
    };

    let events = controller.start(cycles)?;
    emit(events, cycles)?;

    while controller.current_phase().is_timed() {
        if !tick.is_zero() {
            std::thread::sleep(tick);
        }
        let events = controller.tick();
        emit(events, cycles)?;
    }

    Ok(())
}

/// One line of plain output for an event, if it deserves one.
fn describe_event(event: &SessionEvent, target_cycles: u32) -> Option<String> {
    match event {
        SessionEvent::PhaseChanged {
            to: Phase::Countdown,
            ..
        } => Some("Get ready...".dimmed().to_string()),
        SessionEvent::Progress {
            phase: Phase::Countdown,
            time_left,
            ..
        } if *time_left > 0 => Some(format!("  {time_left}")),
        SessionEvent::PhaseChanged {
            to: to @ (Phase::Inhale | Phase::Hold | Phase::Exhale),
            cycle,
            ..
        } => Some(format!(
            "[{cycle}/{target_cycles}] {}",
            match to {
                Phase::Inhale => to.display_name().cyan(),
                Phase::Hold => to.display_name().yellow(),
                _ => to.display_name().green(),
            }
        )),
        SessionEvent::SessionFinished { .. } => {
            Some(Phase::Finished.display_name().green().bold().to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::breathing::PhaseDurations;
    use crate::storage::Database;

    fn controller() -> SessionController<ChallengeStore> {
        let store = ChallengeStore::with_database(Database::open_in_memory().unwrap());
        SessionController::new(store, "test", PhaseDurations::default())
    }

    #[test]
    fn test_run_plain_finishes_session() {
        colored::control::set_override(false);
        let mut c = controller();
        let mut buf: Vec<u8> = Vec::new();

        run_plain(&mut c, 2, Duration::ZERO, Some(&mut buf)).unwrap();

        assert_eq!(c.current_phase(), Phase::Finished);
        assert_eq!(c.completed_sessions_count(), 1);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Get ready...");
        assert_eq!(&lines[1..4], &["  3", "  2", "  1"]);
        assert_eq!(lines[4], "[1/2] Breathe In");
        assert_eq!(text.matches("Breathe In").count(), 2);
        assert_eq!(text.matches("Hold").count(), 2);
        assert_eq!(lines.last(), Some(&"Well Done"));
    }

    #[test]
    fn test_run_plain_silent() {
        let mut c = controller();
        run_plain(&mut c, 1, Duration::ZERO, None).unwrap();
        assert_eq!(c.completed_sessions_count(), 1);
    }

    struct FullWriter;

    impl Write for FullWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no space left on device"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_output_still_records_visit() {
        let mut c = controller();
        let mut out = FullWriter;

        let run = run_plain(&mut c, 1, Duration::ZERO, Some(&mut out));
        assert!(run.is_err());

        let result = finish_visit(&mut c, run);
        assert!(matches!(result, Err(BreatheError::Io(_))));

        let today = chrono::Local::now().date_naive();
        let summary = c.reporter().summary("test", today).unwrap();
        assert_eq!(summary.check_ins, 0);
        assert_eq!(summary.today_count, 1);
    }

    #[test]
    fn test_failed_view_keeps_finished_sessions() {
        let mut c = controller();
        run_plain(&mut c, 1, Duration::ZERO, None).unwrap();

        let result = finish_visit(&mut c, Err(BreatheError::Config("draw failed".to_string())));
        assert!(matches!(result, Err(BreatheError::Config(_))));

        let today = chrono::Local::now().date_naive();
        let summary = c.reporter().summary("test", today).unwrap();
        assert_eq!(summary.check_ins, 1);
        assert_eq!(summary.today_count, 1);
    }

    #[test]
    fn test_finish_visit_before_start_reports_nothing() {
        let mut c = controller();
        assert_eq!(finish_visit(&mut c, Ok(())).unwrap(), None);
    }

    #[test]
    fn test_run_plain_rejects_zero_cycles() {
        let mut c = controller();
        assert!(matches!(
            run_plain(&mut c, 0, Duration::ZERO, None),
            Err(BreatheError::InvalidCycleCount(0))
        ));
    }
}
