//! Breathing session state machine.
//!
//! [`SessionController`] drives a [`PhaseTimer`] through
//! Countdown → (Inhale → Hold → Exhale → CyclePause) × N → Finished and
//! reports completed sessions to a [`ProgressReporter`] on exit.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::phase::{next_phase, Phase, PhaseDurations};
use super::reporter::{flush_sessions, record_daily_check_in, ExitReport, ProgressReporter};
use super::timer::PhaseTimer;
use crate::error::BreatheError;

/// Cycles per session when the caller does not choose.
pub const DEFAULT_TARGET_CYCLES: u32 = 4;

/// Added to elapsed and total time before dividing, so a phase never shows 0%.
pub const PROGRESS_OFFSET: f64 = 1.0;

/// Something the engine wants observers to know about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The session moved to another phase.
    PhaseChanged {
        /// Phase left
        from: Phase,
        /// Phase entered
        to: Phase,
        /// Cycle of the entered phase
        cycle: u32,
    },
    /// Per-tick progress of the running phase.
    Progress {
        /// Phase the tick applied to
        phase: Phase,
        /// Cycle of that phase
        cycle: u32,
        /// Seconds left in the phase
        time_left: i64,
        /// Phase progress in percent
        percent: f64,
    },
    /// All cycles are done.
    SessionFinished {
        /// Sessions finished by this controller so far
        completed_sessions: u32,
    },
}

/// State of the run in progress.
#[derive(Debug, Clone)]
struct Session {
    current_cycle: u32,
    phase: Phase,
    timer: PhaseTimer,
}

impl Session {
    const fn idle() -> Self {
        Self {
            current_cycle: 1,
            phase: Phase::Idle,
            timer: PhaseTimer::new(),
        }
    }
}

/// Owns one breathing exercise visit: any number of sessions, one report.
pub struct SessionController<R> {
    reporter: R,
    challenge_id: String,
    durations: PhaseDurations,
    progress_offset: f64,
    target_cycles: u32,
    session: Session,
    completed_sessions: u32,
    reported_sessions: u32,
    started: bool,
}

impl<R: ProgressReporter> SessionController<R> {
    /// Create an idle controller.
    pub fn new(reporter: R, challenge_id: impl Into<String>, durations: PhaseDurations) -> Self {
        Self {
            reporter,
            challenge_id: challenge_id.into(),
            durations,
            progress_offset: PROGRESS_OFFSET,
            target_cycles: DEFAULT_TARGET_CYCLES,
            session: Session::idle(),
            completed_sessions: 0,
            reported_sessions: 0,
            started: false,
        }
    }

    /// Override the progress smoothing offset.
    ///
    /// Negative offsets clamp to 0; non-finite ones keep [`PROGRESS_OFFSET`].
    #[must_use]
    pub fn with_progress_offset(mut self, offset: f64) -> Self {
        self.progress_offset = if offset.is_finite() {
            offset.max(0.0)
        } else {
            PROGRESS_OFFSET
        };
        self
    }

    /// Begin a session of `target_cycles` cycles with the countdown.
    ///
    /// Allowed from `Idle` and `Finished`.
    ///
    /// # Errors
    ///
    /// - `BreatheError::AlreadyRunning` if a session is active
    /// - `BreatheError::InvalidCycleCount` if `target_cycles` is 0
    /// - `BreatheError::InvalidDuration` if a configured phase length is not positive
    ///
    /// The controller is unchanged on error.
    pub fn start(&mut self, target_cycles: u32) -> Result<Vec<SessionEvent>, BreatheError> {
        if self.session.phase.is_timed() {
            return Err(BreatheError::AlreadyRunning(format!(
                "{} in cycle {}/{}",
                self.session.phase, self.session.current_cycle, self.target_cycles
            )));
        }
        if target_cycles == 0 {
            return Err(BreatheError::InvalidCycleCount(target_cycles));
        }
        self.durations.validate()?;

        let mut timer = PhaseTimer::new();
        timer.start(self.durations.countdown)?;

        let from = self.session.phase;
        self.target_cycles = target_cycles;
        self.session = Session {
            current_cycle: 1,
            phase: Phase::Countdown,
            timer,
        };
        self.started = true;

        tracing::debug!(
            target_cycles,
            challenge = %self.challenge_id,
            "Breathing session started"
        );

        Ok(vec![
            SessionEvent::PhaseChanged {
                from,
                to: Phase::Countdown,
                cycle: 1,
            },
            self.progress_event(),
        ])
    }

    /// Deliver one clock tick.
    ///
    /// Does nothing while idle, paused, or finished.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        if !self.session.timer.is_running() {
            return Vec::new();
        }

        let completed = self.session.timer.tick();
        let mut events = vec![self.progress_event()];
        if completed {
            self.advance(&mut events);
        }
        events
    }

    /// Move past the phase whose timer just ran out.
    fn advance(&mut self, events: &mut Vec<SessionEvent>) {
        let from = self.session.phase;
        let (to, cycle) = next_phase(from, self.session.current_cycle, self.target_cycles);

        self.session.phase = to;
        self.session.current_cycle = cycle;
        tracing::debug!(from = ?from, to = ?to, cycle, "Phase complete");
        events.push(SessionEvent::PhaseChanged { from, to, cycle });

        if to == Phase::Finished {
            self.session.timer.cancel();
            self.completed_sessions += 1;
            tracing::info!(
                completed_sessions = self.completed_sessions,
                cycles = self.target_cycles,
                "Breathing session finished"
            );
            events.push(SessionEvent::SessionFinished {
                completed_sessions: self.completed_sessions,
            });
            return;
        }

        let Some(seconds) = self.durations.for_phase(to) else {
            return;
        };
        if let Err(e) = self.session.timer.start(seconds) {
            // Durations are validated in start(); only reachable through a logic error.
            tracing::error!(phase = ?to, error = %e, "Could not start phase timer");
            self.session = Session::idle();
            return;
        }
        events.push(self.progress_event());
    }

    /// Freeze the running phase. No-op outside an active phase.
    pub fn pause(&mut self) {
        if self.session.timer.is_running() {
            self.session.timer.pause();
            tracing::debug!(phase = ?self.session.phase, "Paused");
        }
    }

    /// Continue the frozen phase. No-op unless paused.
    pub fn resume(&mut self) {
        if self.session.timer.is_paused() {
            self.session.timer.resume();
            tracing::debug!(phase = ?self.session.phase, "Resumed");
        }
    }

    /// Abandon the current session and return to `Idle`.
    ///
    /// The completed-session count is kept.
    pub fn reset(&mut self) -> Vec<SessionEvent> {
        let from = self.session.phase;
        self.session.timer.cancel();
        self.session = Session::idle();

        if from == Phase::Idle {
            return Vec::new();
        }
        tracing::debug!(from = ?from, "Session reset");
        vec![SessionEvent::PhaseChanged {
            from,
            to: Phase::Idle,
            cycle: 1,
        }]
    }

    /// Progress of the current phase in percent, `[0, 100]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        match self.session.phase {
            Phase::Idle => 0.0,
            Phase::Finished => 100.0,
            _ => {
                let timer = &self.session.timer;
                let total = timer.duration() as f64 + self.progress_offset;
                if total <= 0.0 {
                    return 0.0;
                }
                let elapsed = timer.elapsed() as f64 + self.progress_offset;
                (elapsed / total * 100.0).clamp(0.0, 100.0)
            }
        }
    }

    fn progress_event(&self) -> SessionEvent {
        SessionEvent::Progress {
            phase: self.session.phase,
            cycle: self.session.current_cycle,
            time_left: self.session.timer.remaining(),
            percent: self.progress(),
        }
    }

    /// Report this visit to the challenge tracker, dated today.
    ///
    /// See [`SessionController::exit_on`].
    ///
    /// # Errors
    ///
    /// Returns the reporter's error or `BreatheError::MalformedProgress`.
    pub fn exit(&mut self) -> Result<Option<ExitReport>, BreatheError> {
        self.exit_on(Local::now().date_naive())
    }

    /// Report this visit to the challenge tracker, dated `today`.
    ///
    /// Adds the sessions finished since the last successful report to the
    /// challenge check-ins and bumps the day's check-in count by one.
    /// Returns `None` without touching the tracker if no session was ever
    /// started.
    ///
    /// # Errors
    ///
    /// Returns the reporter's error or `BreatheError::MalformedProgress`.
    /// Sessions already added to the check-ins are never added twice.
    pub fn exit_on(&mut self, today: NaiveDate) -> Result<Option<ExitReport>, BreatheError> {
        if !self.started {
            tracing::debug!("Exercise left before starting, nothing to report");
            return Ok(None);
        }

        let unreported = self.completed_sessions - self.reported_sessions;
        let progress = flush_sessions(&self.reporter, &self.challenge_id, unreported)?;
        self.reported_sessions = self.completed_sessions;

        let today_count = record_daily_check_in(&self.reporter, &self.challenge_id, today)?;

        tracing::info!(
            challenge = %self.challenge_id,
            sessions = unreported,
            check_ins = progress.check_ins,
            today_count,
            "Reported breathing progress"
        );

        Ok(Some(ExitReport {
            challenge_id: self.challenge_id.clone(),
            sessions_reported: unreported,
            breaths_completed: self.breaths_completed(),
            check_ins: progress.check_ins,
            streak: progress.streak,
            date: today,
            today_count,
        }))
    }

    /// Current phase.
    #[must_use]
    pub const fn current_phase(&self) -> Phase {
        self.session.phase
    }

    /// Current cycle, 1-indexed.
    #[must_use]
    pub const fn current_cycle(&self) -> u32 {
        self.session.current_cycle
    }

    /// Seconds left in the current phase.
    #[must_use]
    pub const fn time_left_in_phase(&self) -> i64 {
        self.session.timer.remaining()
    }

    /// Whether the running phase is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.session.timer.is_paused()
    }

    /// Cycles in the current (or last) session.
    #[must_use]
    pub const fn target_cycles(&self) -> u32 {
        self.target_cycles
    }

    /// Sessions finished since this controller was created.
    #[must_use]
    pub const fn completed_sessions_count(&self) -> u32 {
        self.completed_sessions
    }

    /// Breaths completed across finished sessions.
    #[must_use]
    pub const fn breaths_completed(&self) -> u32 {
        self.completed_sessions * self.target_cycles
    }

    /// Whether `start` has succeeded at least once.
    #[must_use]
    pub const fn has_started(&self) -> bool {
        self.started
    }

    /// Challenge this controller reports into.
    #[must_use]
    pub fn challenge_id(&self) -> &str {
        &self.challenge_id
    }

    /// Configured phase lengths.
    #[must_use]
    pub const fn durations(&self) -> &PhaseDurations {
        &self.durations
    }

    /// The reporter this controller writes to.
    #[must_use]
    pub const fn reporter(&self) -> &R {
        &self.reporter
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use mockall::predicate::eq;

    use super::*;
    use crate::features::breathing::reporter::{
        ChallengeProgress, MockProgressReporter, DEFAULT_CHALLENGE_ID,
    };

    fn controller() -> SessionController<MockProgressReporter> {
        SessionController::new(
            MockProgressReporter::new(),
            DEFAULT_CHALLENGE_ID,
            PhaseDurations::default(),
        )
    }

    fn tick_n<R: ProgressReporter>(c: &mut SessionController<R>, n: usize) -> Vec<SessionEvent> {
        (0..n).flat_map(|_| c.tick()).collect()
    }

    fn run_to_finish<R: ProgressReporter>(c: &mut SessionController<R>, cycles: u32) {
        c.start(cycles).unwrap();
        let seconds = c.durations().session_seconds(cycles);
        tick_n(c, usize::try_from(seconds).unwrap());
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_new_controller_is_idle() {
        let c = controller();
        assert_eq!(c.current_phase(), Phase::Idle);
        assert_eq!(c.current_cycle(), 1);
        assert_eq!(c.time_left_in_phase(), 0);
        assert_eq!(c.completed_sessions_count(), 0);
        assert!((c.progress() - 0.0).abs() < f64::EPSILON);
        assert!(!c.is_paused());
    }

    #[test]
    fn test_countdown_then_inhale() {
        let mut c = controller();
        c.start(4).unwrap();
        assert_eq!(c.current_phase(), Phase::Countdown);
        assert_eq!(c.time_left_in_phase(), 3);

        c.tick();
        assert_eq!(c.time_left_in_phase(), 2);
        c.tick();
        assert_eq!(c.time_left_in_phase(), 1);
        let events = c.tick();

        assert_eq!(c.current_phase(), Phase::Inhale);
        assert_eq!(c.current_cycle(), 1);
        assert_eq!(c.time_left_in_phase(), 5);
        assert!(events.contains(&SessionEvent::PhaseChanged {
            from: Phase::Countdown,
            to: Phase::Inhale,
            cycle: 1,
        }));
    }

    #[test]
    fn test_full_session_reaches_finished() {
        let mut c = controller();
        c.start(4).unwrap();

        tick_n(&mut c, 3);
        assert_eq!(c.current_phase(), Phase::Inhale);

        let events = tick_n(&mut c, 52);
        assert_eq!(c.current_phase(), Phase::Finished);
        assert_eq!(c.completed_sessions_count(), 1);
        assert_eq!(c.time_left_in_phase(), 0);
        assert_eq!(c.current_cycle(), 4);
        assert!((c.progress() - 100.0).abs() < f64::EPSILON);
        assert!(events.contains(&SessionEvent::SessionFinished {
            completed_sessions: 1
        }));

        // Extra ticks are ignored once finished
        assert!(c.tick().is_empty());
        assert_eq!(c.completed_sessions_count(), 1);
    }

    #[test]
    fn test_cycle_count_matches_target() {
        for target in 1..=6 {
            let mut c = controller();
            c.start(target).unwrap();
            let seconds = c.durations().session_seconds(target);
            let events = tick_n(&mut c, usize::try_from(seconds).unwrap());

            let entered = |phase: Phase| {
                events
                    .iter()
                    .filter(|e| matches!(e, SessionEvent::PhaseChanged { to, .. } if *to == phase))
                    .count()
            };
            assert_eq!(entered(Phase::Inhale), target as usize);
            assert_eq!(entered(Phase::Hold), target as usize);
            assert_eq!(entered(Phase::Exhale), target as usize);
            assert_eq!(entered(Phase::CyclePause), target as usize);
            assert_eq!(entered(Phase::Finished), 1);
            assert_eq!(c.current_phase(), Phase::Finished);
            assert_eq!(c.completed_sessions_count(), 1);
        }
    }

    #[test]
    fn test_cycle_never_exceeds_target() {
        let mut c = controller();
        c.start(2).unwrap();
        for _ in 0..100 {
            c.tick();
            assert!(c.current_cycle() <= c.target_cycles());
        }
    }

    #[test]
    fn test_one_tick_short_is_not_finished() {
        let mut c = controller();
        c.start(4).unwrap();
        tick_n(&mut c, 54);
        assert_eq!(c.current_phase(), Phase::CyclePause);
        assert_eq!(c.current_cycle(), 4);
        assert_eq!(c.completed_sessions_count(), 0);
    }

    #[test]
    fn test_progress_within_phase() {
        let mut c = controller();
        c.start(1).unwrap();
        tick_n(&mut c, 3);
        assert_eq!(c.current_phase(), Phase::Inhale);

        let first = c.progress();
        assert!(first > 0.0);
        assert!(first < 100.0);

        let mut last = first;
        let mut percents = Vec::new();
        for _ in 0..5 {
            for event in c.tick() {
                if let SessionEvent::Progress { phase: Phase::Inhale, percent, time_left, .. } = event {
                    percents.push((time_left, percent));
                }
            }
        }
        for (time_left, percent) in &percents {
            assert!(*percent >= last);
            assert!((0.0..=100.0).contains(percent));
            last = *percent;
            if *time_left == 0 {
                assert!((percent - 100.0).abs() < f64::EPSILON);
            } else {
                assert!(*percent < 100.0);
            }
        }
        assert_eq!(percents.len(), 5);
    }

    #[test]
    fn test_progress_offset_is_tunable() {
        let mut c = controller().with_progress_offset(0.0);
        c.start(1).unwrap();
        assert!((c.progress() - 0.0).abs() < f64::EPSILON);
        c.tick();
        assert!((c.progress() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_offset_keeps_progress_in_range() {
        for offset in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let mut c = controller().with_progress_offset(offset);
            c.start(1).unwrap();
            for _ in 0..4 {
                let p = c.progress();
                assert!((0.0..=100.0).contains(&p), "offset {offset} gave {p}");
                c.tick();
            }
        }
    }

    #[test]
    fn test_countdown_is_one_phase() {
        let mut c = controller();
        let events = c.start(1).unwrap();
        assert_eq!(
            events[0],
            SessionEvent::PhaseChanged { from: Phase::Idle, to: Phase::Countdown, cycle: 1 }
        );

        let mut changes = 0;
        let mut last = c.progress();
        for expected in [2, 1] {
            for event in c.tick() {
                if matches!(event, SessionEvent::PhaseChanged { .. }) {
                    changes += 1;
                }
            }
            assert_eq!(c.current_phase(), Phase::Countdown);
            assert_eq!(c.time_left_in_phase(), expected);
            assert!(c.progress() > last);
            last = c.progress();
        }
        assert_eq!(changes, 0);

        c.tick();
        assert_eq!(c.current_phase(), Phase::Inhale);
    }

    #[test]
    fn test_pause_resume_keeps_time_left() {
        let mut c = controller();
        c.start(4).unwrap();
        tick_n(&mut c, 3 + 2);
        assert_eq!(c.current_phase(), Phase::Inhale);
        assert_eq!(c.time_left_in_phase(), 3);

        c.pause();
        assert!(c.is_paused());
        // Clock keeps running while paused; nothing is delivered to the phase
        assert!(tick_n(&mut c, 10).is_empty());
        c.resume();

        assert!(!c.is_paused());
        assert_eq!(c.time_left_in_phase(), 3);
        assert_eq!(c.current_phase(), Phase::Inhale);
    }

    #[test]
    fn test_pause_resume_noops() {
        let mut c = controller();
        c.pause();
        c.resume();
        assert_eq!(c.current_phase(), Phase::Idle);
        assert!(!c.is_paused());

        c.start(1).unwrap();
        c.resume();
        assert!(!c.is_paused());
        c.pause();
        c.pause();
        assert!(c.is_paused());
        c.resume();
        c.resume();
        assert!(!c.is_paused());
    }

    #[test]
    fn test_pause_in_finished_is_noop() {
        let mut c = controller();
        run_to_finish(&mut c, 1);
        c.pause();
        assert!(!c.is_paused());
        assert_eq!(c.current_phase(), Phase::Finished);
    }

    #[test]
    fn test_reset_during_hold() {
        let mut c = controller();
        c.start(4).unwrap();
        tick_n(&mut c, 3 + 13 + 5 + 1);
        assert_eq!(c.current_phase(), Phase::Hold);
        assert_eq!(c.current_cycle(), 2);

        let events = c.reset();
        assert_eq!(c.current_phase(), Phase::Idle);
        assert_eq!(c.current_cycle(), 1);
        assert_eq!(c.time_left_in_phase(), 0);
        assert_eq!(
            events,
            vec![SessionEvent::PhaseChanged {
                from: Phase::Hold,
                to: Phase::Idle,
                cycle: 1,
            }]
        );
        // No stale tick acts on the cancelled phase
        assert!(c.tick().is_empty());
    }

    #[test]
    fn test_reset_keeps_completed_count() {
        let mut c = controller();
        run_to_finish(&mut c, 1);
        c.start(2).unwrap();
        tick_n(&mut c, 7);
        c.reset();
        assert_eq!(c.completed_sessions_count(), 1);

        c.reset();
        assert_eq!(c.current_phase(), Phase::Idle);
    }

    #[test]
    fn test_reset_while_paused() {
        let mut c = controller();
        c.start(1).unwrap();
        c.pause();
        c.reset();
        assert!(!c.is_paused());
        assert_eq!(c.current_phase(), Phase::Idle);
    }

    #[test]
    fn test_start_while_running_is_rejected() {
        let mut c = controller();
        c.start(4).unwrap();
        tick_n(&mut c, 4);
        let before = c.time_left_in_phase();

        let result = c.start(2);
        assert!(matches!(result, Err(BreatheError::AlreadyRunning(_))));
        assert_eq!(c.current_phase(), Phase::Inhale);
        assert_eq!(c.time_left_in_phase(), before);
        assert_eq!(c.target_cycles(), 4);
    }

    #[test]
    fn test_start_while_paused_is_rejected() {
        let mut c = controller();
        c.start(4).unwrap();
        c.pause();
        assert!(matches!(c.start(4), Err(BreatheError::AlreadyRunning(_))));
        assert!(c.is_paused());
    }

    #[test]
    fn test_start_after_finished_keeps_count() {
        let mut c = controller();
        run_to_finish(&mut c, 1);
        assert_eq!(c.completed_sessions_count(), 1);

        let events = c.start(1).unwrap();
        assert_eq!(c.current_phase(), Phase::Countdown);
        assert_eq!(c.current_cycle(), 1);
        assert_eq!(c.completed_sessions_count(), 1);
        assert!(events.contains(&SessionEvent::PhaseChanged {
            from: Phase::Finished,
            to: Phase::Countdown,
            cycle: 1,
        }));

        tick_n(&mut c, 16);
        assert_eq!(c.completed_sessions_count(), 2);
    }

    #[test]
    fn test_start_rejects_zero_cycles() {
        let mut c = controller();
        assert!(matches!(
            c.start(0),
            Err(BreatheError::InvalidCycleCount(0))
        ));
        assert_eq!(c.current_phase(), Phase::Idle);
        assert!(!c.has_started());
    }

    #[test]
    fn test_start_rejects_invalid_duration() {
        let durations = PhaseDurations {
            exhale: 0,
            ..PhaseDurations::default()
        };
        let mut c =
            SessionController::new(MockProgressReporter::new(), DEFAULT_CHALLENGE_ID, durations);

        assert!(matches!(
            c.start(4),
            Err(BreatheError::InvalidDuration(0))
        ));
        assert_eq!(c.current_phase(), Phase::Idle);
        assert!(!c.has_started());
    }

    #[test]
    fn test_custom_durations() {
        let durations = PhaseDurations {
            countdown: 1,
            inhale: 4,
            hold: 7,
            exhale: 8,
            cycle_pause: 1,
        };
        let mut c =
            SessionController::new(MockProgressReporter::new(), DEFAULT_CHALLENGE_ID, durations);
        c.start(1).unwrap();
        c.tick();
        assert_eq!(c.current_phase(), Phase::Inhale);
        assert_eq!(c.time_left_in_phase(), 4);
        tick_n(&mut c, 4);
        assert_eq!(c.current_phase(), Phase::Hold);
        assert_eq!(c.time_left_in_phase(), 7);
    }

    #[test]
    fn test_exit_reports_completed_session() {
        let mut reporter = MockProgressReporter::new();
        reporter.expect_challenge_progress().times(1).returning(|_| {
            Ok(ChallengeProgress {
                check_ins: 10,
                streak: 2,
            })
        });
        reporter
            .expect_update_challenge_progress()
            .with(eq(DEFAULT_CHALLENGE_ID), eq(0), eq(2), eq(11))
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        reporter.expect_daily_check_ins().times(1).returning(|_| {
            let mut ledger = BTreeMap::new();
            ledger.insert("2024-05-01".to_string(), 1);
            Ok(ledger)
        });
        reporter
            .expect_add_daily_check_in()
            .with(eq(DEFAULT_CHALLENGE_ID), eq("2024-05-01"), eq(2))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut c = SessionController::new(reporter, DEFAULT_CHALLENGE_ID, PhaseDurations::default());
        run_to_finish(&mut c, 4);

        let report = c.exit_on(today()).unwrap().unwrap();
        assert_eq!(report.sessions_reported, 1);
        assert_eq!(report.breaths_completed, 4);
        assert_eq!(report.check_ins, 11);
        assert_eq!(report.streak, 2);
        assert_eq!(report.today_count, 2);
        assert_eq!(c.completed_sessions_count(), 1);
    }

    #[test]
    fn test_second_exit_contributes_nothing() {
        let mut reporter = MockProgressReporter::new();
        let mut seq = mockall::Sequence::new();
        reporter
            .expect_challenge_progress()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ChallengeProgress { check_ins: 10, streak: 2 }));
        reporter
            .expect_update_challenge_progress()
            .with(eq(DEFAULT_CHALLENGE_ID), eq(0), eq(2), eq(11))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _| Ok(()));
        reporter
            .expect_challenge_progress()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ChallengeProgress { check_ins: 11, streak: 2 }));
        reporter
            .expect_update_challenge_progress()
            .with(eq(DEFAULT_CHALLENGE_ID), eq(0), eq(2), eq(11))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _| Ok(()));
        reporter
            .expect_daily_check_ins()
            .returning(|_| Ok(BTreeMap::new()));
        reporter
            .expect_add_daily_check_in()
            .returning(|_, _, _| Ok(()));

        let mut c = SessionController::new(reporter, DEFAULT_CHALLENGE_ID, PhaseDurations::default());
        run_to_finish(&mut c, 4);

        let first = c.exit_on(today()).unwrap().unwrap();
        let second = c.exit_on(today()).unwrap().unwrap();
        assert_eq!(first.sessions_reported, 1);
        assert_eq!(second.sessions_reported, 0);
        assert_eq!(c.completed_sessions_count(), 1);
    }

    #[test]
    fn test_exit_without_start_does_not_report() {
        let mut reporter = MockProgressReporter::new();
        reporter.expect_challenge_progress().never();
        reporter.expect_update_challenge_progress().never();
        reporter.expect_daily_check_ins().never();
        reporter.expect_add_daily_check_in().never();

        let mut c = SessionController::new(reporter, DEFAULT_CHALLENGE_ID, PhaseDurations::default());
        assert!(c.exit_on(today()).unwrap().is_none());
    }

    #[test]
    fn test_exit_after_abandoned_session_still_checks_in() {
        let mut reporter = MockProgressReporter::new();
        reporter
            .expect_challenge_progress()
            .returning(|_| Ok(ChallengeProgress { check_ins: 3, streak: 0 }));
        reporter
            .expect_update_challenge_progress()
            .with(eq(DEFAULT_CHALLENGE_ID), eq(0), eq(0), eq(3))
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        reporter
            .expect_daily_check_ins()
            .returning(|_| Ok(BTreeMap::new()));
        reporter
            .expect_add_daily_check_in()
            .with(eq(DEFAULT_CHALLENGE_ID), eq("2024-05-01"), eq(1))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut c = SessionController::new(reporter, DEFAULT_CHALLENGE_ID, PhaseDurations::default());
        c.start(4).unwrap();
        tick_n(&mut c, 10);
        c.reset();

        let report = c.exit_on(today()).unwrap().unwrap();
        assert_eq!(report.sessions_reported, 0);
        assert_eq!(report.breaths_completed, 0);
    }

    #[test]
    fn test_failed_exit_can_be_retried() {
        let mut reporter = MockProgressReporter::new();
        let mut seq = mockall::Sequence::new();
        reporter
            .expect_challenge_progress()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(BreatheError::Database("locked".to_string())));
        reporter
            .expect_challenge_progress()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ChallengeProgress { check_ins: 5, streak: 1 }));
        reporter
            .expect_update_challenge_progress()
            .with(eq(DEFAULT_CHALLENGE_ID), eq(0), eq(1), eq(7))
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        reporter
            .expect_daily_check_ins()
            .returning(|_| Ok(BTreeMap::new()));
        reporter
            .expect_add_daily_check_in()
            .returning(|_, _, _| Ok(()));

        let mut c = SessionController::new(reporter, DEFAULT_CHALLENGE_ID, PhaseDurations::default());
        run_to_finish(&mut c, 1);
        run_to_finish(&mut c, 1);

        assert!(matches!(
            c.exit_on(today()),
            Err(BreatheError::Database(_))
        ));
        assert_eq!(c.completed_sessions_count(), 2);

        let report = c.exit_on(today()).unwrap().unwrap();
        assert_eq!(report.sessions_reported, 2);
        assert_eq!(report.check_ins, 7);
    }

    #[test]
    fn test_retry_after_daily_failure_adds_no_sessions() {
        let mut reporter = MockProgressReporter::new();
        let mut updates = mockall::Sequence::new();
        reporter
            .expect_challenge_progress()
            .times(1)
            .returning(|_| Ok(ChallengeProgress { check_ins: 5, streak: 1 }));
        reporter
            .expect_challenge_progress()
            .times(1)
            .returning(|_| Ok(ChallengeProgress { check_ins: 6, streak: 1 }));
        reporter
            .expect_update_challenge_progress()
            .with(eq(DEFAULT_CHALLENGE_ID), eq(0), eq(1), eq(6))
            .times(1)
            .in_sequence(&mut updates)
            .returning(|_, _, _, _| Ok(()));
        reporter
            .expect_update_challenge_progress()
            .with(eq(DEFAULT_CHALLENGE_ID), eq(0), eq(1), eq(6))
            .times(1)
            .in_sequence(&mut updates)
            .returning(|_, _, _, _| Ok(()));
        reporter
            .expect_daily_check_ins()
            .times(1)
            .returning(|_| Err(BreatheError::Database("locked".to_string())));
        reporter
            .expect_daily_check_ins()
            .times(1)
            .returning(|_| Ok(BTreeMap::new()));
        reporter
            .expect_add_daily_check_in()
            .with(eq(DEFAULT_CHALLENGE_ID), eq("2024-05-01"), eq(1))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut c = SessionController::new(reporter, DEFAULT_CHALLENGE_ID, PhaseDurations::default());
        run_to_finish(&mut c, 1);

        assert!(matches!(
            c.exit_on(today()),
            Err(BreatheError::Database(_))
        ));

        let report = c.exit_on(today()).unwrap().unwrap();
        assert_eq!(report.sessions_reported, 0);
        assert_eq!(report.check_ins, 6);
        assert_eq!(report.today_count, 1);
    }

    #[test]
    fn test_retry_after_update_failure_adds_all_sessions() {
        let mut reporter = MockProgressReporter::new();
        let mut updates = mockall::Sequence::new();
        reporter
            .expect_challenge_progress()
            .times(2)
            .returning(|_| Ok(ChallengeProgress { check_ins: 5, streak: 1 }));
        reporter
            .expect_update_challenge_progress()
            .with(eq(DEFAULT_CHALLENGE_ID), eq(0), eq(1), eq(7))
            .times(1)
            .in_sequence(&mut updates)
            .returning(|_, _, _, _| Err(BreatheError::Database("disk I/O error".to_string())));
        reporter
            .expect_update_challenge_progress()
            .with(eq(DEFAULT_CHALLENGE_ID), eq(0), eq(1), eq(7))
            .times(1)
            .in_sequence(&mut updates)
            .returning(|_, _, _, _| Ok(()));
        reporter
            .expect_daily_check_ins()
            .times(1)
            .returning(|_| Ok(BTreeMap::new()));
        reporter
            .expect_add_daily_check_in()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut c = SessionController::new(reporter, DEFAULT_CHALLENGE_ID, PhaseDurations::default());
        run_to_finish(&mut c, 1);
        run_to_finish(&mut c, 1);

        assert!(matches!(
            c.exit_on(today()),
            Err(BreatheError::Database(_))
        ));

        let report = c.exit_on(today()).unwrap().unwrap();
        assert_eq!(report.sessions_reported, 2);
        assert_eq!(report.check_ins, 7);
    }

    #[test]
    fn test_malformed_progress_propagates() {
        let mut reporter = MockProgressReporter::new();
        reporter
            .expect_challenge_progress()
            .returning(|_| Ok(ChallengeProgress { check_ins: -4, streak: 0 }));
        reporter.expect_update_challenge_progress().never();
        reporter.expect_add_daily_check_in().never();

        let mut c = SessionController::new(reporter, DEFAULT_CHALLENGE_ID, PhaseDurations::default());
        run_to_finish(&mut c, 1);

        assert!(matches!(
            c.exit_on(today()),
            Err(BreatheError::MalformedProgress(_))
        ));
        assert_eq!(c.completed_sessions_count(), 1);
    }
}
