//! Guided breathing sessions.
//!
//! - [`PhaseTimer`]: one-second countdown for a single phase
//! - [`SessionController`]: the Countdown/Inhale/Hold/Exhale/CyclePause state machine
//! - [`ProgressReporter`]: where finished sessions are checked in
//! - [`ChallengeStore`]: the `SQLite` tracker used by the CLI

pub mod controller;
pub mod phase;
pub mod reporter;
pub mod storage;
pub mod timer;

pub use controller::{SessionController, SessionEvent, DEFAULT_TARGET_CYCLES, PROGRESS_OFFSET};
pub use phase::{next_phase, Phase, PhaseDurations};
pub use reporter::{
    ChallengeProgress, ExitReport, ProgressReporter, DEFAULT_CHALLENGE_ID,
};
pub use storage::{ChallengeStore, DailyCheckIn, ProgressSummary};
pub use timer::{format_mmss, PhaseTimer, TimerState};
