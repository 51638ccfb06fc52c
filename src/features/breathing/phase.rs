//! Breathing phases and the cycle transition function.

use serde::{Deserialize, Serialize};

use crate::error::BreatheError;

/// One segment of a breathing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No session running
    Idle,
    /// Get-ready countdown before the first inhale
    Countdown,
    /// Breathe in
    Inhale,
    /// Hold the breath
    Hold,
    /// Breathe out
    Exhale,
    /// Short beat between exhale and the next inhale
    CyclePause,
    /// All cycles done
    Finished,
}

impl Phase {
    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Countdown => "Get Ready",
            Self::Inhale => "Breathe In",
            Self::Hold => "Hold",
            Self::Exhale => "Breathe Out",
            Self::CyclePause => "Pause",
            Self::Finished => "Well Done",
        }
    }

    /// Whether a timer runs during this phase.
    #[must_use]
    pub const fn is_timed(&self) -> bool {
        !matches!(self, Self::Idle | Self::Finished)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Length of each timed phase, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseDurations {
    /// Countdown before the first cycle (3, 2, 1).
    pub countdown: i64,
    /// Inhale length.
    pub inhale: i64,
    /// Hold length.
    pub hold: i64,
    /// Exhale length.
    pub exhale: i64,
    /// Beat between cycles.
    pub cycle_pause: i64,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            countdown: 3,
            inhale: 5,
            hold: 2,
            exhale: 5,
            cycle_pause: 1,
        }
    }
}

impl PhaseDurations {
    /// Duration for a phase. Untimed phases have none.
    #[must_use]
    pub const fn for_phase(&self, phase: Phase) -> Option<i64> {
        match phase {
            Phase::Countdown => Some(self.countdown),
            Phase::Inhale => Some(self.inhale),
            Phase::Hold => Some(self.hold),
            Phase::Exhale => Some(self.exhale),
            Phase::CyclePause => Some(self.cycle_pause),
            Phase::Idle | Phase::Finished => None,
        }
    }

    /// Seconds in one Inhale→Hold→Exhale→CyclePause cycle.
    #[must_use]
    pub const fn cycle_seconds(&self) -> i64 {
        self.inhale + self.hold + self.exhale + self.cycle_pause
    }

    /// Total seconds for a session of `cycles` cycles, countdown included.
    #[must_use]
    pub const fn session_seconds(&self, cycles: u32) -> i64 {
        self.countdown + self.cycle_seconds() * cycles as i64
    }

    /// Check every duration is positive.
    ///
    /// # Errors
    ///
    /// Returns `BreatheError::InvalidDuration` with the first offending value.
    pub fn validate(&self) -> Result<(), BreatheError> {
        for value in [
            self.countdown,
            self.inhale,
            self.hold,
            self.exhale,
            self.cycle_pause,
        ] {
            if value <= 0 {
                return Err(BreatheError::InvalidDuration(value));
            }
        }
        Ok(())
    }
}

/// Where the session goes after `phase` completes during cycle `cycle`.
///
/// Returns the next phase and the cycle it belongs to.
#[must_use]
pub const fn next_phase(phase: Phase, cycle: u32, target_cycles: u32) -> (Phase, u32) {
    match phase {
        Phase::Idle => (Phase::Idle, 1),
        Phase::Countdown => (Phase::Inhale, 1),
        Phase::Inhale => (Phase::Hold, cycle),
        Phase::Hold => (Phase::Exhale, cycle),
        Phase::Exhale => (Phase::CyclePause, cycle),
        Phase::CyclePause if cycle < target_cycles => (Phase::Inhale, cycle + 1),
        Phase::CyclePause | Phase::Finished => (Phase::Finished, cycle),
    }
}
