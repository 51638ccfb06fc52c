//! Countdown timer for a single breathing phase.
//!
//! The timer knows nothing about phases or sessions. Something outside calls
//! [`PhaseTimer::tick`] once per second; the timer reports when it runs out.

use serde::{Deserialize, Serialize};

use crate::error::BreatheError;

/// Timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerState {
    /// Never started, or cancelled
    Stopped,
    /// Counting down
    Running,
    /// Frozen at the current remaining time
    Paused,
    /// Reached zero
    Completed,
}

/// A one-shot countdown timer with one-second resolution.
#[derive(Debug, Clone)]
pub struct PhaseTimer {
    /// Duration given to the last `start`
    duration: i64,
    /// Remaining seconds
    remaining: i64,
    /// Current state
    state: TimerState,
}

impl Default for PhaseTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTimer {
    /// Create a stopped timer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            duration: 0,
            remaining: 0,
            state: TimerState::Stopped,
        }
    }

    /// Start counting down from `duration` seconds.
    ///
    /// Any previous countdown is discarded.
    ///
    /// # Errors
    ///
    /// Returns `BreatheError::InvalidDuration` if `duration` is not positive.
    /// The timer is left untouched in that case.
    pub fn start(&mut self, duration: i64) -> Result<(), BreatheError> {
        if duration <= 0 {
            return Err(BreatheError::InvalidDuration(duration));
        }
        self.duration = duration;
        self.remaining = duration;
        self.state = TimerState::Running;
        Ok(())
    }

    /// Advance the timer by one second.
    ///
    /// Returns true exactly once, on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }

        self.remaining -= 1;

        if self.remaining <= 0 {
            self.remaining = 0;
            self.state = TimerState::Completed;
            true
        } else {
            false
        }
    }

    /// Freeze the countdown. No-op unless running.
    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
        }
    }

    /// Continue from the frozen remaining time. No-op unless paused.
    pub fn resume(&mut self) {
        if self.state == TimerState::Paused {
            self.state = TimerState::Running;
        }
    }

    /// Stop and discard the remaining time without signalling completion.
    pub fn cancel(&mut self) {
        self.duration = 0;
        self.remaining = 0;
        self.state = TimerState::Stopped;
    }

    /// Remaining seconds.
    #[must_use]
    pub const fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Duration of the current countdown.
    #[must_use]
    pub const fn duration(&self) -> i64 {
        self.duration
    }

    /// Seconds elapsed in the current countdown.
    #[must_use]
    pub const fn elapsed(&self) -> i64 {
        self.duration - self.remaining
    }

    /// Get the current state.
    #[must_use]
    pub const fn state(&self) -> TimerState {
        self.state
    }

    /// Check if the timer is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Check if the timer is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state == TimerState::Paused
    }
}

/// Format seconds as MM:SS.
#[must_use]
pub fn format_mmss(seconds: i64) -> String {
    let total = seconds.abs();
    format!("{:02}:{:02}", total / 60, total % 60)
}
