//! breathe - Guided breathing sessions for the terminal
//!
//! This crate paces a breathing exercise (countdown, inhale, hold, exhale)
//! and checks finished sessions into a challenge stored in `SQLite`.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod output;
pub mod storage;
pub mod tui;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::BreatheError;
pub use features::breathing::{Phase, PhaseTimer, ProgressReporter, SessionController};
