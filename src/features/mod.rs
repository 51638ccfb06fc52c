//! Feature implementations for breathe.
//!
//! - Breathing sessions: phase timing, session control, and challenge progress

pub mod breathing;
