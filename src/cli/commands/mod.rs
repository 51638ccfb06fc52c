//! Command implementations for breathe.
//!
//! Each command returns the text to print; `main` prints it.

mod progress;
mod session;

pub use progress::{clear, history, progress};
pub use session::{run_plain, start};
