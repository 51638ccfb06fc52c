use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "breathe")]
#[command(about = "Guided breathing sessions for your terminal")]
#[command(long_about = "breathe - guided breathing for the terminal

Runs a paced breathing exercise (inhale, hold, exhale) and checks finished
sessions into a challenge so you can keep a daily streak.

QUICK START:
  breathe start             Start a 4-cycle session right away
  breathe start --cycles 6  Longer session
  breathe progress          Show challenge check-ins
  breathe history           Show recent daily check-ins

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

Settings live in ~/.breathe/config.yaml.")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Defaults to the `general.default_output` config setting.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a guided breathing session
    ///
    /// Counts down 3, 2, 1 and then guides you through inhale, hold and
    /// exhale for the configured number of cycles. When you leave, finished
    /// sessions are added to the challenge and today's check-in is recorded.
    ///
    /// # Keys (full-screen mode)
    ///
    ///   space    Pause / resume
    ///   s        Start again (after finishing or resetting)
    ///   r        Reset the current session
    ///   q, Esc   Leave and record progress
    ///
    /// # Examples
    ///
    ///   breathe start
    ///   breathe start --cycles 8
    ///   breathe start --plain
    ///   breathe start --intro
    #[command(alias = "s")]
    Start(StartArgs),

    /// Show challenge progress
    ///
    /// Total check-ins, streak, and today's check-in count.
    ///
    /// # Examples
    ///
    ///   breathe progress
    ///   breathe progress --challenge evening-calm
    ///   breathe progress -o json
    #[command(alias = "p")]
    Progress(ChallengeArgs),

    /// Show recent daily check-ins
    ///
    /// # Examples
    ///
    ///   breathe history
    ///   breathe history --limit 30
    History {
        #[command(flatten)]
        challenge: ChallengeArgs,

        /// Number of days to show
        #[arg(long, short = 'n', default_value = "14")]
        limit: usize,
    },

    /// Delete all stored progress for a challenge
    Clear {
        #[command(flatten)]
        challenge: ChallengeArgs,

        /// Confirm deletion
        #[arg(long, short = 'f')]
        force: bool,
    },
}

/// Arguments for `breathe start`.
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Cycles in the session (default from config, normally 4)
    #[arg(long, short = 'c')]
    pub cycles: Option<u32>,

    /// Challenge to check the session into
    #[arg(long)]
    pub challenge: Option<String>,

    /// Print one line per phase instead of the full-screen view
    ///
    /// Plain mode runs a single session and exits when it finishes.
    #[arg(long)]
    pub plain: bool,

    /// Show the intro screen and wait for `s` before starting
    #[arg(long, conflicts_with = "plain")]
    pub intro: bool,

    /// Milliseconds per tick
    #[arg(long, hide = true, default_value = "1000")]
    pub tick_ms: u64,
}

/// Challenge selection shared by the progress commands.
#[derive(Args, Debug, Clone)]
pub struct ChallengeArgs {
    /// Challenge id (default from config)
    #[arg(long)]
    pub challenge: Option<String>,
}
