use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use breathe::cli::args::{Cli, Commands};
use breathe::cli::commands;
use breathe::config::{Config, Paths};
use breathe::error::BreatheError;

fn main() {
    init_tracing();

    if let Err(e) = run() {
        tracing::error!(error = %e, "Command failed");
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Log to `~/.breathe/logs/breathe.log`, filtered by `BREATHE_LOG`.
///
/// Stdout belongs to the session view, so without a log file there are no logs.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_env("BREATHE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = Paths::new().ok().and_then(|paths| {
        fs::create_dir_all(&paths.logs).ok()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(paths.log_file())
            .ok()
    });

    if let Some(file) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();
        return;
    }

    tracing_subscriber::registry().with(env_filter).init();
}

fn run() -> Result<(), BreatheError> {
    let cli = Cli::parse();
    let config = Config::load()?;
    config.general.color.apply();
    let format = cli.output.unwrap_or(config.general.default_output);

    let output = match cli.command {
        Commands::Start(args) => commands::start(&config, args, format)?,
        Commands::Progress(args) => commands::progress(&config, args, format)?,
        Commands::History { challenge, limit } => {
            commands::history(&config, challenge, limit, format)?
        }
        Commands::Clear { challenge, force } => commands::clear(&config, challenge, force, format)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
