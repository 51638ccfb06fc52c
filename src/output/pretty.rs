//! Pretty (human-readable) output formatting for breathe.

use colored::Colorize;

use crate::features::breathing::{DailyCheckIn, ExitReport, ProgressSummary};

const BAR_WIDTH: usize = 20;

/// Format an exit report for display.
#[must_use]
pub fn format_exit_pretty(report: Option<&ExitReport>, completed_sessions: u32) -> String {
    let Some(report) = report else {
        return "No session started, nothing recorded.".dimmed().to_string();
    };

    let mut output = Vec::new();

    if completed_sessions > 0 {
        output.push(
            format!(
                "🌬️  {} session{} complete, {} breaths",
                completed_sessions,
                if completed_sessions == 1 { "" } else { "s" },
                report.breaths_completed
            )
            .green()
            .to_string(),
        );
    } else {
        output.push("Session ended early. Check-in recorded.".yellow().to_string());
    }

    output.push(format!("   Challenge: {}", report.challenge_id));
    output.push(format!(
        "   Check-ins: {} (+{})",
        report.check_ins, report.sessions_reported
    ));
    output.push(format!("   Today:     {}", report.today_count));

    output.join("\n")
}

/// Format challenge progress for display.
#[must_use]
pub fn format_progress_pretty(summary: &ProgressSummary) -> String {
    let mut output = Vec::new();

    output.push(summary.challenge_id.bold().to_string());
    output.push("─".repeat(40));
    output.push(format!("Check-ins: {}", summary.check_ins));
    output.push(format!(
        "Streak:    {} day{}",
        summary.streak,
        if summary.streak == 1 { "" } else { "s" }
    ));
    output.push(format!(
        "Today:     {} ({})",
        summary.today_count,
        summary.date.format("%Y-%m-%d")
    ));

    if summary.today_count == 0 {
        output.push(String::new());
        output.push("No breathing yet today. Try 'breathe start'".dimmed().to_string());
    }

    output.join("\n")
}

/// Format daily check-ins as a small bar chart.
#[must_use]
pub fn format_history_pretty(challenge_id: &str, days: &[DailyCheckIn]) -> String {
    if days.is_empty() {
        return format!("No check-ins recorded for {challenge_id}.");
    }

    let max = days.iter().map(|d| d.count).max().unwrap_or(1).max(1);

    let mut output = Vec::new();
    output.push(format!("{} ({} days)", challenge_id.bold(), days.len()));
    output.push("─".repeat(40));

    for day in days {
        output.push(format!(
            "{}  {} {}",
            day.date.format("%a %Y-%m-%d"),
            render_bar(day.count, max).cyan(),
            day.count
        ));
    }

    output.join("\n")
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn render_bar(count: i64, max: i64) -> String {
    let filled = ((count.max(0) as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}
