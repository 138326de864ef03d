//! CLI output formatting

use crate::{
    core::{ExecutionStatus, RunReport, Task},
    execution::ExecutionEvent,
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static EYES: Emoji<'_, '_> = Emoji("👀 ", "* ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar over the tasks of a run
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    if let Ok(bar_style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
    {
        progress.set_style(bar_style.progress_chars("#>-"));
    }
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Pending => style("PENDING").dim().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format a task for `list`
pub fn format_task(task: &Task) -> String {
    let mut line = format!("  {}", style(&task.name).bold());
    if let Some(description) = &task.description {
        line.push_str(&format!(" - {}", description));
    }
    line.push_str(&format!("\n      {}", style(task.summary()).dim()));
    line
}

/// Format an execution event for display
///
/// Returns `None` for events that are only interesting with `--verbose`.
pub fn format_execution_event(event: &ExecutionEvent, verbose: bool) -> Option<String> {
    let line = match event {
        ExecutionEvent::RunStarted { run_id, plan } => format!(
            "{} Running {} ({})",
            ROCKET,
            style(plan.join(" → ")).bold(),
            style(&run_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::TaskStarted { task } => format!("{} {}", SPINNER, style(task).cyan()),
        ExecutionEvent::FileWritten { path, .. } if verbose => {
            format!("    {} {}", style("+").green(), style(path.display()).dim())
        }
        ExecutionEvent::FileRemoved { path, .. } if verbose => {
            format!("    {} {}", style("-").red(), style(path.display()).dim())
        }
        ExecutionEvent::FileWritten { .. } | ExecutionEvent::FileRemoved { .. } => return None,
        ExecutionEvent::TaskCompleted {
            task,
            files,
            duration,
        } => format!(
            "{} {} ({} file(s), {})",
            CHECK,
            style(task).green(),
            files,
            style(format_duration(*duration)).dim()
        ),
        ExecutionEvent::TaskFailed { task, error } => {
            format!("{} {}: {}", CROSS, style(task).red(), style(error).dim())
        }
        ExecutionEvent::RunCompleted { run_id, status } => format!(
            "{} Run ({}) {}",
            INFO,
            style(&run_id.to_string()[..8]).dim(),
            format_status(*status)
        ),
        ExecutionEvent::WatchStarted { root, globs } => format!(
            "{} Watching {} for {}",
            EYES,
            style(root.display()).bold(),
            globs.join(", ")
        ),
        ExecutionEvent::WatchTriggered { path, tasks, .. } => format!(
            "{} {} changed → {}",
            INFO,
            style(path.display()).cyan(),
            tasks.join(", ")
        ),
    };
    Some(line)
}

/// Summary line printed after a run
pub fn format_run_summary(report: &RunReport) -> String {
    let elapsed = match (report.started_at, report.completed_at) {
        (Some(start), Some(end)) => end.signed_duration_since(start).to_std().unwrap_or_default(),
        _ => Duration::ZERO,
    };
    format!(
        "{} task(s), {} file(s) written in {}",
        style(report.tasks.len()).cyan(),
        style(report.files_written()).cyan(),
        format_duration(elapsed)
    )
}

pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
