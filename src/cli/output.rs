//! CLI output formatting

use crate::core::{FailureRecord, PipelineStatus, StepDescription};
use crate::execution::ExecutionEvent;
use crate::runner::OutputStream;
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
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Final line printed after a successful deploy
pub const SUCCESS_LINE: &str = "Successfully deployed.";

/// Final line printed after a failed deploy
pub fn format_failure_line(record: &FailureRecord) -> String {
    format!("Error: {}", record)
}

/// Create a spinner for the running step
pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
        spinner.set_style(template);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Format a pipeline status for display
pub fn format_status(status: PipelineStatus) -> String {
    match status {
        PipelineStatus::Pending => style("PENDING").dim().to_string(),
        PipelineStatus::Running => style("RUNNING").yellow().to_string(),
        PipelineStatus::Succeeded => style("SUCCEEDED").green().to_string(),
        PipelineStatus::Failed => style("FAILED").red().to_string(),
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        format!("{}ms", duration.as_millis())
    } else if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// Format an execution event for display
///
/// Returns `None` for events that are not shown as a progress line
/// (raw command output is printed as-is elsewhere).
pub fn format_execution_event(event: &ExecutionEvent) -> Option<String> {
    let line = match event {
        ExecutionEvent::PipelineStarted {
            run_id,
            pipeline_name,
            total_steps,
        } => format!(
            "{} Deploying {} ({} steps, {})",
            ROCKET,
            style(pipeline_name).bold(),
            total_steps,
            style(&run_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::StepStarted {
            label,
            index,
            total,
            command,
        } => format!(
            "{} [{}/{}] {} {}",
            SPINNER,
            style(index).cyan(),
            style(total).dim(),
            style(label).bold(),
            style(command).dim()
        ),
        ExecutionEvent::StepOutput { .. } => return None,
        ExecutionEvent::StepCompleted { label, duration } => format!(
            "{} {} {}",
            CHECK,
            style(label).green(),
            style(format_duration(*duration)).dim()
        ),
        ExecutionEvent::StepFailed { label, failure } => format!(
            "{} {}: {}",
            CROSS,
            style(label).red(),
            style(failure.detail()).dim()
        ),
        ExecutionEvent::StepSkipped { label, reason } => format!(
            "{} {} skipped ({})",
            WARN,
            style(label).yellow(),
            reason
        ),
        ExecutionEvent::PipelineCompleted {
            status, duration, ..
        } => format!(
            "{} Pipeline {} in {}",
            INFO,
            format_status(*status),
            format_duration(*duration)
        ),
    };
    Some(line)
}

/// Format one raw output line of a command
pub fn format_output_line(stream: OutputStream, text: &str) -> String {
    match stream {
        OutputStream::Stdout => text.to_string(),
        OutputStream::Stderr => style(text).dim().to_string(),
    }
}

/// Format the step list of a pipeline
pub fn format_plan(name: &str, steps: &[StepDescription]) -> String {
    let mut out = format!("{} Plan for {}\n", INFO, style(name).bold());
    for step in steps {
        let marker = match &step.policy {
            crate::core::RunPolicy::OnSuccess => String::new(),
            crate::core::RunPolicy::Cleanup { after } => {
                style(format!(" (also after a failure once '{}' ran)", after))
                    .dim()
                    .to_string()
            }
        };
        out.push_str(&format!(
            "  {}. {:<20} {}{}\n",
            step.index,
            step.label,
            style(&step.command).cyan(),
            marker
        ));
    }
    out
}
