//! Terminal reporter for deploy progress
//!
//! `TerminalReporter` turns [`ExecutionEvent`]s into terminal output:
//!
//! - A progress line per step: `[2/5] commit git commit -m 2024-05-01 9:30:00`
//! - Raw git output, printed to stdout as it arrives
//! - A spinner for the running step (optional, drawn on stderr)
//! - A horizontal separator around the run
//! - The final `Successfully deployed.` or `Error: {...}` line
//!
//! # Example
//!
//! ```no_run
//! use sitedeploy::cli::terminal_output::TerminalReporter;
//! use sitedeploy::execution::DeployEngine;
//! use sitedeploy::runner::SubprocessRunner;
//! use std::sync::Arc;
//!
//! let reporter = Arc::new(TerminalReporter::new(true));
//! let handler = reporter.clone();
//! let engine = DeployEngine::new(SubprocessRunner::new())
//!     .with_event_handler(move |event| handler.on_event(&event));
//! ```

use crate::cli::output::{
    create_spinner, format_execution_event, format_failure_line, format_output_line, SUCCESS_LINE,
};
use crate::core::{DeployError, RunReport};
use crate::execution::ExecutionEvent;
use indicatif::ProgressBar;
use std::io::{self, Write};
use std::sync::Mutex;

/// Prints engine events to the terminal as they happen
pub struct TerminalReporter {
    show_progress: bool,
    spinner: Mutex<Option<ProgressBar>>,
    out: Mutex<Box<dyn Write + Send>>,
}

impl TerminalReporter {
    /// Create a reporter writing to stdout; `show_progress` enables the step spinner
    pub fn new(show_progress: bool) -> Self {
        Self::with_writer(show_progress, io::stdout())
    }

    /// Create a reporter writing its lines to `writer`
    pub fn with_writer<W>(show_progress: bool, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            show_progress,
            spinner: Mutex::new(None),
            out: Mutex::new(Box::new(writer)),
        }
    }

    pub fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::PipelineStarted { .. } => {
                self.print_separator();
                self.print(format_execution_event(event));
            }
            ExecutionEvent::StepStarted { label, .. } => {
                self.print(format_execution_event(event));
                self.start_spinner(label);
            }
            ExecutionEvent::StepOutput { line, .. } => {
                self.print_line(&format_output_line(line.stream, &line.text));
            }
            ExecutionEvent::StepCompleted { .. } | ExecutionEvent::StepFailed { .. } => {
                self.finish_spinner();
                self.print(format_execution_event(event));
            }
            ExecutionEvent::StepSkipped { .. } => {
                self.print(format_execution_event(event));
            }
            ExecutionEvent::PipelineCompleted { .. } => {
                self.finish_spinner();
                self.print(format_execution_event(event));
                self.print_separator();
            }
        }
    }

    /// Print the final result line of a deploy
    pub fn finish(&self, result: &Result<RunReport, DeployError>) {
        self.finish_spinner();
        match result {
            Ok(_) => self.print_line(SUCCESS_LINE),
            Err(e) => self.print_line(&format_failure_line(&e.record())),
        }
    }

    fn start_spinner(&self, label: &str) {
        if !self.show_progress {
            return;
        }
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(old) = slot.take() {
                old.finish_and_clear();
            }
            *slot = Some(create_spinner(format!("running {}", label)));
        }
    }

    fn finish_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(spinner) = slot.take() {
                spinner.finish_and_clear();
            }
        }
    }

    fn print(&self, line: Option<String>) {
        if let Some(line) = line {
            self.print_line(&line);
        }
    }

    /// Write a line, hiding the spinner while it is written
    fn print_line(&self, line: &str) {
        let spinner = self.spinner.lock().ok().and_then(|slot| slot.clone());
        match spinner {
            Some(spinner) => spinner.suspend(|| self.write_line(line)),
            None => self.write_line(line),
        }
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{}", line);
            let _ = out.flush();
        }
    }

    /// A horizontal rule spanning the terminal width
    fn print_separator(&self) {
        // Get terminal width, default to 80 if unavailable
        let width = term_size::dimensions_stdout()
            .map(|(w, _)| w)
            .unwrap_or(80);
        self.print_line(&"─".repeat(width));
    }
}
