//! Test utility functions for sitedeploy

#![allow(dead_code)]

use sitedeploy::cli::terminal_output::TerminalReporter;
use sitedeploy::core::config::{DeployConfig, Strategy};
use sitedeploy::core::{DeployError, FailureRecord, RunReport};
use sitedeploy::execution::{DeployEngine, ExecutionEvent};
use sitedeploy::runner::{
    CommandExecutor, ExecutionOutcome, OutputCallback, OutputLine, ResolvedCommand, RunnerError,
};
use sitedeploy::workflow;

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Mock executor with scripted exit codes
///
/// Commands exit zero unless scripted otherwise, either by git subcommand
/// (first argument) or by call position.
#[derive(Default)]
pub struct MockExecutor {
    exit_codes: HashMap<String, i32>,
    unspawnable: Vec<String>,
    fail_call: Option<usize>,
    calls: Mutex<Vec<ResolvedCommand>>,
    counter: AtomicUsize,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every command with this subcommand exit with `code`
    pub fn exit_code(mut self, subcommand: &str, code: i32) -> Self {
        self.exit_codes.insert(subcommand.to_string(), code);
        self
    }

    /// Make every command with this subcommand fail to spawn
    pub fn unspawnable(mut self, subcommand: &str) -> Self {
        self.unspawnable.push(subcommand.to_string());
        self
    }

    /// Make the n-th call (0-based) exit 1
    pub fn fail_call(mut self, index: usize) -> Self {
        self.fail_call = Some(index);
        self
    }

    /// Every command run so far, in order
    pub fn calls(&self) -> Vec<ResolvedCommand> {
        self.calls.lock().unwrap().clone()
    }

    /// Commands rendered as command lines
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.to_string()).collect()
    }

    /// How many commands started with these arguments
    pub fn count(&self, args: &[&str]) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.args.len() >= args.len() && c.args.iter().zip(args).all(|(a, b)| a == b))
            .count()
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn run(
        &self,
        command: &ResolvedCommand,
        callback: Option<&dyn OutputCallback>,
    ) -> Result<ExecutionOutcome, RunnerError> {
        let index = self.counter.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(command.clone());

        let subcommand = command.args.first().cloned().unwrap_or_default();
        if self.unspawnable.contains(&subcommand) {
            return Err(RunnerError::Spawn {
                program: command.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
            });
        }

        let code = match self.fail_call {
            Some(n) if n == index => 1,
            _ => self.exit_codes.get(&subcommand).copied().unwrap_or(0),
        };

        let stdout = format!("mock: {}", command);
        let stderr = if code == 0 {
            String::new()
        } else {
            format!("error: {} exited {}", subcommand, code)
        };

        if let Some(cb) = callback {
            cb.on_line(&OutputLine::stdout(stdout.clone()));
            if !stderr.is_empty() {
                cb.on_line(&OutputLine::stderr(stderr.clone()));
            }
        }

        Ok(ExecutionOutcome::new(Some(code), stdout, stderr))
    }
}

/// Writer whose contents stay readable after it is handed to a reporter
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A repository directory with a non-empty build output
pub struct SiteFixture {
    pub dir: TempDir,
    pub config: DeployConfig,
}

/// Create a site fixture for the given strategy
pub fn site_fixture(strategy: Strategy) -> SiteFixture {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("dist")).unwrap();
    std::fs::write(dir.path().join("dist").join("index.html"), "<h1>hello</h1>").unwrap();

    let config = DeployConfig {
        working_dir: Some(dir.path().to_path_buf()),
        strategy,
        ..DeployConfig::default()
    };
    SiteFixture { dir, config }
}

/// Outcome of a deploy run against a mock executor
pub struct DeployTestResult {
    pub result: Result<RunReport, DeployError>,
    pub events: Vec<ExecutionEvent>,
    /// Everything the terminal reporter printed
    pub stdout: String,
}

impl DeployTestResult {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The failure record, if the deploy failed
    pub fn record(&self) -> Option<FailureRecord> {
        self.result.as_ref().err().map(|e| e.record())
    }

    /// The last line the reporter printed
    pub fn final_line(&self) -> String {
        self.stdout
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or_default()
            .to_string()
    }

    /// Whether a printed line contains `text`
    pub fn printed(&self, text: &str) -> bool {
        self.stdout.lines().any(|l| l.contains(text))
    }

    /// Raw output lines forwarded from commands
    pub fn output_lines(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ExecutionEvent::StepOutput { line, .. } => Some(line.text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Labels of skipped steps
    pub fn skipped_steps(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ExecutionEvent::StepSkipped { label, .. } => Some(label.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Run the configured deploy with a mock executor
///
/// Output goes through the terminal reporter with its spinner enabled,
/// as the binary does by default.
pub async fn run_deploy_with_mock(
    config: &DeployConfig,
    executor: Arc<MockExecutor>,
) -> DeployTestResult {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let buffer = SharedBuffer::default();
    let reporter = Arc::new(TerminalReporter::with_writer(true, buffer.clone()));
    let handler = reporter.clone();

    let engine = DeployEngine::new(executor)
        .with_event_handler(move |event| sink.lock().unwrap().push(event))
        .with_event_handler(move |event| handler.on_event(&event));

    let result = workflow::deploy(&engine, config).await;
    reporter.finish(&result);
    let events = events.lock().unwrap().clone();

    DeployTestResult {
        result,
        events,
        stdout: buffer.contents(),
    }
}

/// Assert the failure record matches `{ ok: false, code: 500, message }`
pub fn assert_failed_with(result: &DeployTestResult, message: &str) {
    let record = result
        .record()
        .unwrap_or_else(|| panic!("Deploy should have failed with '{}'", message));

    assert_eq!(
        record,
        FailureRecord {
            ok: false,
            code: 500,
            message: message.to_string(),
        }
    );
}

/// Assert the subcommands (first arguments) run, in order
pub fn assert_subcommands(executor: &MockExecutor, expected: &[&str]) {
    let actual: Vec<String> = executor
        .calls()
        .iter()
        .map(|c| c.args.first().cloned().unwrap_or_default())
        .collect();

    assert_eq!(
        actual, expected,
        "Commands run:\n{}",
        executor.command_lines().join("\n")
    );
}
