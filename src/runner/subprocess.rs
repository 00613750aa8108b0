//! Subprocess runner - spawns the command and streams its output

use crate::runner::{
    CommandExecutor, ExecutionOutcome, OutputCallback, OutputLine, OutputStream, ResolvedCommand,
    RunnerError,
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs commands as child processes
///
/// There is deliberately no timeout: a hung git process hangs the deploy.
#[derive(Debug, Clone, Default)]
pub struct SubprocessRunner {
    /// Directory the child process starts in (inherits ours when `None`)
    working_dir: Option<PathBuf>,
}

impl SubprocessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl CommandExecutor for SubprocessRunner {
    async fn run(
        &self,
        command: &ResolvedCommand,
        callback: Option<&dyn OutputCallback>,
    ) -> Result<ExecutionOutcome, RunnerError> {
        debug!("Spawning {}", command);
        let started = Instant::now();

        let mut process = Command::new(&command.program);
        process
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            process.current_dir(dir);
        }

        let mut child = process.spawn().map_err(|source| RunnerError::Spawn {
            program: command.program.clone(),
            source,
        })?;

        let io_error = |source: std::io::Error| RunnerError::Io {
            program: command.program.clone(),
            source,
        };
        let missing_pipe =
            || io_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "output pipe not captured"));

        let stdout = child.stdout.take().ok_or_else(missing_pipe)?;
        let stderr = child.stderr.take().ok_or_else(missing_pipe)?;

        // Both pipes must be drained together, otherwise a chatty stderr can
        // fill its buffer and block the child forever.
        let (stdout, stderr) = tokio::try_join!(
            collect_lines(stdout, OutputStream::Stdout, callback),
            collect_lines(stderr, OutputStream::Stderr, callback),
        )
        .map_err(io_error)?;

        let status = child.wait().await.map_err(io_error)?;
        let exit_code = status.code();
        if exit_code.is_none() {
            warn!("{} was terminated by a signal", command.program);
        }

        let outcome = ExecutionOutcome::new(exit_code, stdout, stderr)
            .with_duration(started.elapsed());
        debug!(
            "{} exited with {:?} after {:?}",
            command.program, outcome.exit_code, outcome.duration
        );

        Ok(outcome)
    }
}

/// Read a pipe to EOF, forwarding each line to the callback as it arrives
async fn collect_lines<R>(
    reader: R,
    stream: OutputStream,
    callback: Option<&dyn OutputCallback>,
) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut captured = String::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let text = String::from_utf8_lossy(&buf);
        let text = text.trim_end_matches(['\n', '\r']);
        captured.push_str(text);
        captured.push('\n');

        if let Some(cb) = callback {
            cb.on_line(&OutputLine {
                stream,
                text: text.to_string(),
            });
        }
    }

    Ok(captured)
}
