//! Command runner for external programs

pub mod command;
pub mod outcome;
pub mod streaming;
pub mod subprocess;

use async_trait::async_trait;
pub use command::{CommandArg, CommandSpec, ResolvedCommand};
pub use outcome::{ExecutionOutcome, RunnerError};
pub use streaming::{OutputCallback, OutputLine, OutputStream};
pub use subprocess::SubprocessRunner;

/// Trait for command execution - allows swapping real subprocesses for fakes
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run a command to completion, streaming its output to `callback`
    ///
    /// Returns `Ok` whenever the process ran, whatever its exit code.
    /// `Err` means the process could not be started or its pipes failed.
    async fn run(
        &self,
        command: &ResolvedCommand,
        callback: Option<&dyn OutputCallback>,
    ) -> Result<ExecutionOutcome, RunnerError>;
}

#[async_trait]
impl<T: CommandExecutor + ?Sized> CommandExecutor for std::sync::Arc<T> {
    async fn run(
        &self,
        command: &ResolvedCommand,
        callback: Option<&dyn OutputCallback>,
    ) -> Result<ExecutionOutcome, RunnerError> {
        (**self).run(command, callback).await
    }
}
