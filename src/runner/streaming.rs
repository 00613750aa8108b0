//! Streaming support for command execution
//!
//! The subprocess runner reads stdout and stderr line by line while the
//! process is still running and hands each line to an [`OutputCallback`].
//! This is how native git diagnostics reach the terminal before the
//! command has finished.
//!
//! # Example
//!
//! ```
//! use sitedeploy::runner::{OutputCallback, OutputLine};
//!
//! struct Echo;
//!
//! impl OutputCallback for Echo {
//!     fn on_line(&self, line: &OutputLine) {
//!         println!("{}", line.text);
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Which stream a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// One line of process output, without its trailing newline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub text: String,
}

impl OutputLine {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stream: OutputStream::Stdout,
            text: text.into(),
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            stream: OutputStream::Stderr,
            text: text.into(),
        }
    }
}

/// Callback for process output as it arrives
///
/// This trait is object-safe and can be used as `&dyn OutputCallback`.
pub trait OutputCallback: Send + Sync {
    /// Called once per line, in arrival order within each stream
    fn on_line(&self, line: &OutputLine);
}
