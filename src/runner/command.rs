//! Command specifications and their resolution into concrete argv

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use tracing::warn;

/// A single argument of a command
///
/// Dynamic arguments are resolved when the step runs, not when the
/// pipeline is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandArg {
    /// Passed through unchanged
    Literal(String),
    /// Local wall-clock time rendered with a strftime format
    Timestamp(String),
}

impl CommandArg {
    /// Resolve the argument against the given instant
    pub fn resolve(&self, now: &DateTime<Local>) -> String {
        match self {
            CommandArg::Literal(value) => value.clone(),
            CommandArg::Timestamp(format) => {
                let mut rendered = String::new();
                if write!(rendered, "{}", now.format(format)).is_err() {
                    warn!("Invalid timestamp format '{}', falling back to RFC 3339", format);
                    return now.to_rfc3339();
                }
                rendered
            }
        }
    }
}

impl fmt::Display for CommandArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandArg::Literal(value) => write!(f, "{}", quote(value)),
            CommandArg::Timestamp(format) => write!(f, "<timestamp {}>", format),
        }
    }
}

/// Immutable description of an external command: program plus ordered arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<CommandArg>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a literal argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(CommandArg::Literal(arg.into()));
        self
    }

    /// Append several literal arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args
            .extend(args.into_iter().map(|a| CommandArg::Literal(a.into())));
        self
    }

    /// Append an argument rendered from the clock at execution time
    pub fn timestamp_arg(mut self, format: impl Into<String>) -> Self {
        self.args.push(CommandArg::Timestamp(format.into()));
        self
    }

    /// Resolve all dynamic arguments against `now`
    pub fn resolve(&self, now: &DateTime<Local>) -> ResolvedCommand {
        ResolvedCommand {
            program: self.program.clone(),
            args: self.args.iter().map(|a| a.resolve(now)).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// A command with every argument resolved, ready to spawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ResolvedCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for ResolvedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"') {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}
