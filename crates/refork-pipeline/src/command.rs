//! External command execution.
//!
//! Commands are described by a [`CommandSpec`] and executed through the
//! [`CommandRunner`] seam so the driver can be exercised without spawning
//! real toolchains. Output is captured as one combined text: stdout followed
//! by stderr.

use std::fmt;
use std::io;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::COMMAND_TARGET;

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    /// Creates a command with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Splits a command line on whitespace. No quoting is recognised.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Empty`] when the line has no program.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let program = words.next().ok_or(CommandError::Empty)?;
        Ok(Self {
            program: program.to_owned(),
            args: words.map(str::to_owned).collect(),
        })
    }

    /// The program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.program)?;
        for arg in &self.args {
            write!(formatter, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    code: Option<i32>,
    combined: String,
}

impl CommandOutput {
    /// Creates an output record. `code` is `None` when the process was
    /// terminated by a signal.
    #[must_use]
    pub fn new(code: Option<i32>, combined: impl Into<String>) -> Self {
        Self {
            code,
            combined: combined.into(),
        }
    }

    /// Output of a command that exited with status zero.
    #[must_use]
    pub fn success(combined: impl Into<String>) -> Self {
        Self::new(Some(0), combined)
    }

    /// Exit code, if the process exited normally.
    #[must_use]
    pub const fn code(&self) -> Option<i32> {
        self.code
    }

    /// Returns true when the process exited with status zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.code, Some(0))
    }

    /// Stdout followed by stderr.
    #[must_use]
    pub fn combined(&self) -> &str {
        &self.combined
    }
}

/// Errors raised by external commands.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum CommandError {
    /// A command line contained no program.
    #[error("command line is empty")]
    Empty,

    /// The process could not be started.
    #[error("failed to run '{command}': {source}")]
    Spawn {
        /// The command line.
        command: String,
        /// Underlying error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The process exited unsuccessfully.
    #[error("'{command}' exited with {}:\n{output}", describe_code(*code))]
    Failed {
        /// The command line.
        command: String,
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
        /// Combined output.
        output: String,
    },
}

impl CommandError {
    /// Captured output of a failed command.
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Failed { output, .. } => Some(output),
            Self::Empty | Self::Spawn { .. } => None,
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    code.map_or_else(|| String::from("a signal"), |status| format!("status {status}"))
}

/// Trait abstracting process execution for testability.
pub trait CommandRunner {
    /// Runs `command` in `dir`, blocking until it exits.
    ///
    /// A non-zero exit is reported through [`CommandOutput::code`], not as an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Spawn`] when the process cannot be started.
    fn run(&self, command: &CommandSpec, dir: &Path) -> Result<CommandOutput, CommandError>;
}

/// Runs commands as child processes of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, command: &CommandSpec, dir: &Path) -> Result<CommandOutput, CommandError> {
        debug!(
            target: COMMAND_TARGET,
            command = %command,
            dir = %dir.display(),
            "spawning command"
        );
        let output = Command::new(command.program())
            .args(command.args())
            .current_dir(dir)
            .output()
            .map_err(|source| CommandError::Spawn {
                command: command.to_string(),
                source: Arc::new(source),
            })?;
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(CommandOutput::new(output.status.code(), combined))
    }
}

/// Runs a command and turns an unsuccessful exit into an error.
///
/// With `verbose`, the command line and its output are logged at `info`.
///
/// # Errors
///
/// Returns [`CommandError::Spawn`] or [`CommandError::Failed`].
pub fn run_checked<R>(
    runner: &R,
    command: &CommandSpec,
    dir: &Path,
    verbose: bool,
) -> Result<CommandOutput, CommandError>
where
    R: CommandRunner + ?Sized,
{
    let output = runner.run(command, dir)?;
    if verbose {
        info!(target: COMMAND_TARGET, "$ {command}");
        if !output.combined().is_empty() {
            info!(target: COMMAND_TARGET, "{}", output.combined().trim_end());
        }
    }
    if !output.is_success() {
        return Err(CommandError::Failed {
            command: command.to_string(),
            code: output.code(),
            output: output.combined().to_owned(),
        });
    }
    Ok(output)
}
