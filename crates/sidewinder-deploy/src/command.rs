//! Blocking execution of OS commands.
//!
//! The lifecycle controller never spawns processes directly. It describes
//! each command as a [`CommandSpec`] and hands it to a [`CommandRunner`], so
//! tests can substitute a recording double for the package manager and the
//! service manager.

use std::fmt;
use std::io;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

const COMMAND_TARGET: &str = "sidewinder_deploy::command";

/// Program and arguments of one OS command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    /// Builds a command from a program name and its arguments.
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

    /// Program to execute.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.program)?;
        for arg in &self.args {
            let needs_quoting = arg.is_empty()
                || arg.contains(|character: char| {
                    character.is_whitespace() || "'\"?&;$".contains(character)
                });
            if needs_quoting {
                write!(formatter, " '{}'", arg.replace('\'', r"'\''"))?;
            } else {
                write!(formatter, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Builds an output with the given exit code and no captured text.
    #[must_use]
    pub fn with_exit_code(exit_code: i32) -> Self {
        Self {
            exit_code: Some(exit_code),
            ..Self::default()
        }
    }

    /// Whether the command exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }

    /// Last non-empty line of stderr, falling back to stdout.
    #[must_use]
    pub fn diagnostic(&self) -> &str {
        last_line(&self.stderr)
            .or_else(|| last_line(&self.stdout))
            .unwrap_or("")
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().rev().find(|line| !line.trim().is_empty())
}

/// Runs OS commands to completion.
pub trait CommandRunner {
    /// Runs `command` and captures its output.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] only when the process could not be started;
    /// a non-zero exit is reported through [`CommandOutput::exit_code`].
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError> {
        (**self).run(command)
    }
}

/// Runs commands with [`std::process::Command`], blocking until they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError> {
        debug!(target: COMMAND_TARGET, command = %command, "running command");
        let output = Command::new(command.program())
            .args(command.args())
            .output()
            .map_err(|source| CommandError::Spawn {
                command: command.to_string(),
                source,
            })?;
        let captured = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            target: COMMAND_TARGET,
            command = %command,
            exit_code = ?captured.exit_code,
            "command finished"
        );
        Ok(captured)
    }
}

/// Errors raised when a command cannot be run at all.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be started.
    #[error("failed to start '{command}': {source}")]
    Spawn {
        /// Rendered command line.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}
