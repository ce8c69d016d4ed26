//! External process invocation
//!
//! The mirror tool and the OS task scheduler are both driven through the
//! narrow [`ProcessRunner`] capability so that callers can be exercised with
//! a scripted fake instead of real executables.

use std::fmt;
use std::io;
use std::process::Command;

/// A program plus its arguments, without any shell quoting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path
    pub program: String,
    /// Arguments passed verbatim
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a command with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
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

/// Exit status and captured output of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `None` when the process was terminated by a signal
    pub status: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the process exited with status 0
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs a command synchronously and captures its output
pub trait ProcessRunner {
    /// Run `command` to completion
    ///
    /// An `Err` means the process could not be started at all; a non-zero
    /// exit status is reported through [`ProcessOutput::status`].
    fn run(&self, command: &CommandSpec) -> io::Result<ProcessOutput>;
}

/// Runs commands with `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, command: &CommandSpec) -> io::Result<ProcessOutput> {
        tracing::debug!(command = %command, "running external command");
        let output = Command::new(&command.program).args(&command.args).output()?;

        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
