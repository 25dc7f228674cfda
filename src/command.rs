//! External tool invocation
//!
//! The release steps only ever observe whether a tool succeeded. Commands are
//! described as plain data ([ToolCommand]) and handed to a [CommandRunner], so
//! the production runner can be swapped for a recording one in tests.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{ReleaseError, Result};

/// A program invocation: executable, arguments and working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub work_dir: PathBuf,
}

impl ToolCommand {
    /// Build a command from a configured command line (program followed by
    /// fixed arguments) running in `work_dir`
    pub fn from_command_line(command_line: &[String], work_dir: impl AsRef<Path>) -> Result<Self> {
        let (program, args) = command_line
            .split_first()
            .ok_or_else(|| ReleaseError::config("empty tool command line"))?;

        Ok(ToolCommand {
            program: program.clone(),
            args: args.to_vec(),
            work_dir: work_dir.as_ref().to_path_buf(),
        })
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

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs external tools and resolves executables
pub trait CommandRunner {
    /// Run the command to completion.
    ///
    /// Blocks until the process exits. Any non-zero exit is an error.
    fn run(&self, command: &ToolCommand) -> Result<()>;

    /// Resolve an executable on the execution path
    fn locate(&self, program: &str) -> Result<PathBuf>;
}

/// Runs tools as real subprocesses with inherited stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ToolCommand) -> Result<()> {
        debug!("Running `{}` in {}", command, command.work_dir.display());

        let status = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.work_dir)
            .status()
            .map_err(|e| {
                ReleaseError::tool(format!("failed to execute {}: {}", command.program, e))
            })?;

        if !status.success() {
            return Err(ReleaseError::tool(format!(
                "`{}` failed with exit code {}",
                command,
                status.code().unwrap_or(-1)
            )));
        }

        Ok(())
    }

    fn locate(&self, program: &str) -> Result<PathBuf> {
        which::which(program).map_err(|e| ReleaseError::MissingExecutable {
            program: program.to_string(),
            reason: e.to_string(),
        })
    }
}
