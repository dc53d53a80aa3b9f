//! External tool invocation.
//!
//! Every git and composer command goes through [`ToolRunner`], always with an
//! explicit working directory. [`SystemRunner`] spawns real processes; tests
//! substitute a recording runner.

use std::fmt;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use thiserror::Error;
use tracing::debug;

/// A single external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
  pub program: String,
  pub args: Vec<String>,
  /// Working directory the command runs in.
  pub cwd: PathBuf,
}

impl ToolInvocation {
  pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: cwd.into(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  /// Program and arguments joined by spaces, for logs and error messages.
  pub fn command_line(&self) -> String {
    std::iter::once(self.program.as_str())
      .chain(self.args.iter().map(String::as_str))
      .collect::<Vec<_>>()
      .join(" ")
  }
}

impl fmt::Display for ToolInvocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "`{}` in {}", self.command_line(), self.cwd.display())
  }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
  pub stdout: String,
  pub stderr: String,
}

/// Errors from running an external tool.
#[derive(Debug, Error)]
pub enum ExecError {
  /// The process could not be started.
  #[error("failed to spawn {invocation}: {source}")]
  Spawn {
    invocation: ToolInvocation,
    #[source]
    source: io::Error,
  },

  /// The process exited unsuccessfully.
  #[error("command {invocation} failed with exit code {code:?}: {stderr}")]
  Failed {
    invocation: ToolInvocation,
    code: Option<i32>,
    stderr: String,
  },
}

/// Runs external tools to completion.
///
/// Only the exit status is consulted; there is no timeout.
pub trait ToolRunner: Send + Sync {
  fn run(&self, invocation: &ToolInvocation) -> impl Future<Output = Result<ToolOutput, ExecError>> + Send;
}

/// Spawns real processes with `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
  async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ExecError> {
    debug!(command = %invocation.command_line(), cwd = %invocation.cwd.display(), "running command");

    let output = tokio::process::Command::new(&invocation.program)
      .args(&invocation.args)
      .current_dir(&invocation.cwd)
      .stdin(Stdio::null())
      .output()
      .await
      .map_err(|source| ExecError::Spawn {
        invocation: invocation.clone(),
        source,
      })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
      return Err(ExecError::Failed {
        invocation: invocation.clone(),
        code: output.status.code(),
        stderr: stderr.trim().to_string(),
      });
    }

    Ok(ToolOutput { stdout, stderr })
  }
}

/// Split a configured command such as `php /opt/composer.phar` into program
/// and leading arguments. Returns `None` for a blank command.
pub fn split_command(command: &str) -> Option<(String, Vec<String>)> {
  let mut words = command.split_whitespace().map(str::to_string);
  let program = words.next()?;
  Some((program, words.collect()))
}
