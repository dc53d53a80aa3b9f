//! Test utilities for extsync-lib.
//!
//! Provides a recording [`ToolRunner`] plus cross-platform helpers for tests
//! that spawn real processes.

use std::sync::Mutex;

use crate::exec::{ExecError, ToolInvocation, ToolOutput, ToolRunner};
use crate::extension::ExtensionRecord;

/// Records every invocation instead of spawning it.
///
/// Optionally fails any invocation whose command line contains a pattern.
#[derive(Debug, Default)]
pub struct RecordingRunner {
  calls: Mutex<Vec<ToolInvocation>>,
  fail_on: Option<String>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// A runner that fails every command whose command line contains `pattern`.
  pub fn failing_on(pattern: &str) -> Self {
    Self {
      calls: Mutex::new(Vec::new()),
      fail_on: Some(pattern.to_string()),
    }
  }

  pub fn calls(&self) -> Vec<ToolInvocation> {
    self.calls.lock().unwrap().clone()
  }

  pub fn command_lines(&self) -> Vec<String> {
    self.calls().iter().map(ToolInvocation::command_line).collect()
  }
}

impl ToolRunner for RecordingRunner {
  async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ExecError> {
    self.calls.lock().unwrap().push(invocation.clone());

    if let Some(pattern) = &self.fail_on
      && invocation.command_line().contains(pattern.as_str())
    {
      return Err(ExecError::Failed {
        invocation: invocation.clone(),
        code: Some(1),
        stderr: format!("scripted failure on '{}'", pattern),
      });
    }

    Ok(ToolOutput::default())
  }
}

pub fn repo_ext(name: &str, version: &str) -> ExtensionRecord {
  ExtensionRecord::from_repo(name, version, format!("https://example.org/{}.git", name))
}

pub fn package_ext(name: &str, version: &str) -> ExtensionRecord {
  ExtensionRecord::from_package(name, version, format!("mediawiki/{}", name.to_lowercase()))
}

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Returns the command and args to echo a message.
#[cfg(unix)]
pub fn echo_msg(msg: &str) -> (&'static str, Vec<String>) {
  ("/bin/echo", vec![msg.to_string()])
}

#[cfg(windows)]
pub fn echo_msg(msg: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), format!("echo {}", msg)])
}
